//! Snapshot comparison between two polling ticks.
//!
//! The differ only remembers the set of port names seen at the last detected
//! change. Each tick builds a fresh snapshot and compares it as a whole, so a
//! burst of attach/detach events between two ticks collapses into a single
//! change. Ports that disappear are not reported separately: they simply are
//! not part of the next descriptor list.

use std::collections::BTreeSet;

use crate::utils::ports::{sort_ports, PortDescriptor, PortSource};

/// A detected change in the set of attached ports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortChange {
    /// Every port attached right now, in display order.
    pub ports: Vec<PortDescriptor>,
    /// Identifiers present now but absent from the previous snapshot.
    pub new_ports: BTreeSet<String>,
}

impl PortChange {
    pub fn is_new(&self, port_name: &str) -> bool {
        self.new_ports.contains(port_name)
    }
}

#[derive(Debug, Default, Clone)]
pub struct PortDiffer {
    previous: BTreeSet<String>,
}

impl PortDiffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifiers recorded at the last detected change.
    pub fn previous(&self) -> &BTreeSet<String> {
        &self.previous
    }

    /// Compare `ports` against the previous snapshot.
    ///
    /// Returns `None` without touching state when the name sets are equal.
    /// Duplicate identifiers keep their first descriptor.
    pub fn diff(&mut self, ports: Vec<PortDescriptor>) -> Option<PortChange> {
        let mut seen = BTreeSet::new();
        let mut ports: Vec<PortDescriptor> = ports
            .into_iter()
            .filter(|p| seen.insert(p.port_name.clone()))
            .collect();
        let current = seen;

        if current == self.previous {
            return None;
        }

        let new_ports: BTreeSet<String> = current.difference(&self.previous).cloned().collect();
        self.previous = current;

        sort_ports(&mut ports);
        Some(PortChange { ports, new_ports })
    }

    /// Run one tick against `source`.
    ///
    /// Enumeration failures are logged and count as "no change".
    pub fn poll(&mut self, source: &dyn PortSource) -> Option<PortChange> {
        match source.enumerate() {
            Ok(ports) => {
                log::trace!("poll: enumerated {} ports", ports.len());
                self.diff(ports)
            }
            Err(err) => {
                log::warn!("poll: port enumeration failed, skipping tick: {err:#}");
                None
            }
        }
    }
}

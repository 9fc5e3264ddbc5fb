use flume::{Receiver, Sender};

use super::differ::PortChange;

/// Messages sent from the polling thread back to the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreToUi {
    /// The set of attached ports changed since the last detected change.
    PortsChanged(PortChange),
    /// The polling thread observed its stop signal and exited.
    Stopped,
}

/// Both ends of the core -> UI channel.
#[derive(Debug, Clone)]
pub struct Bus {
    pub core_tx: Sender<CoreToUi>,
    pub core_rx: Receiver<CoreToUi>,
}

impl Bus {
    pub fn new() -> Self {
        let (core_tx, core_rx) = flume::unbounded();
        Self { core_tx, core_rx }
    }

    /// Drain everything queued so far, oldest first.
    pub fn drain(&self) -> Vec<CoreToUi> {
        self.core_rx.try_iter().collect()
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

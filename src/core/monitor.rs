//! Port monitor lifecycle
//!
//! `PortMonitor` is the explicit owner of the polling thread and of the
//! differ's previous snapshot. The differ moves into the first thread on
//! `start()`. A thread started later joins its predecessor before its first
//! tick and takes the differ from it, so the snapshot survives a stop/start
//! cycle without a lock and the caller of `start()` never waits on a poll.

use anyhow::{Context, Result};
use flume::{RecvTimeoutError, Sender};
use std::{
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

use super::{bus::CoreToUi, differ::PortDiffer};
use crate::utils::ports::PortSource;

/// Configuration for the polling loop
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Delay between two enumerations
    pub interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonitorState {
    #[default]
    Idle,
    Monitoring,
}

pub struct PortMonitor {
    source: Arc<dyn PortSource>,
    core_tx: Sender<CoreToUi>,
    config: MonitorConfig,
    state: MonitorState,
    differ: Option<PortDiffer>,
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<PortDiffer>>,
}

impl PortMonitor {
    pub fn new(
        source: Arc<dyn PortSource>,
        core_tx: Sender<CoreToUi>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            source,
            core_tx,
            config,
            state: MonitorState::Idle,
            differ: Some(PortDiffer::new()),
            stop_tx: None,
            handle: None,
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn is_monitoring(&self) -> bool {
        self.state == MonitorState::Monitoring
    }

    /// `idle -> monitoring`. Returns `Ok(false)` if already monitoring.
    pub fn start(&mut self) -> Result<bool> {
        if self.is_monitoring() {
            return Ok(false);
        }

        let previous = self.handle.take();
        let initial = self.differ.take();
        let (stop_tx, stop_rx) = flume::bounded::<()>(1);
        let source = Arc::clone(&self.source);
        let core_tx = self.core_tx.clone();
        let interval = self.config.interval;

        let handle = thread::Builder::new()
            .name("port-monitor".to_string())
            .spawn(move || {
                let mut differ = match previous {
                    Some(previous) => take_over(previous),
                    None => initial.unwrap_or_default(),
                };
                log::info!("Port monitor started (interval {interval:?})");
                loop {
                    if let Some(change) = differ.poll(source.as_ref()) {
                        log::info!(
                            "Ports changed: {} attached, new: {:?}",
                            change.ports.len(),
                            change.new_ports
                        );
                        if core_tx.send(CoreToUi::PortsChanged(change)).is_err() {
                            log::warn!("Port monitor: UI channel closed, exiting");
                            break;
                        }
                    }

                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                log::info!("Port monitor stopped");
                let _ = core_tx.send(CoreToUi::Stopped);
                differ
            })
            .context("Failed to spawn port monitor thread")?;

        self.stop_tx = Some(stop_tx);
        self.handle = Some(handle);
        self.state = MonitorState::Monitoring;
        Ok(true)
    }

    /// `monitoring -> idle`. Returns `false` if already idle.
    ///
    /// Only signals the thread; it finishes its current tick and exits on
    /// its own.
    pub fn stop(&mut self) -> bool {
        if !self.is_monitoring() {
            return false;
        }
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.try_send(());
        }
        self.state = MonitorState::Idle;
        true
    }

    /// Flip between the two states and return the new one.
    pub fn toggle(&mut self) -> Result<MonitorState> {
        if self.is_monitoring() {
            self.stop();
        } else {
            self.start()?;
        }
        Ok(self.state)
    }

}

/// Wait for the previous polling thread to finish its last tick and take its differ.
fn take_over(previous: JoinHandle<PortDiffer>) -> PortDiffer {
    match previous.join() {
        Ok(differ) => differ,
        Err(_) => {
            log::error!("Port monitor thread panicked, starting from an empty snapshot");
            PortDiffer::new()
        }
    }
}

impl Drop for PortMonitor {
    fn drop(&mut self) {
        self.stop();
        // Joining the newest thread also joins every thread it took over from.
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

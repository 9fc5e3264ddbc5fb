//! Core logic for comwatch
//!
//! Everything here is independent of the terminal front end:
//! - Port snapshot differ and the polling monitor that drives it
//! - Message bus from the polling thread to the UI thread
//! - Serial configuration persistence
//! - External terminal launcher

pub mod bus;
pub mod differ;
pub mod launcher;
pub mod monitor;
pub mod persistence;

pub use bus::{Bus, CoreToUi};
pub use differ::{PortChange, PortDiffer};
pub use launcher::{launch, LaunchCommand, LaunchError};
pub use monitor::{MonitorConfig, MonitorState, PortMonitor};
pub use persistence::{ConfigStore, SerialConfig};

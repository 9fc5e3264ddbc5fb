//! comwatch: serial port watcher
//!
//! Polls the operating system's serial-port enumeration once per second,
//! shows the attached ports in a terminal UI, highlights ports that appeared
//! since the last change, and launches an external terminal program (PuTTY by
//! default) for a port on double-click. The ports themselves are never opened.
//!
//! The `core` module holds the UI-independent pieces (differ, monitor,
//! configuration, launcher) and is what the integration tests drive.

#[doc(hidden)]
pub mod boot;
pub mod core;
pub mod i18n;
#[doc(hidden)]
pub mod tui;
pub mod utils;

pub use crate::core::{
    launch, Bus, ConfigStore, CoreToUi, LaunchCommand, LaunchError, MonitorConfig, MonitorState,
    PortChange, PortDiffer, PortMonitor, SerialConfig,
};
pub use utils::ports::{PortDescriptor, PortSource, SystemPortSource};

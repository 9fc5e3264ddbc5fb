//! Shared utilities for comwatch

pub mod ports;

pub use ports::*;

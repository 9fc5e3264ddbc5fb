use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serialport::{SerialPortInfo, SerialPortType};
use std::{cmp::Ordering, fmt};

/// One attached serial endpoint as reported by the OS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortDescriptor {
    pub port_name: String,
    pub manufacturer: Option<String>,
    pub description: Option<String>,
}

impl PortDescriptor {
    pub fn new(port_name: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            manufacturer: None,
            description: None,
        }
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl fmt::Display for PortDescriptor {
    /// `<name>[ [<manufacturer>]][ - <description>]`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.port_name)?;
        if let Some(manufacturer) = self.manufacturer.as_deref().filter(|s| !s.is_empty()) {
            write!(f, " [{manufacturer}]")?;
        }
        if let Some(description) = self.description.as_deref().filter(|s| !s.is_empty()) {
            write!(f, " - {description}")?;
        }
        Ok(())
    }
}

impl From<SerialPortInfo> for PortDescriptor {
    fn from(info: SerialPortInfo) -> Self {
        let (manufacturer, description) = match info.port_type {
            SerialPortType::UsbPort(usb) => (usb.manufacturer, usb.product),
            SerialPortType::BluetoothPort => (None, Some("Bluetooth".to_string())),
            _ => (None, None),
        };
        Self {
            port_name: info.port_name,
            manufacturer,
            description,
        }
    }
}

/// Something that can list the serial ports currently attached.
///
/// The monitor only depends on this trait so tests can script the device set.
pub trait PortSource: Send + Sync {
    fn enumerate(&self) -> Result<Vec<PortDescriptor>>;
}

/// Port source backed by the `serialport` crate's OS enumeration.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPortSource;

impl PortSource for SystemPortSource {
    fn enumerate(&self) -> Result<Vec<PortDescriptor>> {
        let ports = serialport::available_ports().context("Failed to enumerate serial ports")?;
        Ok(ports.into_iter().map(PortDescriptor::from).collect())
    }
}

/// Split a port name into its non-numeric prefix and trailing number.
///
/// `COM10` -> (`COM`, Some(10)), `/dev/ttyUSB0` -> (`/dev/ttyUSB`, Some(0)),
/// `/dev/cu.Bluetooth` -> (`/dev/cu.Bluetooth`, None).
pub fn split_numeric_suffix(name: &str) -> (&str, Option<u64>) {
    let digits_start = name
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i);

    match digits_start {
        Some(i) => match name[i..].parse::<u64>() {
            Ok(n) => (&name[..i], Some(n)),
            Err(_) => (name, None),
        },
        None => (name, None),
    }
}

/// Order port names by prefix, then by the numeric value of their suffix.
///
/// Names without a numeric suffix sort after numbered names sharing the prefix.
pub fn compare_port_names(a: &str, b: &str) -> Ordering {
    let (prefix_a, num_a) = split_numeric_suffix(a);
    let (prefix_b, num_b) = split_numeric_suffix(b);

    prefix_a
        .cmp(prefix_b)
        .then_with(|| match (num_a, num_b) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.cmp(b))
}

pub fn sort_ports(ports: &mut [PortDescriptor]) {
    ports.sort_by(|a, b| compare_port_names(&a.port_name, &b.port_name));
}

/// Enumerate ports once via `source` and return them in display order.
pub fn enumerate_sorted(source: &dyn PortSource) -> Result<Vec<PortDescriptor>> {
    let mut ports = source.enumerate()?;
    sort_ports(&mut ports);
    Ok(ports)
}

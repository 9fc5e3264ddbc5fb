//! Serial configuration persistence
//!
//! The record is a flat JSON object with six string values:
//!
//! ```json
//! {
//!     "baudrate": "115200",
//!     "data_bits": "8",
//!     "stop_bits": "1",
//!     "parity": "NONE",
//!     "flow_control": "NONE",
//!     "putty_path": "putty.exe"
//! }
//! ```
//!
//! Unknown keys are ignored. A missing key, or a value that cannot be
//! understood, takes that field's default while the other fields are kept. A
//! file that is absent or is not a JSON object yields the default record;
//! loading never fails from the caller's point of view.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// File name used when no explicit path is given.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Baud rates offered by the configuration form.
pub const BAUD_RATES: [u32; 11] = [
    1200, 2400, 4800, 9600, 19200, 38400, 57600, 115200, 230400, 460800, 921600,
];

pub const DEFAULT_BAUD_RATE: u32 = 115200;

#[cfg(windows)]
pub const DEFAULT_PROGRAM_PATH: &str = "putty.exe";
#[cfg(not(windows))]
pub const DEFAULT_PROGRAM_PATH: &str = "putty";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
pub enum DataBits {
    #[strum(serialize = "5")]
    #[serde(rename = "5")]
    Five,
    #[strum(serialize = "6")]
    #[serde(rename = "6")]
    Six,
    #[strum(serialize = "7")]
    #[serde(rename = "7")]
    Seven,
    #[default]
    #[strum(serialize = "8")]
    #[serde(rename = "8")]
    Eight,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
pub enum StopBits {
    #[default]
    #[strum(serialize = "1")]
    #[serde(rename = "1")]
    One,
    #[strum(serialize = "1.5")]
    #[serde(rename = "1.5")]
    OnePointFive,
    #[strum(serialize = "2")]
    #[serde(rename = "2")]
    Two,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Parity {
    #[default]
    None,
    Even,
    Odd,
    Mark,
    Space,
}

impl Parity {
    /// First letter of the persisted name, as used in `-sercfg`.
    pub fn initial(self) -> char {
        match self {
            Parity::None => 'N',
            Parity::Even => 'E',
            Parity::Odd => 'O',
            Parity::Mark => 'M',
            Parity::Space => 'S',
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
pub enum FlowControl {
    #[default]
    #[strum(serialize = "NONE")]
    #[serde(rename = "NONE")]
    None,
    #[strum(serialize = "XON/XOFF")]
    #[serde(rename = "XON/XOFF")]
    XonXoff,
    #[strum(serialize = "RTS/CTS")]
    #[serde(rename = "RTS/CTS")]
    RtsCts,
    #[strum(serialize = "DSR/DTR")]
    #[serde(rename = "DSR/DTR")]
    DsrDtr,
}

/// The persisted serial parameters plus the external program path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SerialConfig {
    #[serde(serialize_with = "baud_to_string")]
    pub baudrate: u32,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub parity: Parity,
    pub flow_control: FlowControl,
    pub putty_path: PathBuf,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baudrate: DEFAULT_BAUD_RATE,
            data_bits: DataBits::default(),
            stop_bits: StopBits::default(),
            parity: Parity::default(),
            flow_control: FlowControl::default(),
            putty_path: PathBuf::from(DEFAULT_PROGRAM_PATH),
        }
    }
}

fn baud_to_string<S: Serializer>(baud: &u32, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&baud.to_string())
}

impl<'de> Deserialize<'de> for SerialConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        let defaults = SerialConfig::default();
        Ok(Self {
            baudrate: field_or(&raw, "baudrate", defaults.baudrate, parse_baud_rate),
            data_bits: field_or(&raw, "data_bits", defaults.data_bits, parse_choice),
            stop_bits: field_or(&raw, "stop_bits", defaults.stop_bits, parse_choice),
            parity: field_or(&raw, "parity", defaults.parity, parse_choice),
            flow_control: field_or(&raw, "flow_control", defaults.flow_control, parse_choice),
            putty_path: field_or(&raw, "putty_path", defaults.putty_path, parse_program_path),
        })
    }
}

/// Textual form of a stored value; numbers are accepted alongside strings.
fn field_text(raw: &Map<String, Value>, key: &str) -> Option<String> {
    match raw.get(key)? {
        Value::Null => None,
        Value::String(text) => Some(text.trim().to_string()),
        other => Some(other.to_string()),
    }
}

/// Parse one field, keeping `default` when it is missing or unusable.
fn field_or<T>(
    raw: &Map<String, Value>,
    key: &str,
    default: T,
    parse: impl FnOnce(&str) -> Result<T>,
) -> T {
    let Some(text) = field_text(raw, key) else {
        return default;
    };
    match parse(&text) {
        Ok(value) => value,
        Err(err) => {
            log::warn!("Ignoring config value {key} = {text:?}: {err:#}");
            default
        }
    }
}

fn parse_choice<T>(raw: &str) -> Result<T>
where
    T: FromStr<Err = strum::ParseError>,
{
    T::from_str(&raw.to_ascii_uppercase()).with_context(|| format!("Unknown choice {raw:?}"))
}

fn parse_program_path(raw: &str) -> Result<PathBuf> {
    if raw.is_empty() {
        bail!("Empty program path");
    }
    Ok(PathBuf::from(raw))
}

/// Parse a stored baud rate.
///
/// Any positive integer is kept; the form only offers [`BAUD_RATES`].
pub fn parse_baud_rate(raw: &str) -> Result<u32> {
    let baud = u32::from_str(raw.trim()).with_context(|| format!("Invalid baud rate {raw:?}"))?;
    if baud == 0 {
        bail!("Baud rate must be positive");
    }
    Ok(baud)
}

/// Return the next (or previous) entry of an enumerated choice list, wrapping.
pub fn cycle<T: IntoEnumIterator + PartialEq + Copy>(current: T, forward: bool) -> T {
    let all: Vec<T> = T::iter().collect();
    let idx = all.iter().position(|v| *v == current).unwrap_or(0);
    let next = if forward {
        (idx + 1) % all.len()
    } else {
        (idx + all.len() - 1) % all.len()
    };
    all[next]
}

/// Same as [`cycle`] for the baud rate list.
pub fn cycle_baud_rate(current: u32, forward: bool) -> u32 {
    let idx = BAUD_RATES
        .iter()
        .position(|b| *b == current)
        .unwrap_or_else(|| {
            BAUD_RATES
                .iter()
                .position(|b| *b == DEFAULT_BAUD_RATE)
                .unwrap_or(0)
        });
    let len = BAUD_RATES.len();
    let next = if forward { (idx + 1) % len } else { (idx + len - 1) % len };
    BAUD_RATES[next]
}

/// Handle on the configuration file at a fixed location.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `config.json` in the current working directory.
    pub fn in_working_dir() -> Result<Self> {
        let dir = std::env::current_dir().context("Failed to get current working directory")?;
        Ok(Self::new(dir.join(CONFIG_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the record, substituting defaults on any failure.
    pub fn load(&self) -> SerialConfig {
        match self.try_load() {
            Ok(Some(config)) => {
                log::debug!("Loaded serial configuration from {:?}", self.path);
                config
            }
            Ok(None) => {
                log::debug!("No configuration at {:?}, using defaults", self.path);
                SerialConfig::default()
            }
            Err(err) => {
                log::warn!("Falling back to default configuration: {err:#}");
                SerialConfig::default()
            }
        }
    }

    /// Read the record, distinguishing "absent" from "unreadable".
    pub fn try_load(&self) -> Result<Option<SerialConfig>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read config from {:?}", self.path))?;
        let config = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config at {:?}", self.path))?;
        Ok(Some(config))
    }

    pub fn save(&self, config: &SerialConfig) -> Result<()> {
        let json = serde_json::to_string_pretty(config).context("Failed to serialize config")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write config to {:?}", self.path))?;
        log::info!("Saved serial configuration to {:?}", self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = SerialConfig::default();
        assert_eq!(config.baudrate, 115200);
        assert_eq!(config.data_bits.to_string(), "8");
        assert_eq!(config.stop_bits.to_string(), "1");
        assert_eq!(config.parity.to_string(), "NONE");
        assert_eq!(config.flow_control.to_string(), "NONE");
        assert_eq!(config.putty_path, PathBuf::from(DEFAULT_PROGRAM_PATH));
    }

    #[test]
    fn serializes_every_value_as_string() {
        let config = SerialConfig {
            baudrate: 9600,
            data_bits: DataBits::Seven,
            stop_bits: StopBits::OnePointFive,
            parity: Parity::Even,
            flow_control: FlowControl::RtsCts,
            putty_path: PathBuf::from("C:/tools/putty.exe"),
        };
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["baudrate"], "9600");
        assert_eq!(value["data_bits"], "7");
        assert_eq!(value["stop_bits"], "1.5");
        assert_eq!(value["parity"], "EVEN");
        assert_eq!(value["flow_control"], "RTS/CTS");
        assert_eq!(value["putty_path"], "C:/tools/putty.exe");
    }

    #[test]
    fn missing_keys_take_defaults_and_unknown_keys_are_ignored() {
        let config: SerialConfig =
            serde_json::from_str(r#"{ "parity": "ODD", "theme": "dark" }"#).unwrap();
        assert_eq!(config.parity, Parity::Odd);
        assert_eq!(config.baudrate, DEFAULT_BAUD_RATE);
        assert_eq!(config.data_bits, DataBits::Eight);
    }

    #[test]
    fn unusable_values_fall_back_per_field() {
        let config: SerialConfig = serde_json::from_str(
            r#"{ "baudrate": "fast", "data_bits": "9", "parity": "EVEN", "putty_path": "" }"#,
        )
        .unwrap();
        assert_eq!(config.baudrate, DEFAULT_BAUD_RATE);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.parity, Parity::Even);
        assert_eq!(config.putty_path, PathBuf::from(DEFAULT_PROGRAM_PATH));
    }

    #[test]
    fn numbers_and_lowercase_choices_are_understood() {
        let config: SerialConfig = serde_json::from_str(
            r#"{ "baudrate": 250000, "data_bits": 7, "stop_bits": 2, "parity": "odd", "flow_control": "rts/cts" }"#,
        )
        .unwrap();
        assert_eq!(config.baudrate, 250000);
        assert_eq!(config.data_bits, DataBits::Seven);
        assert_eq!(config.stop_bits, StopBits::Two);
        assert_eq!(config.parity, Parity::Odd);
        assert_eq!(config.flow_control, FlowControl::RtsCts);
    }

    #[test]
    fn non_object_record_is_rejected() {
        assert!(serde_json::from_str::<SerialConfig>(r#"["115200"]"#).is_err());
        assert_eq!(parse_baud_rate("0").ok(), None);
    }

    #[test]
    fn parity_initials() {
        let initials: String = Parity::iter().map(Parity::initial).collect();
        assert_eq!(initials, "NEOMS");
        for parity in Parity::iter() {
            assert_eq!(Some(parity.initial()), parity.to_string().chars().next());
        }
    }

    #[test]
    fn cycling_wraps_around() {
        assert_eq!(cycle(Parity::Space, true), Parity::None);
        assert_eq!(cycle(Parity::None, false), Parity::Space);
        assert_eq!(cycle(StopBits::One, true), StopBits::OnePointFive);
        assert_eq!(cycle_baud_rate(921600, true), 1200);
        assert_eq!(cycle_baud_rate(1200, false), 921600);
        assert_eq!(cycle_baud_rate(9600, true), 19200);
    }

    #[test]
    fn flow_control_parses_from_display_names() {
        for flow in FlowControl::iter() {
            assert_eq!(FlowControl::from_str(&flow.to_string()).unwrap(), flow);
        }
    }
}

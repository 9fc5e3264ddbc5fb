//! External terminal launcher
//!
//! Builds the PuTTY-style command line for a port and starts it detached.
//! Nothing is retried: failures go straight back to the UI.

use derive_more::{Display, Error};
use std::{
    io,
    path::PathBuf,
    process::{Child, Command, ExitStatus, Stdio},
    thread::{self, JoinHandle},
};

use super::persistence::SerialConfig;

#[derive(Debug, Display, Error)]
pub enum LaunchError {
    #[display("external program not found: {}", path.display())]
    ProgramNotFound { path: PathBuf },
    #[display("failed to start {}: {source}", path.display())]
    Spawn { path: PathBuf, source: io::Error },
}

/// A fully composed invocation, ready to be spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl LaunchCommand {
    /// `<program> -serial <PORT> -sercfg <baud>,<data>,<parity>,<stop>`
    pub fn for_port(port_name: &str, config: &SerialConfig) -> Self {
        Self {
            program: config.putty_path.clone(),
            args: vec![
                "-serial".to_string(),
                port_name.to_string(),
                "-sercfg".to_string(),
                serial_settings(config),
            ],
        }
    }

    /// Start the program without waiting for it.
    ///
    /// Returns the child's pid. The child is reaped by a background thread
    /// once it exits.
    pub fn spawn(&self) -> Result<u32, LaunchError> {
        if !self.program.exists() {
            return Err(LaunchError::ProgramNotFound {
                path: self.program.clone(),
            });
        }

        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                path: self.program.clone(),
                source,
            })?;

        let pid = child.id();
        if let Err(err) = reap_in_background(child) {
            log::warn!("Failed to start waiter for pid {pid}: {err}");
        }
        Ok(pid)
    }
}

/// Wait for `child` on its own thread so it does not linger after exiting.
pub(crate) fn reap_in_background(
    mut child: Child,
) -> io::Result<JoinHandle<Option<ExitStatus>>> {
    let pid = child.id();
    thread::Builder::new()
        .name(format!("launch-waiter-{pid}"))
        .spawn(move || match child.wait() {
            Ok(status) => {
                log::debug!("Terminal program (pid {pid}) exited with {status}");
                Some(status)
            }
            Err(err) => {
                log::warn!("Failed to wait for pid {pid}: {err}");
                None
            }
        })
}

/// The `-sercfg` value: baud, data bits, parity initial and stop bits.
pub fn serial_settings(config: &SerialConfig) -> String {
    format!(
        "{},{},{},{}",
        config.baudrate,
        config.data_bits,
        config.parity.initial(),
        config.stop_bits
    )
}

/// Compose and start the terminal program for `port_name`.
pub fn launch(port_name: &str, config: &SerialConfig) -> Result<u32, LaunchError> {
    let command = LaunchCommand::for_port(port_name, config);
    log::info!(
        "Launching {} {}",
        command.program.display(),
        command.args.join(" ")
    );
    match command.spawn() {
        Ok(pid) => {
            log::info!("Terminal program started for {port_name} (pid {pid})");
            Ok(pid)
        }
        Err(err) => {
            log::warn!("Launch for {port_name} failed: {err}");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::persistence::{DataBits, Parity, StopBits};

    #[test]
    fn composes_sercfg_argument() {
        let config = SerialConfig {
            baudrate: 9600,
            data_bits: DataBits::Eight,
            parity: Parity::Even,
            stop_bits: StopBits::One,
            ..SerialConfig::default()
        };
        assert_eq!(serial_settings(&config), "9600,8,E,1");
    }

    #[test]
    fn composes_full_command_line() {
        let config = SerialConfig {
            baudrate: 115200,
            data_bits: DataBits::Seven,
            parity: Parity::Odd,
            stop_bits: StopBits::OnePointFive,
            putty_path: PathBuf::from("/opt/putty/putty"),
            ..SerialConfig::default()
        };
        let command = LaunchCommand::for_port("COM7", &config);
        assert_eq!(command.program, PathBuf::from("/opt/putty/putty"));
        assert_eq!(command.args, ["-serial", "COM7", "-sercfg", "115200,7,O,1.5"]);
    }

    #[test]
    fn missing_program_is_reported_before_spawning() {
        let config = SerialConfig {
            putty_path: PathBuf::from("/definitely/not/here/putty"),
            ..SerialConfig::default()
        };
        let err = launch("COM1", &config).unwrap_err();
        assert!(matches!(err, LaunchError::ProgramNotFound { .. }));
        assert!(err.to_string().contains("/definitely/not/here/putty"));
    }

    #[cfg(unix)]
    #[test]
    fn exited_child_is_reaped() {
        let program = std::path::Path::new("/bin/true");
        if !program.exists() {
            return;
        }
        let child = Command::new(program).spawn().unwrap();
        let waiter = reap_in_background(child).unwrap();
        let status = waiter.join().unwrap();
        assert!(status.is_some_and(|s| s.success()));
    }
}

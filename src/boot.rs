use anyhow::Result;
use chrono::Local;
use log::LevelFilter;
use std::{
    io::{self, Write},
    path::PathBuf,
    sync::Arc,
};

use clap::ArgMatches;
use env_logger::{Builder, Target};

use crate::{
    core::persistence::ConfigStore,
    utils::ports::{enumerate_sorted, SystemPortSource},
};

/// Common initialization used by every entrypoint.
///
/// The TUI owns the terminal, so logs go to a file: `COMWATCH_LOG_FILE` if
/// set, or a timestamped file in debug builds.
pub fn init_common() {
    let log_file = std::env::var("COMWATCH_LOG_FILE").ok().or_else(|| {
        #[cfg(debug_assertions)]
        {
            Some(format!("./log_{}.log", Local::now().format("%Y%m%d%H%M%S")))
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    });

    if let Some(path) = log_file {
        if let Err(err) = init_file_logger(&path) {
            eprintln!("Failed to initialize file logger at '{path}': {err}");
            env_logger::init();
        }
    } else {
        env_logger::init();
    }

    crate::i18n::init_i18n();
}

/// Resolve the configuration store from `--config`, defaulting to the working directory.
pub fn config_store(matches: &ArgMatches) -> Result<ConfigStore> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => Ok(ConfigStore::new(path.clone())),
        None => ConfigStore::in_working_dir(),
    }
}

pub fn start_tui(matches: &ArgMatches) -> Result<()> {
    let store = config_store(matches)?;
    crate::tui::start(store, Arc::new(SystemPortSource))
}

/// One-shot listing for `--list-ports`.
pub fn list_ports(matches: &ArgMatches) -> Result<()> {
    let ports = enumerate_sorted(&SystemPortSource)?;
    let mut stdout = io::stdout().lock();
    if matches.get_flag("json") {
        serde_json::to_writer_pretty(&mut stdout, &ports)?;
        writeln!(stdout)?;
    } else {
        for port in &ports {
            writeln!(stdout, "{port}")?;
        }
    }
    Ok(())
}

fn init_file_logger(path: &str) -> io::Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    let mut builder = Builder::new();
    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "{}:{} {} [{}] - {}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        })
        .target(Target::Pipe(Box::new(file)))
        .filter_level(LevelFilter::Debug)
        .parse_default_env()
        .init();

    log::info!("File logger initialized at {path}");

    Ok(())
}

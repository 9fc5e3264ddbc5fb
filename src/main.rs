use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;

fn build_command() -> Command {
    Command::new("comwatch")
        .about("Watch serial ports and launch a terminal program for them")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Configuration file (default: ./config.json)"),
        )
        .arg(
            Arg::new("list-ports")
                .long("list-ports")
                .short('l')
                .help("Print the attached serial ports once and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("With --list-ports, print JSON")
                .requires("list-ports")
                .action(ArgAction::SetTrue),
        )
}

fn main() -> anyhow::Result<()> {
    comwatch::boot::init_common();
    let matches = build_command().get_matches();

    if matches.get_flag("list-ports") {
        log::info!("Listing ports by argument");
        return comwatch::boot::list_ports(&matches);
    }

    log::info!("Launching TUI mode");
    comwatch::boot::start_tui(&matches)
}

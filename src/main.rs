use anyhow::Result;
use clap::{Arg, ArgMatches, Command};

use rigmon::commands;
use rigmon::core::config::Config;

fn build_cli() -> Command {
    Command::new("rigmon")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Real-time sensor monitor and safety alarm for the drilling test rig")
        .disable_version_flag(true)
        .arg(
            Arg::new("version")
                .short('v')
                .short_alias('V')
                .long("version")
                .help("Print version information")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("HOST")
                .help("Sensor store host (overrides config)")
                .global(true),
        )
        .arg(
            Arg::new("port")
                .long("port")
                .value_name("PORT")
                .help("Sensor store port (overrides config)")
                .value_parser(clap::value_parser!(u16))
                .global(true),
        )
        .subcommand(
            Command::new("monitor")
                .about("Open the live rig dashboard")
                .arg(
                    Arg::new("interval")
                        .short('i')
                        .long("interval")
                        .value_name("MS")
                        .help("Poll period in milliseconds (default: 33)")
                        .value_parser(clap::value_parser!(u64).range(1..)),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Stream snapshots as JSON lines instead of the dashboard")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("log")
                        .long("log")
                        .help("With --json: start logging now and stop it on Ctrl-C")
                        .action(clap::ArgAction::SetTrue)
                        .requires("json"),
                ),
        )
        .subcommand(
            Command::new("read")
                .about("Read every sensor once and print the values")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the snapshot as JSON")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("log")
                .about("Signal the rig logger (use 'rigmon log --help' for subcommands)")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(Command::new("start").about("Start logging"))
                .subcommand(Command::new("stop").about("Stop logging")),
        )
        .subcommand(Command::new("channels").about("List sensor channels and store keys"))
        .subcommand(
            Command::new("config")
                .about("Manage configuration (use 'rigmon config --help' for subcommands)")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(Command::new("show").about("Print the current configuration"))
                .subcommand(Command::new("path").about("Print the configuration file path"))
                .subcommand(Command::new("reset").about("Restore default configuration"))
                .subcommand(
                    Command::new("set")
                        .about("Set a configuration value, e.g. alerts.max_pressure 110")
                        .arg(
                            Arg::new("key")
                                .help(format!("One of: {}", Config::KEYS.join(", ")))
                                .required(true)
                                .index(1),
                        )
                        .arg(Arg::new("value").required(true).index(2)),
                ),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completions")
                .arg(
                    Arg::new("shell")
                        .help("bash, zsh, fish, powershell or elvish")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(Command::new("version").about("Shows version information"))
}

fn init_logging(matches: &ArgMatches) {
    // The dashboard owns the terminal; send its logs to a file
    if let Some(("monitor", sub_matches)) = matches.subcommand() {
        if !sub_matches.get_flag("json") {
            let logged = Config::get_log_path()
                .map_err(|e| e.to_string())
                .and_then(|path| rigmon::init_file_logging(&path).map_err(|e| e.to_string()));
            if let Err(e) = logged {
                rigmon::ui::warn(&format!("Logging disabled: {}", e));
            }
            return;
        }
    }
    rigmon::init_logging();
}

fn main() -> Result<()> {
    let matches = build_cli().get_matches();
    init_logging(&matches);

    if matches.get_flag("version") {
        return commands::version();
    }

    match matches.subcommand() {
        Some(("monitor", sub_matches)) => commands::monitor::execute(sub_matches)?,
        Some(("read", sub_matches)) => commands::read::execute(sub_matches)?,
        Some(("log", sub_matches)) => commands::logging::execute(sub_matches)?,
        Some(("channels", _)) => commands::channels()?,
        Some(("config", sub_matches)) => commands::config::execute(sub_matches)?,
        Some(("completions", sub_matches)) => {
            commands::completions::execute(sub_matches, &mut build_cli())?
        }
        Some(("version", _)) => commands::version()?,
        _ => {
            println!("Welcome to rigmon!");
            println!("Use 'rigmon --help' for more information.");
        }
    }

    Ok(())
}

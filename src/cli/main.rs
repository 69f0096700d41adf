//! Command-line interface entry point for `timetabler`

mod args;
mod commands;

use args::{Cli, Command};
use clap::Parser;
use timetabler::config::Config;
use timetabler::shared::logger::{enable_debug, set_level, set_level_from_str, Level};

fn main() {
    let args = Cli::parse();

    // Load configuration once at startup and apply CLI overrides to it
    let mut config = Config::load();
    let defaults = Config::from_defaults();
    config.apply_overrides(&args.to_config_overrides());

    // Runtime log level: CLI flag overrides config; fallback warn
    if let Some(level) = args.log_level {
        set_level(level.into());
    } else if !set_level_from_str(&config.logging.level) {
        set_level(Level::Warn);
    }
    if args.debug_flag {
        set_level(Level::Debug);
        enable_debug();
    }

    match args.command {
        Command::Config { subcommand } => {
            commands::config::run(subcommand, &mut config, &defaults);
        }
        Command::Generate { .. } => {
            commands::generate::run(&config);
        }
        Command::Check { .. } => {
            commands::check::run(&config);
        }
    }
}

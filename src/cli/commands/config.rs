//! Config command handler

use crate::args::ConfigSubcommand;
use std::io::{self, Write};
use timetabler::config::Config;

/// Dispatch config subcommands
///
/// Routes config subcommands to their appropriate handlers. If no
/// subcommand is provided, displays all configuration values.
pub fn run(subcommand: Option<ConfigSubcommand>, config: &mut Config, defaults: &Config) {
    match subcommand {
        None => handle_config_get(config, None),
        Some(ConfigSubcommand::Get { key }) => handle_config_get(config, key),
        Some(ConfigSubcommand::Set { key, value }) => handle_config_set(config, &key, &value),
        Some(ConfigSubcommand::Unset { key }) => handle_config_unset(config, defaults, &key),
        Some(ConfigSubcommand::Reset) => handle_config_reset(),
    }
}

/// Display configuration values; a key shows only that value
pub fn handle_config_get(config: &Config, key: Option<String>) {
    if let Some(k) = key {
        match config.get(&k) {
            Some(value) => println!("{value}"),
            None => eprintln!("Unknown config key: '{k}'"),
        }
    } else {
        println!("\n=== Configuration ===\n");
        print!("{config}");
    }
}

/// Set a configuration value and persist it to disk
pub fn handle_config_set(config: &mut Config, key: &str, value: &str) {
    if let Err(e) = config.set(key, value) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    if let Err(e) = config.save() {
        eprintln!("Failed to save config: {e}");
        std::process::exit(1);
    }

    println!("✓ Set {key} = {value}");
}

/// Reset a configuration value to its default and persist to disk
pub fn handle_config_unset(config: &mut Config, defaults: &Config, key: &str) {
    if let Err(e) = config.unset(key, defaults) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    if let Err(e) = config.save() {
        eprintln!("Failed to save config: {e}");
        std::process::exit(1);
    }

    println!("✓ Reset {key} to default");
}

/// Reset all configuration to defaults after confirmation
pub fn handle_config_reset() {
    if !Config::get_config_file_path().exists() {
        println!("✓ Config is already at defaults");
        return;
    }

    print!("Are you sure you want to reset config to defaults? (y/n): ");
    if io::stdout().flush().is_err() {
        eprintln!("Warning: Failed to flush stdout");
    }

    let mut response = String::new();
    if io::stdin().read_line(&mut response).is_err() {
        eprintln!("Failed to read user input");
        std::process::exit(1);
    }

    if response.trim().eq_ignore_ascii_case("y") || response.trim().eq_ignore_ascii_case("yes") {
        if let Err(e) = Config::reset() {
            eprintln!("Failed to remove config file: {e}");
            std::process::exit(1);
        }
        println!("✓ Config reset to defaults");
    } else {
        println!("✗ Reset cancelled");
    }
}

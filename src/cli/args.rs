//! CLI argument definitions for `timetabler`

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use timetabler::config::ConfigOverrides;
use timetabler::shared::logger::Level;

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
}

impl From<LogLevelArg> for Level {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => Self::Error,
            LogLevelArg::Warn => Self::Warn,
            LogLevelArg::Info => Self::Info,
            LogLevelArg::Debug => Self::Debug,
        }
    }
}

impl std::fmt::Display for LogLevelArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let as_str = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        };
        write!(f, "{as_str}")
    }
}

#[derive(Debug, Subcommand)]
pub enum ConfigSubcommand {
    /// Display configuration values.
    ///
    /// If a KEY is provided, displays only that configuration value.
    /// If no KEY is provided, displays all configuration values.
    Get {
        /// Optional configuration key to display (e.g., `time_limit_seconds`)
        #[arg(value_name = "KEY")]
        key: Option<String>,
    },
    /// Set a configuration value.
    Set {
        /// Configuration key to set
        #[arg(value_name = "KEY")]
        key: String,
        /// Value to set
        #[arg(value_name = "VALUE")]
        value: String,
    },
    /// Unset a configuration value.
    Unset {
        /// Configuration key to unset
        #[arg(value_name = "KEY")]
        key: String,
    },
    /// Reset configuration to defaults (requires confirmation).
    Reset,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a timetable from a dataset directory.
    Generate {
        /// Dataset directory (falls back to config `input_dir`)
        #[arg(short = 'i', long, value_name = "DIR")]
        input_dir: Option<PathBuf>,

        /// Output directory (falls back to config `output_dir`)
        #[arg(short = 'o', long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Wall-clock solve limit in seconds
        #[arg(long, value_name = "SECONDS")]
        time_limit: Option<u64>,

        /// Parallel search workers
        #[arg(long, value_name = "N")]
        num_workers: Option<u32>,

        /// Simultaneous lab-block ceiling
        #[arg(long, value_name = "N")]
        lab_room_capacity: Option<u32>,
    },
    /// Run the pre-solve feasibility checks without solving.
    Check {
        /// Dataset directory (falls back to config `input_dir`)
        #[arg(short = 'i', long, value_name = "DIR")]
        input_dir: Option<PathBuf>,
    },
    /// Manage configuration.
    ///
    /// If no subcommand is provided, displays all configuration values.
    Config {
        #[command(subcommand)]
        subcommand: Option<ConfigSubcommand>,
    },
}

#[derive(Parser, Debug)]
#[command(
    name = "timetabler",
    about = "Department timetable generator",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    /// Set the runtime log level (error|warn|info|debug). Falls back to config if omitted.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Enable debug-level logging and runtime debug flag (shorthand)
    #[arg(long = "debug")]
    pub debug_flag: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Convert CLI flags into config overrides
    pub fn to_config_overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides {
            level: self.log_level.map(|lvl| lvl.to_string()),
            ..ConfigOverrides::default()
        };
        if let Command::Generate {
            input_dir,
            output_dir,
            time_limit,
            num_workers,
            lab_room_capacity,
        } = &self.command
        {
            overrides.input_dir = input_dir
                .as_ref()
                .map(|p| p.to_string_lossy().to_string());
            overrides.output_dir = output_dir
                .as_ref()
                .map(|p| p.to_string_lossy().to_string());
            overrides.time_limit_seconds = *time_limit;
            overrides.num_workers = *num_workers;
            overrides.lab_room_capacity = *lab_room_capacity;
        }
        if let Command::Check { input_dir } = &self.command {
            overrides.input_dir = input_dir
                .as_ref()
                .map(|p| p.to_string_lossy().to_string());
        }
        overrides
    }
}

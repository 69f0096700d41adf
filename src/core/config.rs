//! Configuration module for `timetabler`
//!
//! TOML configuration under the platform config directory with embedded
//! defaults and CLI overrides.

use crate::core::solve::SolverParams;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Embedded default configuration
const CONFIG_DEFAULTS: &str = include_str!("../assets/DefaultConfig.toml");

const CONFIG_FILE_NAME: &str = "config.toml";

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug)
    #[serde(default)]
    pub level: String,
    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,
}

fn default_time_limit() -> u64 {
    60
}
fn default_workers() -> u32 {
    8
}
fn default_lab_capacity() -> u32 {
    2
}
fn default_periods_per_day() -> u32 {
    8
}
fn default_days_per_week() -> u32 {
    6
}
fn default_weeks() -> u32 {
    19
}
fn default_period_length() -> f64 {
    0.75
}

/// Solver and model parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Wall-clock cap on solving, in seconds
    #[serde(default = "default_time_limit")]
    pub time_limit_seconds: u64,
    /// Parallel search workers
    #[serde(default = "default_workers")]
    pub num_workers: u32,
    /// Global simultaneous lab-block ceiling
    #[serde(default = "default_lab_capacity")]
    pub lab_room_capacity: u32,
    /// Teaching periods per day
    #[serde(default = "default_periods_per_day")]
    pub periods_per_day: u32,
    /// Teaching days per week
    #[serde(default = "default_days_per_week")]
    pub days_per_week: u32,
    /// Weeks to model when the calendar yields none
    #[serde(default = "default_weeks")]
    pub default_weeks: u32,
    /// Length of one teaching period in hours
    #[serde(default = "default_period_length")]
    pub period_length_hours: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_seconds: default_time_limit(),
            num_workers: default_workers(),
            lab_room_capacity: default_lab_capacity(),
            periods_per_day: default_periods_per_day(),
            days_per_week: default_days_per_week(),
            default_weeks: default_weeks(),
            period_length_hours: default_period_length(),
        }
    }
}

/// Paths configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding the dataset JSON files
    #[serde(default)]
    pub input_dir: String,
    /// Directory for generated timetable files
    #[serde(default)]
    pub output_dir: String,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Solver settings
    #[serde(default)]
    pub solver: SolverConfig,
    /// Path settings
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Optional CLI overrides for configuration values
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override logging level
    pub level: Option<String>,
    /// Override input directory
    pub input_dir: Option<String>,
    /// Override output directory
    pub output_dir: Option<String>,
    /// Override solve time limit
    pub time_limit_seconds: Option<u64>,
    /// Override worker count
    pub num_workers: Option<u32>,
    /// Override lab room capacity
    pub lab_room_capacity: Option<u32>,
}

impl Config {
    /// Platform configuration directory for timetabler
    #[must_use]
    pub fn get_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("timetabler")
    }

    /// Full path of the configuration file
    #[must_use]
    pub fn get_config_file_path() -> PathBuf {
        Self::get_config_dir().join(CONFIG_FILE_NAME)
    }

    /// Configuration parsed from the embedded defaults
    #[must_use]
    pub fn from_defaults() -> Self {
        toml::from_str(CONFIG_DEFAULTS).unwrap_or_default()
    }

    /// Load configuration from disk, falling back to defaults when the
    /// file is absent or unreadable
    #[must_use]
    pub fn load() -> Self {
        let path = Self::get_config_file_path();
        match fs::read_to_string(&path) {
            Ok(raw) => toml::from_str(&raw).unwrap_or_else(|_| {
                eprintln!("⚠ Invalid config at {}; using defaults", path.display());
                Self::from_defaults()
            }),
            Err(_) => Self::from_defaults(),
        }
    }

    /// Persist the configuration to disk
    ///
    /// # Errors
    /// Returns a message when serialization or the write fails
    pub fn save(&self) -> Result<(), String> {
        let dir = Self::get_config_dir();
        fs::create_dir_all(&dir).map_err(|e| format!("Failed to create config dir: {e}"))?;
        let body =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        fs::write(Self::get_config_file_path(), body)
            .map_err(|e| format!("Failed to write config: {e}"))
    }

    /// Delete the configuration file, restoring defaults on next load
    ///
    /// # Errors
    /// Returns a message when the removal fails
    pub fn reset() -> Result<(), String> {
        fs::remove_file(Self::get_config_file_path())
            .map_err(|e| format!("Failed to remove config file: {e}"))
    }

    /// Apply CLI overrides on top of the loaded configuration
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(level) = &overrides.level {
            self.logging.level.clone_from(level);
        }
        if let Some(input_dir) = &overrides.input_dir {
            self.paths.input_dir.clone_from(input_dir);
        }
        if let Some(output_dir) = &overrides.output_dir {
            self.paths.output_dir.clone_from(output_dir);
        }
        if let Some(limit) = overrides.time_limit_seconds {
            self.solver.time_limit_seconds = limit;
        }
        if let Some(workers) = overrides.num_workers {
            self.solver.num_workers = workers;
        }
        if let Some(capacity) = overrides.lab_room_capacity {
            self.solver.lab_room_capacity = capacity;
        }
    }

    /// Solver parameters derived from this configuration
    #[must_use]
    pub const fn solver_params(&self) -> SolverParams {
        SolverParams {
            time_limit_seconds: self.solver.time_limit_seconds,
            num_workers: self.solver.num_workers,
            lab_room_capacity: self.solver.lab_room_capacity,
            periods_per_day: self.solver.periods_per_day,
            days_per_week: self.solver.days_per_week,
            default_weeks: self.solver.default_weeks,
        }
    }

    /// Get a configuration value by key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "level" => Some(self.logging.level.clone()),
            "verbose" => Some(self.logging.verbose.to_string()),
            "time_limit_seconds" => Some(self.solver.time_limit_seconds.to_string()),
            "num_workers" => Some(self.solver.num_workers.to_string()),
            "lab_room_capacity" => Some(self.solver.lab_room_capacity.to_string()),
            "periods_per_day" => Some(self.solver.periods_per_day.to_string()),
            "days_per_week" => Some(self.solver.days_per_week.to_string()),
            "default_weeks" => Some(self.solver.default_weeks.to_string()),
            "period_length_hours" => Some(self.solver.period_length_hours.to_string()),
            "input_dir" => Some(self.paths.input_dir.clone()),
            "output_dir" => Some(self.paths.output_dir.clone()),
            _ => None,
        }
    }

    /// Set a configuration value by key
    ///
    /// # Errors
    /// Returns a message for unknown keys or unparseable values
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, String> {
            value
                .parse()
                .map_err(|_| format!("Invalid value for '{key}': '{value}'"))
        }
        match key {
            "level" => self.logging.level = value.to_string(),
            "verbose" => {
                self.logging.verbose = match value.to_ascii_lowercase().as_str() {
                    "true" | "1" | "yes" => true,
                    "false" | "0" | "no" => false,
                    _ => return Err(format!("Invalid boolean for 'verbose': '{value}'")),
                };
            }
            "time_limit_seconds" => self.solver.time_limit_seconds = parse(key, value)?,
            "num_workers" => self.solver.num_workers = parse(key, value)?,
            "lab_room_capacity" => self.solver.lab_room_capacity = parse(key, value)?,
            "periods_per_day" => self.solver.periods_per_day = parse(key, value)?,
            "days_per_week" => self.solver.days_per_week = parse(key, value)?,
            "default_weeks" => self.solver.default_weeks = parse(key, value)?,
            "period_length_hours" => self.solver.period_length_hours = parse(key, value)?,
            "input_dir" => self.paths.input_dir = value.to_string(),
            "output_dir" => self.paths.output_dir = value.to_string(),
            _ => return Err(format!("Unknown config key: '{key}'")),
        }
        Ok(())
    }

    /// Reset a single key to its default value
    ///
    /// # Errors
    /// Returns a message for unknown keys
    pub fn unset(&mut self, key: &str, defaults: &Self) -> Result<(), String> {
        let default_value = defaults
            .get(key)
            .ok_or_else(|| format!("Unknown config key: '{key}'"))?;
        self.set(key, &default_value)
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[logging]")?;
        writeln!(f, "level = {}", self.logging.level)?;
        writeln!(f, "verbose = {}", self.logging.verbose)?;
        writeln!(f)?;
        writeln!(f, "[solver]")?;
        writeln!(f, "time_limit_seconds = {}", self.solver.time_limit_seconds)?;
        writeln!(f, "num_workers = {}", self.solver.num_workers)?;
        writeln!(f, "lab_room_capacity = {}", self.solver.lab_room_capacity)?;
        writeln!(f, "periods_per_day = {}", self.solver.periods_per_day)?;
        writeln!(f, "days_per_week = {}", self.solver.days_per_week)?;
        writeln!(f, "default_weeks = {}", self.solver.default_weeks)?;
        writeln!(
            f,
            "period_length_hours = {}",
            self.solver.period_length_hours
        )?;
        writeln!(f)?;
        writeln!(f, "[paths]")?;
        writeln!(f, "input_dir = {}", self.paths.input_dir)?;
        writeln!(f, "output_dir = {}", self.paths.output_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse_and_match_solver_params() {
        let config = Config::from_defaults();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.paths.input_dir, "input");

        let params = config.solver_params();
        assert_eq!(params, SolverParams::default());
    }

    #[test]
    fn get_and_set_round_trip() {
        let mut config = Config::from_defaults();
        assert!(config.set("time_limit_seconds", "120").is_ok());
        assert_eq!(config.get("time_limit_seconds"), Some("120".to_string()));

        assert!(config.set("verbose", "true").is_ok());
        assert!(config.logging.verbose);

        assert!(config.set("verbose", "maybe").is_err());
        assert!(config.set("unknown_key", "x").is_err());
        assert!(config.get("unknown_key").is_none());
    }

    #[test]
    fn unset_restores_default() {
        let mut config = Config::from_defaults();
        let defaults = Config::from_defaults();

        config.solver.num_workers = 32;
        assert!(config.unset("num_workers", &defaults).is_ok());
        assert_eq!(config.solver.num_workers, defaults.solver.num_workers);

        assert!(config.unset("nope", &defaults).is_err());
    }

    #[test]
    fn overrides_take_precedence() {
        let mut config = Config::from_defaults();
        config.apply_overrides(&ConfigOverrides {
            level: Some("debug".to_string()),
            input_dir: Some("data".to_string()),
            output_dir: None,
            time_limit_seconds: Some(5),
            num_workers: None,
            lab_room_capacity: Some(1),
        });

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.paths.input_dir, "data");
        assert_eq!(config.paths.output_dir, "output");
        assert_eq!(config.solver.time_limit_seconds, 5);
        assert_eq!(config.solver.lab_room_capacity, 1);
    }
}

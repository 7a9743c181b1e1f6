//! Runtime configuration.
//!
//! Loaded from an optional JSON file; every field has a default so a minimal
//! `{}` is a valid configuration. Command-line flags override the file.

use crate::error::{ClickerError, Result};
use crate::hotkey::parse_hotkey;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database holding the profiles table.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// JSON document with the last-used option values.
    #[serde(default = "default_settings_path")]
    pub settings_path: PathBuf,

    /// Global key that toggles auto-clicking.
    #[serde(default = "default_toggle_hotkey")]
    pub toggle_hotkey: String,

    /// Floor for the repeat interval; a zero interval runs at this rate.
    #[serde(
        default = "default_min_interval",
        serialize_with = "serialize_duration",
        deserialize_with = "deserialize_duration"
    )]
    pub min_interval: Duration,

    /// Let the hotkey start and stop clicking from the saved settings
    /// without waiting for a UI to answer.
    #[serde(default)]
    pub standalone: bool,

    #[serde(default)]
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            settings_path: default_settings_path(),
            toggle_hotkey: default_toggle_hotkey(),
            min_interval: default_min_interval(),
            standalone: false,
            verbose: false,
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| ClickerError::config_load(path, e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| ClickerError::config_load(path, e.to_string()))
    }

    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| ClickerError::config_save(path, e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.database_path.as_os_str().is_empty() {
            return Err(ClickerError::config_validation("database_path cannot be empty"));
        }
        if self.settings_path.as_os_str().is_empty() {
            return Err(ClickerError::config_validation("settings_path cannot be empty"));
        }
        if self.toggle_hotkey.trim().is_empty() {
            return Err(ClickerError::config_validation("toggle_hotkey cannot be empty"));
        }
        parse_hotkey(&self.toggle_hotkey)?;
        if self.min_interval.is_zero() {
            return Err(ClickerError::config_validation("min_interval must be greater than zero"));
        }
        Ok(())
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from("database.db")
}

fn default_settings_path() -> PathBuf {
    PathBuf::from("options.json")
}

fn default_toggle_hotkey() -> String {
    "f9".to_string()
}

fn default_min_interval() -> Duration {
    Duration::from_millis(1)
}

/// Parses `"500"`, `"500ms"`, `"2s"`, `"5m"` or `"1h"`. Bare numbers are
/// milliseconds.
pub fn parse_duration(value: &str) -> Result<Duration> {
    let s = value.trim().to_lowercase();
    if s.is_empty() {
        return Err(ClickerError::invalid_duration(value, "empty duration"));
    }

    let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (digits, unit) = s.split_at(split);
    if digits.is_empty() {
        return Err(ClickerError::invalid_duration(value, "expected a number"));
    }
    let amount: u64 = digits
        .parse()
        .map_err(|e: std::num::ParseIntError| ClickerError::invalid_duration(value, e.to_string()))?;

    let secs = |factor: u64| {
        amount
            .checked_mul(factor)
            .map(Duration::from_secs)
            .ok_or_else(|| ClickerError::invalid_duration(value, "too large"))
    };

    match unit.trim() {
        "" | "ms" => Ok(Duration::from_millis(amount)),
        "s" => secs(1),
        "m" => secs(60),
        "h" => secs(3600),
        other => Err(ClickerError::invalid_duration(
            value,
            format!("unknown unit '{}'", other),
        )),
    }
}

fn serialize_duration<S: Serializer>(value: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{}ms", value.as_millis()))
}

fn deserialize_duration<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Duration, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_duration(&raw).map_err(serde::de::Error::custom)
}

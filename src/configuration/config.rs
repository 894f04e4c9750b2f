use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error_handling::types::ConfigError;

/// Engine configuration, loaded from a TOML file.
///
/// # Fields Overview
///
/// - `database_url`: SeaORM connection string for the session store
/// - `clear_sessions`: when `true`, delete *all* stored sessions on
///   startup instead of only the pending crash residue
/// - `correlation_window_secs`: allowed +/- time difference between a
///   session and its opposite-kind match
/// - `ignore_failed_bait_session`: drop bait records whose client never
///   completed its scripted interaction
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database_url: String,
    pub clear_sessions: bool,
    pub correlation_window_secs: i64,
    pub ignore_failed_bait_session: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://apiary.sqlite3?mode=rwc".to_owned(),
            clear_sessions: false,
            correlation_window_secs: 5,
            ignore_failed_bait_session: false,
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| ConfigError::TomlError(e.to_string()))
    }
}

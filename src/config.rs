//! Application-level configuration loading, including the match clock length.

use std::{
    env, fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::state::match_state::DEFAULT_CLOCK_SECONDS;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "ROSCO_BACK_CONFIG_PATH";
const DEFAULT_EVENT_CAPACITY: usize = 64;
const DEFAULT_COMMAND_CAPACITY: usize = 64;

/// Failure to obtain a configuration from disk.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read config: {0}")]
    Read(#[from] io::Error),
    /// The file is not a valid configuration document.
    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    match_clock_seconds: u32,
    event_capacity: usize,
    command_capacity: usize,
}

impl AppConfig {
    /// Load the configuration file, falling back to built-in defaults when it is
    /// missing or unreadable.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match Self::read(&path) {
            Ok(app_config) => {
                info!(
                    path = %path.display(),
                    match_clock_seconds = app_config.match_clock_seconds,
                    event_capacity = app_config.event_capacity,
                    "loaded configuration"
                );
                app_config
            }
            Err(ConfigError::Read(err)) if err.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "no config file; using defaults");
                Self::default()
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring config file; using defaults");
                Self::default()
            }
        }
    }

    /// Read and parse the configuration stored at `path`.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(Self::from_json(&contents)?)
    }

    /// Parse a JSON document; omitted keys keep their defaults.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Override the clock length, mostly useful for tests.
    pub fn with_match_clock_seconds(mut self, seconds: u32) -> Self {
        self.match_clock_seconds = seconds.max(1);
        self
    }

    /// Seconds on each team's clock when a match is created.
    pub fn match_clock_seconds(&self) -> u32 {
        self.match_clock_seconds
    }

    /// Buffer size of the broadcast channel feeding observers.
    pub fn event_capacity(&self) -> usize {
        self.event_capacity
    }

    /// Buffer size of the match engine command queue.
    pub fn command_capacity(&self) -> usize {
        self.command_capacity
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    match_clock_seconds: u32,
    event_capacity: usize,
    command_capacity: usize,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            match_clock_seconds: DEFAULT_CLOCK_SECONDS,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            command_capacity: DEFAULT_COMMAND_CAPACITY,
        }
    }
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        // Zero would stall the clock or panic the channel constructors.
        Self {
            match_clock_seconds: value.match_clock_seconds.max(1),
            event_capacity: value.event_capacity.max(1),
            command_capacity: value.command_capacity.max(1),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_five_minute_clock() {
        let config = AppConfig::default();
        assert_eq!(config.match_clock_seconds(), 300);
        assert_eq!(config.event_capacity(), DEFAULT_EVENT_CAPACITY);
        assert_eq!(config.command_capacity(), DEFAULT_COMMAND_CAPACITY);
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let config = AppConfig::from_json(r#"{ "match_clock_seconds": 420 }"#).unwrap();
        assert_eq!(config.match_clock_seconds(), 420);
        assert_eq!(config.event_capacity(), DEFAULT_EVENT_CAPACITY);
    }

    #[test]
    fn zero_values_are_clamped() {
        let config =
            AppConfig::from_json(r#"{ "match_clock_seconds": 0, "event_capacity": 0 }"#).unwrap();
        assert_eq!(config.match_clock_seconds(), 1);
        assert_eq!(config.event_capacity(), 1);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = AppConfig::read(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read(io) if io.kind() == ErrorKind::NotFound));
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(AppConfig::from_json(r#"{ "match_clock_seconds": "soon" }"#).is_err());
    }
}

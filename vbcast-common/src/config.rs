//! Bootstrap configuration loading
//!
//! Configuration is a small TOML file. Resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable `VBCAST_CONFIG`
//! 3. Platform config directory (`~/.config/vbcast/config.toml` on Linux)
//! 4. Built-in defaults (fallback)
//!
//! A missing file never aborts startup: a warning is logged and the built-in
//! defaults are used. A file that exists but cannot be parsed is an error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the configuration file
pub const CONFIG_ENV_VAR: &str = "VBCAST_CONFIG";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Player tuning
    #[serde(default)]
    pub player: PlayerSettings,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Player tuning values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSettings {
    /// Position ticker period while playing
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// When stopping closer than this to the end, the stored position is
    /// dropped instead of kept as a paused position
    #[serde(default = "default_end_of_track_threshold_ms")]
    pub end_of_track_threshold_ms: u64,

    /// Notification buffer size of the event bus
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            end_of_track_threshold_ms: default_end_of_track_threshold_ms(),
            event_bus_capacity: default_event_bus_capacity(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_tick_interval_ms() -> u64 {
    50
}

fn default_end_of_track_threshold_ms() -> u64 {
    50
}

fn default_event_bus_capacity() -> usize {
    256
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse and validate configuration text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an existing file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Reject values the player cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.player.tick_interval_ms == 0 {
            return Err(Error::Config(
                "player.tick_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.player.event_bus_capacity == 0 {
            return Err(Error::Config(
                "player.event_bus_capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Determine which configuration file applies, without touching the disk
///
/// Returns None when neither an explicit path nor a platform config
/// directory is available.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    default_config_path()
}

/// Platform default configuration file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("vbcast").join("config.toml"))
}

/// Resolve and load the configuration, falling back to defaults
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = resolve_config_path(cli_arg) else {
        warn!("No configuration directory available, using built-in defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        warn!(
            "Configuration file {} not found, using built-in defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let config = TomlConfig::load(&path)?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

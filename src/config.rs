//! Configuration management
//!
//! Provides persistent settings storage with schema versioning and
//! migrations. Configuration is stored as JSON (by default in
//! `~/.hark/config.json`); a missing file yields the built-in defaults, and
//! older schema versions are migrated sequentially on load.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio::VadConfig;
use crate::handsfree::HandsfreeConfig;

/// Current config schema version.
const CURRENT_VERSION: u32 = 1;

/// Errors from loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[source] std::io::Error),

    #[error("failed to write config file: {0}")]
    Write(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown config version: {0}")]
    UnknownVersion(u32),
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Schema version for migrations.
    pub version: u32,
    /// Microphone stream format.
    pub audio: AudioConfig,
    /// Voice activity classification settings.
    pub vad: VadConfig,
    /// Hands-free controller settings.
    pub handsfree: HandsfreeConfig,
    /// Physical control settings.
    pub controls: ControlsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            audio: AudioConfig::default(),
            vad: VadConfig::default(),
            handsfree: HandsfreeConfig::default(),
            controls: ControlsConfig::default(),
        }
    }
}

/// Microphone stream format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Input sample rate in Hz.
    pub sample_rate: u32,
    /// Input channel count (1 or 2).
    pub channels: u16,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            channels: 1,
        }
    }
}

/// Physical control settings.
///
/// The long-press threshold is consumed by the host's button driver; it is
/// carried here so the whole control surface is configured in one place.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Hold duration that counts as a long press, in milliseconds.
    pub long_press_ms: u64,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self { long_press_ms: 5_000 }
    }
}

impl Config {
    /// Loads configuration from `path`, migrating older schema versions.
    ///
    /// A missing file yields the defaults rather than an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(ConfigError::Read)?;
        let config: Config = serde_json::from_str(&contents)?;
        migrate(config)
    }

    /// Saves configuration as pretty-printed JSON, creating parent
    /// directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(ConfigError::Write)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents).map_err(ConfigError::Write)?;
        tracing::info!(path = %path.display(), "config saved");
        Ok(())
    }
}

/// Default config file location (`~/.hark/config.json`).
pub fn default_config_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| {
        tracing::error!("could not determine home directory, using /tmp");
        PathBuf::from("/tmp")
    });
    home.join(".hark").join("config.json")
}

/// Migrates configuration from older schema versions.
fn migrate(mut config: Config) -> Result<Config, ConfigError> {
    let original_version = config.version;

    while config.version < CURRENT_VERSION {
        config = apply_migration(config)?;
    }
    if config.version > CURRENT_VERSION {
        return Err(ConfigError::UnknownVersion(config.version));
    }

    if config.version != original_version {
        tracing::info!(
            "migrated config from version {} to {}",
            original_version,
            config.version
        );
    }

    Ok(config)
}

/// Applies a single migration step.
fn apply_migration(config: Config) -> Result<Config, ConfigError> {
    match config.version {
        // Version 0 -> 1: initial schema; fields absent in old files are
        // already filled by serde defaults.
        0 => {
            let mut migrated = config;
            migrated.version = 1;
            Ok(migrated)
        }
        v => Err(ConfigError::UnknownVersion(v)),
    }
}

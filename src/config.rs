//! # Configuration Management Module
//!
//! Persistent measurement settings stored in platform-appropriate locations.
//! Handles loading, saving, and providing defaults.
//!
//! ## Settings
//! - `stabilization_secs`: warm-up window after start during which frames
//!   are discarded while the signal settles
//! - `measurement_secs`: length of the measuring phase that follows
//!
//! Algorithm constants (buffer capacity, peak thresholds, smoothing
//! weights, the realtime sanity gate) are fixed in their modules and are
//! deliberately not configurable.
//!
//! ## Storage Location
//! - macOS: ~/Library/Application Support/heartguard/config.toml
//! - Linux: ~/.config/heartguard/config.toml
//! - Windows: %APPDATA%\heartguard\config.toml

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_STABILIZATION_SECS: f64 = 3.0;
const DEFAULT_MEASUREMENT_SECS: f64 = 30.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub stabilization_secs: f64,
    pub measurement_secs: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            stabilization_secs: DEFAULT_STABILIZATION_SECS,
            measurement_secs: DEFAULT_MEASUREMENT_SECS,
        }
    }
}

impl MonitorConfig {
    /// Get the path to the config file
    fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("heartguard").join("config.toml")
    }

    /// Load config from the default location, or create it with defaults if
    /// it doesn't exist
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::config_path())
    }

    /// Load config from an explicit path, creating it with defaults if
    /// missing
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(contents) => {
                let config = toml::from_str(&contents).map_err(ConfigError::ParseFailed)?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.save_to(path)?;
                Ok(config)
            }
            Err(e) => Err(ConfigError::ReadFailed(e)),
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Self::config_path())
    }

    /// Save config to an explicit path
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::WriteFailed)?;
        }

        let toml_string = toml::to_string_pretty(self).map_err(ConfigError::SerializeFailed)?;
        fs::write(path, toml_string).map_err(ConfigError::WriteFailed)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = MonitorConfig::default();
        assert_eq!(config.stabilization_secs, 3.0);
        assert_eq!(config.measurement_secs, 30.0);
    }

    #[test]
    fn test_config_serialization() {
        let config = MonitorConfig {
            stabilization_secs: 2.0,
            measurement_secs: 20.0,
        };

        let toml_str = toml::to_string(&config).expect("Failed to serialize");
        assert!(toml_str.contains("stabilization_secs = 2.0"));
        assert!(toml_str.contains("measurement_secs = 20.0"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            stabilization_secs = 1.5
            measurement_secs = 45.0
        "#;

        let config: MonitorConfig = toml::from_str(toml_str).expect("Failed to deserialize");
        assert_eq!(config.stabilization_secs, 1.5);
        assert_eq!(config.measurement_secs, 45.0);
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("heartguard").join("config.toml");

        let config = MonitorConfig::load_from(&path).expect("Failed to load config");
        assert_eq!(config.stabilization_secs, 3.0);
        assert!(path.exists());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = MonitorConfig {
            stabilization_secs: 5.0,
            measurement_secs: 60.0,
        };
        config.save_to(&path).expect("Failed to save config");

        let reloaded = MonitorConfig::load_from(&path).expect("Failed to reload config");
        assert_eq!(reloaded.stabilization_secs, 5.0);
        assert_eq!(reloaded.measurement_secs, 60.0);
    }
}

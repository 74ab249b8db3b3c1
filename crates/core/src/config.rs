//! Core configuration
//!
//! TOML-backed settings for the interposition layer. Feature descriptor
//! files are a separate concern and not handled here.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration system errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read or write the config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML content
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// Failed to serialize config to TOML
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Camera channel tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Ring capacity; how many frames of camera data are retained
    pub capacity: usize,

    /// Frames at session start that never block on missing data (some
    /// engines skip emitting the first few frames entirely)
    pub startup_no_wait_frames: u64,

    /// Bounded wait for late camera data; loosely defines the minimum
    /// supported frame rate as 1/timeout
    pub wait_timeout_ms: u64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            capacity: 8,
            startup_no_wait_frames: 5,
            wait_timeout_ms: 100,
        }
    }
}

/// Framework-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Config version for future migration support
    pub version: u32,

    /// Enable debug logging
    pub debug: bool,

    pub camera: CameraConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            version: 1,
            debug: false,
            camera: CameraConfig::default(),
        }
    }
}

impl CoreConfig {
    /// Load config from `path`, creating a default file if missing.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::debug!("loaded core config from {:?}", path);
            Ok(config)
        } else {
            let default = Self::default();
            default.save_to(path)?;
            tracing::info!("created default core config at {:?}", path);
            Ok(default)
        }
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        tracing::debug!("saved core config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CoreConfig::default();
        assert_eq!(config.version, 1);
        assert!(!config.debug);
        assert_eq!(config.camera.capacity, 8);
        assert_eq!(config.camera.wait_timeout_ms, 100);
    }

    #[test]
    fn serialize_roundtrip() {
        let mut config = CoreConfig::default();
        config.debug = true;
        config.camera.wait_timeout_ms = 250;

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: CoreConfig = toml::from_str(&toml_str).unwrap();
        assert!(parsed.debug);
        assert_eq!(parsed.camera.wait_timeout_ms, 250);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: CoreConfig = toml::from_str("debug = true").unwrap();
        assert!(parsed.debug);
        assert_eq!(parsed.camera.startup_no_wait_frames, 5);
    }
}

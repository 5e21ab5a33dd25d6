//! Parameter definitions with units and documented semantics.
//!
//! All tuning constants live here with:
//! - Units (Hz, seconds, pixels, etc.)
//! - Documented ranges and meanings
//! - Validation before the frame loop starts

mod audio;
mod display;
mod effects;
mod reactivity;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// Re-export all types
pub use audio::{AnalyzerConfig, BandRange};
pub use display::{DisplayConfig, RecordingConfig};
pub use effects::EffectsConfig;
pub use reactivity::DynamicsConfig;

/// Complete runtime configuration, read-only once the loop starts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub analyzer: AnalyzerConfig,
    pub dynamics: DynamicsConfig,
    pub effects: EffectsConfig,
    pub display: DisplayConfig,
}

impl FrameConfig {
    /// Load a TOML file; fields it omits keep their defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn band_count(&self) -> usize {
        self.analyzer.bands.len()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let bands = self.band_count();
        self.analyzer.validate()?;
        self.dynamics.validate()?;
        self.effects.validate(bands)?;
        self.display.validate(bands)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(FrameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = FrameConfig::from_toml(
            r#"
            [dynamics]
            fall_speed = 0.5

            [effects]
            scan_line = true
            invert_band_count = [2, 3]
            "#,
        )
        .unwrap();

        assert_eq!(config.dynamics.fall_speed, 0.5);
        assert_eq!(config.dynamics.transient_threshold, 3.0);
        assert!(config.effects.scan_line);
        assert_eq!(config.effects.invert_band_count, (2, 3));
        assert_eq!(config.band_count(), 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_roundtrip_of_defaults() {
        let text = FrameConfig::default().to_toml().unwrap();
        let parsed = FrameConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.analyzer.bands, AnalyzerConfig::default().bands);
        assert_eq!(parsed.display.fps, 60);
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = FrameConfig::load(Path::new("/nonexistent/dotspectrum.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viz.toml");
        fs::write(&path, "[display]\nbase_brightness = 0.4\n").unwrap();

        let config = FrameConfig::load(&path).unwrap();
        assert_eq!(config.display.base_brightness, 0.4);
    }
}

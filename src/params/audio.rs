//! Audio analysis configuration and frequency band layout.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One analysed frequency band, half-open range [low, high) in Hz
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandRange {
    pub low_hz: f64,
    pub high_hz: f64,
}

impl BandRange {
    pub const fn new(low_hz: f64, high_hz: f64) -> Self {
        Self { low_hz, high_hz }
    }

    /// True if `hz` falls inside [low, high)
    pub fn contains(&self, hz: f64) -> bool {
        hz >= self.low_hz && hz < self.high_hz
    }
}

/// Spectral analysis configuration with frequency band mappings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Samples per analysed block (one block per frame)
    /// Default: 1024
    pub block_size: usize,

    /// Fallback sample rate (Hz) when the source doesn't report one
    /// Default: 44100
    pub sample_rate_hz: u32,

    /// RMS below this (32-bit sample units) is treated as silence
    /// Default: 10000 (≈ -107 dBFS)
    pub silence_threshold: f64,

    /// Frequency bands, left to right on the display
    pub bands: Vec<BandRange>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            block_size: 1024,
            sample_rate_hz: 44100,
            silence_threshold: 10_000.0,
            bands: vec![
                BandRange::new(20.0, 80.0),      // Sub-bass
                BandRange::new(80.0, 250.0),     // Bass
                BandRange::new(250.0, 500.0),    // Low mids
                BandRange::new(500.0, 2000.0),   // Mids
                BandRange::new(2000.0, 6000.0),  // Presence
                BandRange::new(6000.0, 20000.0), // Air
            ],
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_size == 0 {
            return Err(ConfigError::Invalid("block size must be > 0".to_string()));
        }
        if self.sample_rate_hz == 0 {
            return Err(ConfigError::Invalid("sample rate must be > 0".to_string()));
        }
        if self.bands.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one frequency band is required".to_string(),
            ));
        }
        for (i, band) in self.bands.iter().enumerate() {
            if !(band.low_hz >= 0.0 && band.low_hz < band.high_hz) {
                return Err(ConfigError::Invalid(format!(
                    "band {} has an empty range [{}, {})",
                    i, band.low_hz, band.high_hz
                )));
            }
        }
        if !(self.silence_threshold >= 0.0) {
            return Err(ConfigError::Invalid(
                "silence threshold must be >= 0".to_string(),
            ));
        }
        Ok(())
    }
}

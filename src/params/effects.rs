//! Decorative effect toggles and tuning.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Background grain, scan line, strobe and sparkle parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    /// Darken random pixels every frame
    pub snow: bool,

    /// Number of pixels darkened per frame
    /// Default: 20
    pub snow_density: usize,

    /// Brighten random pixels every frame
    pub sparkle_grain: bool,

    /// Number of pixels brightened per frame
    /// Default: 12
    pub sparkle_density: usize,

    /// Sweep a dark row up and down the display
    pub scan_line: bool,

    /// Scan line period divisor (higher = slower sweep)
    /// Default: 30.0
    pub scan_line_speed: f64,

    /// Periodically invert a random subset of bands
    pub invert_strobe: bool,

    /// Per-frame probability of starting a strobe episode
    /// Default: 0.01 (≈ once every 1.7 s at 60 FPS)
    pub invert_chance: f64,

    /// Length of one strobe episode (seconds)
    /// Default: 2.4
    pub invert_duration_s: f64,

    /// Inclusive range of bands inverted per episode
    /// Default: (1, 2)
    pub invert_band_count: (usize, usize),

    /// Flicker frequency while an episode runs (Hz)
    /// Default: 3.0
    pub invert_strobe_hz: f64,

    /// Leave highlight pixels at the top of bars that spike
    pub transient_sparkles: bool,

    /// Lifetime of a transient sparkle (seconds)
    /// Default: 0.5
    pub sparkle_duration_s: f64,

    /// Per-frame probability that a live sparkle is drawn
    /// Default: 1.0 (always lit)
    pub sparkle_flicker_rate: f64,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            snow: true,
            snow_density: 20,
            sparkle_grain: true,
            sparkle_density: 12,
            scan_line: false,
            scan_line_speed: 30.0,
            invert_strobe: true,
            invert_chance: 0.01,
            invert_duration_s: 2.4,
            invert_band_count: (1, 2),
            invert_strobe_hz: 3.0,
            transient_sparkles: true,
            sparkle_duration_s: 0.5,
            sparkle_flicker_rate: 1.0,
        }
    }
}

impl EffectsConfig {
    /// Validate against the number of configured bands
    pub fn validate(&self, band_count: usize) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.invert_chance) {
            return Err(ConfigError::Invalid(format!(
                "invert chance must be in [0, 1], got {}",
                self.invert_chance
            )));
        }
        if !(0.0..=1.0).contains(&self.sparkle_flicker_rate) {
            return Err(ConfigError::Invalid(format!(
                "sparkle flicker rate must be in [0, 1], got {}",
                self.sparkle_flicker_rate
            )));
        }
        let (min, max) = self.invert_band_count;
        if min == 0 || min > max || max > band_count {
            return Err(ConfigError::Invalid(format!(
                "invert band count ({}, {}) must satisfy 1 <= min <= max <= {}",
                min, max, band_count
            )));
        }
        if !(self.invert_strobe_hz > 0.0) {
            return Err(ConfigError::Invalid(
                "strobe frequency must be > 0".to_string(),
            ));
        }
        if !(self.invert_duration_s >= 0.0) || !(self.sparkle_duration_s >= 0.0) {
            return Err(ConfigError::Invalid(
                "effect durations must be >= 0".to_string(),
            ));
        }
        if !(self.scan_line_speed > 0.0) {
            return Err(ConfigError::Invalid(
                "scan line speed must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

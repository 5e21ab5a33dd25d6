//! Per-band energy tracking parameters.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How band magnitudes turn into bar heights
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicsConfig {
    /// EMA weight of the newest magnitude (0..=1, higher = faster adaptation)
    /// Default: 0.9
    pub energy_smoothing: f64,

    /// Linear bar release per frame (pixels)
    /// Default: 0.2
    pub fall_speed: f64,

    /// A magnitude above `average * threshold` counts as a transient
    /// Default: 3.0
    pub transient_threshold: f64,

    /// Extra height added on a transient frame (pixels)
    /// Default: 1.4
    pub transient_bonus: f64,

    /// Height of a bar whose magnitude equals its running average (pixels)
    /// Default: 3.5
    pub normalization_scale: f64,
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            energy_smoothing: 0.9,
            fall_speed: 0.2,
            transient_threshold: 3.0,
            transient_bonus: 1.4,
            normalization_scale: 3.5,
        }
    }
}

impl DynamicsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.energy_smoothing > 0.0 && self.energy_smoothing <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "energy smoothing must be in (0, 1], got {}",
                self.energy_smoothing
            )));
        }
        if !(self.fall_speed >= 0.0) {
            return Err(ConfigError::Invalid("fall speed must be >= 0".to_string()));
        }
        if !(self.transient_threshold > 0.0) {
            return Err(ConfigError::Invalid(
                "transient threshold must be > 0".to_string(),
            ));
        }
        if !(self.transient_bonus >= 0.0) {
            return Err(ConfigError::Invalid(
                "transient bonus must be >= 0".to_string(),
            ));
        }
        if !(self.normalization_scale > 0.0) {
            return Err(ConfigError::Invalid(
                "normalization scale must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

//! Display geometry, pacing and recording configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::display::{HEIGHT, WIDTH};
use crate::error::ConfigError;

/// Dot-matrix geometry and frame pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Display width (pixels)
    pub width: usize,

    /// Display height (pixels, also the maximum bar height)
    pub height: usize,

    /// Horizontal distance between the first columns of adjacent bands
    /// Default: 8 (one 5x7 matrix plus its 3 column gap)
    pub band_pitch: usize,

    /// Number of lit columns per band
    /// Default: 5
    pub bar_width: usize,

    /// Global brightness (0..=1)
    /// Default: 0.9
    pub base_brightness: f32,

    /// Target frame rate (FPS)
    /// Default: 60
    pub fps: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            band_pitch: 8,
            bar_width: 5,
            base_brightness: 0.9,
            fps: 60,
        }
    }
}

impl DisplayConfig {
    /// First column of band `index`
    pub fn band_x(&self, index: usize) -> usize {
        index * self.band_pitch
    }

    /// Time budget of one frame (seconds)
    pub fn frame_budget_s(&self) -> f64 {
        1.0 / self.fps as f64
    }

    /// Validate against the number of configured bands
    pub fn validate(&self, band_count: usize) -> Result<(), ConfigError> {
        if self.width == 0 {
            return Err(ConfigError::Invalid("display width must be > 0".to_string()));
        }
        if self.height == 0 || self.height > 32 {
            return Err(ConfigError::Invalid(format!(
                "display height must be in 1..=32, got {}",
                self.height
            )));
        }
        if self.bar_width == 0 || self.bar_width > self.band_pitch {
            return Err(ConfigError::Invalid(format!(
                "bar width {} must be in 1..={}",
                self.bar_width, self.band_pitch
            )));
        }
        if band_count > 0 && self.band_x(band_count - 1) + self.bar_width > self.width {
            return Err(ConfigError::Invalid(format!(
                "{} bands at pitch {} do not fit a {} column display",
                band_count, self.band_pitch, self.width
            )));
        }
        if !(0.0..=1.0).contains(&self.base_brightness) {
            return Err(ConfigError::Invalid(format!(
                "brightness must be in [0, 1], got {}",
                self.base_brightness
            )));
        }
        if self.fps == 0 {
            return Err(ConfigError::Invalid("fps must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Recording mode configuration
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Duration to record (seconds)
    pub duration_secs: f32,

    /// Output directory for frames
    pub output_dir: PathBuf,

    /// Frame rate (FPS)
    pub fps: u32,

    /// Output pixels per display dot
    pub pixel_scale: u32,
}

impl RecordingConfig {
    pub fn new(duration_secs: f32, fps: u32) -> Self {
        Self {
            duration_secs,
            output_dir: PathBuf::from("recording"),
            fps,
            pixel_scale: 16,
        }
    }

    /// Total number of frames to capture
    pub fn total_frames(&self) -> usize {
        (self.duration_secs * self.fps as f32).ceil() as usize
    }

    /// Frame directory path
    pub fn frames_dir(&self) -> PathBuf {
        self.output_dir.join("frames")
    }
}

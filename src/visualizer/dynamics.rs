//! Per-band running energy, normalization and bar envelope.

use log::trace;

use super::sparkle::{SparkleTracker, TransientSparkle};
use crate::params::{BandRange, FrameConfig};

/// One frequency band and its tracked state
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub index: usize,
    pub range: BandRange,
    /// Running average magnitude, never below 1.0
    pub average: f64,
    /// Current bar height in pixels, within [0, display height]
    pub height: f64,
    /// Set only by the strobe controller
    pub inverted: bool,
}

impl Band {
    pub fn new(index: usize, range: BandRange) -> Self {
        Self {
            index,
            range,
            average: 1.0,
            height: 0.0,
            inverted: false,
        }
    }

    /// Integer bar height, clamped to `max_height`
    pub fn bar_height(&self, max_height: usize) -> usize {
        self.height.min(max_height as f64).floor() as usize
    }
}

/// Result of one band update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandFrame {
    /// Height drawn this frame
    pub bar_height: usize,
    /// Normalized height before the envelope, including any transient bonus
    pub normalized_height: f64,
    pub transient: bool,
}

/// Turns raw magnitudes into bar heights and transient sparkles
#[derive(Debug, Clone)]
pub struct BandDynamics {
    smoothing: f64,
    fall_speed: f64,
    transient_threshold: f64,
    transient_bonus: f64,
    scale: f64,
    transient_sparkles: bool,
    sparkle_duration_s: f64,
    display_height: usize,
    band_pitch: usize,
    bar_width: usize,
}

impl BandDynamics {
    pub fn new(config: &FrameConfig) -> Self {
        Self {
            smoothing: config.dynamics.energy_smoothing,
            fall_speed: config.dynamics.fall_speed,
            transient_threshold: config.dynamics.transient_threshold,
            transient_bonus: config.dynamics.transient_bonus,
            scale: config.dynamics.normalization_scale,
            transient_sparkles: config.effects.transient_sparkles,
            sparkle_duration_s: config.effects.sparkle_duration_s,
            display_height: config.display.height,
            band_pitch: config.display.band_pitch,
            bar_width: config.display.bar_width,
        }
    }

    /// Feed one frame's magnitude into `band`
    ///
    /// A transient adds the bonus for this frame only and leaves one sparkle
    /// per bar column at the top of the (clamped) normalized height.
    pub fn update(
        &self,
        band: &mut Band,
        magnitude: f64,
        now: f64,
        sparkles: &mut SparkleTracker,
    ) -> BandFrame {
        let magnitude = magnitude.max(0.0);
        let max_height = self.display_height as f64;

        band.average = (magnitude * self.smoothing + band.average * (1.0 - self.smoothing)).max(1.0);
        let mut normalized = (magnitude / band.average) * self.scale;

        let transient =
            self.transient_sparkles && magnitude > band.average * self.transient_threshold;
        if transient {
            normalized += self.transient_bonus;
            let row = self.display_height - normalized.min(max_height).floor() as usize;
            if row < self.display_height {
                trace!("[BANDS] Transient in band {} at row {}", band.index, row);
                let x_start = band.index * self.band_pitch;
                for col in 0..self.bar_width {
                    sparkles.emit(TransientSparkle {
                        x: x_start + col,
                        y: row,
                        expires_at: now + self.sparkle_duration_s,
                    });
                }
            }
        }

        // Fast attack, linear release
        band.height = if normalized > band.height {
            normalized
        } else {
            band.height - self.fall_speed
        }
        .clamp(0.0, max_height);

        BandFrame {
            bar_height: band.bar_height(self.display_height),
            normalized_height: normalized,
            transient,
        }
    }

    /// Update every band in order; `magnitudes` pairs with `bands` by index
    pub fn update_all(
        &self,
        bands: &mut [Band],
        magnitudes: &[f64],
        now: f64,
        sparkles: &mut SparkleTracker,
    ) -> Vec<BandFrame> {
        debug_assert_eq!(bands.len(), magnitudes.len());
        bands
            .iter_mut()
            .zip(magnitudes)
            .map(|(band, &magnitude)| self.update(band, magnitude, now, sparkles))
            .collect()
    }
}

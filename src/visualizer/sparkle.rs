//! Short-lived highlight pixels left behind by transient spikes.

use rand::Rng;

/// One highlighted pixel with a fixed expiry time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransientSparkle {
    pub x: usize,
    pub y: usize,
    /// Clock time (seconds) at which the sparkle disappears
    pub expires_at: f64,
}

impl TransientSparkle {
    pub fn is_live(&self, now: f64) -> bool {
        now < self.expires_at
    }
}

/// Owns every live sparkle; entries are never extended once created
#[derive(Debug, Clone, Default)]
pub struct SparkleTracker {
    sparkles: Vec<TransientSparkle>,
}

impl SparkleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, sparkle: TransientSparkle) {
        self.sparkles.push(sparkle);
    }

    pub fn len(&self) -> usize {
        self.sparkles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sparkles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransientSparkle> {
        self.sparkles.iter()
    }

    /// Drop every sparkle whose expiry is at or before `now`
    pub fn prune(&mut self, now: f64) {
        self.sparkles.retain(|s| s.is_live(now));
    }

    /// Prune, then pick the pixels lit this frame
    ///
    /// Each live sparkle is lit with probability `flicker_rate`; a rate of
    /// 1.0 or more lights all of them without consuming randomness.
    pub fn lit_pixels<R: Rng + ?Sized>(
        &mut self,
        now: f64,
        flicker_rate: f64,
        rng: &mut R,
    ) -> Vec<(usize, usize)> {
        self.prune(now);
        self.sparkles
            .iter()
            .filter(|_| flicker_rate >= 1.0 || rng.gen::<f64>() < flicker_rate)
            .map(|s| (s.x, s.y))
            .collect()
    }
}

//! Audio-reactive visualization core.
//!
//! Per frame: magnitudes -> [`BandDynamics`] (may emit sparkles) ->
//! [`StrobeController`] -> [`Compositor`]. All mutable state lives in a
//! [`FrameContext`] owned by the frame loop.

mod compositor;
mod dynamics;
mod sparkle;
mod strobe;

pub use compositor::{scan_line_row, BarPatterns, Compositor};
pub use dynamics::{Band, BandDynamics, BandFrame};
pub use sparkle::{SparkleTracker, TransientSparkle};
pub use strobe::{StrobeController, StrobeState};

use crate::params::FrameConfig;

/// Everything that changes from frame to frame, plus the config it runs under
#[derive(Debug, Clone)]
pub struct FrameContext {
    pub config: FrameConfig,
    pub bands: Vec<Band>,
    pub strobe: StrobeController,
    pub sparkles: SparkleTracker,
}

impl FrameContext {
    pub fn new(config: FrameConfig) -> Self {
        let bands = config
            .analyzer
            .bands
            .iter()
            .enumerate()
            .map(|(i, range)| Band::new(i, *range))
            .collect();
        let strobe = StrobeController::new(&config.effects);

        Self {
            config,
            bands,
            strobe,
            sparkles: SparkleTracker::new(),
        }
    }

    /// Current integer bar heights
    pub fn bar_heights(&self) -> Vec<usize> {
        let max = self.config.display.height;
        self.bands.iter().map(|b| b.bar_height(max)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_starts_at_rest() {
        let context = FrameContext::new(FrameConfig::default());
        assert_eq!(context.bands.len(), 6);
        assert!(context.bands.iter().all(|b| b.average == 1.0 && !b.inverted));
        assert_eq!(context.bar_heights(), vec![0; 6]);
        assert!(!context.strobe.state().is_active());
        assert!(context.sparkles.is_empty());
    }
}

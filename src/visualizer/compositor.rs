//! Layers bars, grain, scan line and sparkles into one display frame.

use rand::Rng;

use super::sparkle::SparkleTracker;
use super::Band;
use crate::display::Display;
use crate::error::DisplayError;
use crate::params::FrameConfig;

/// Low `bits` bits set
fn low_bits(bits: usize) -> u32 {
    ((1u64 << bits) - 1) as u32
}

/// Height-indexed column masks, built once for a display height
///
/// `normal[h]` lights the bottom `h` rows; `inverted[h]` is its complement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarPatterns {
    normal: Vec<u32>,
    inverted: Vec<u32>,
}

impl BarPatterns {
    pub fn new(height: usize) -> Self {
        let full = low_bits(height);
        let normal: Vec<u32> = (0..=height)
            .map(|h| full & !low_bits(height - h))
            .collect();
        let inverted = normal.iter().map(|&mask| full & !mask).collect();
        Self { normal, inverted }
    }

    /// Column mask for a bar of `height`, clamped to the table
    pub fn column(&self, height: usize, inverted: bool) -> u32 {
        let table = if inverted { &self.inverted } else { &self.normal };
        table[height.min(table.len() - 1)]
    }
}

/// Row darkened by the scan line at time `now` (triangle wave, 0..height)
pub fn scan_line_row(now: f64, height: usize, speed: f64) -> usize {
    let h = height as f64;
    let phase = (now * (h / speed)).rem_euclid(h * 2.0);
    ((phase - h).abs().floor() as usize).min(height.saturating_sub(1))
}

/// Draws one complete frame per call, back to front
#[derive(Debug, Clone)]
pub struct Compositor {
    patterns: BarPatterns,
    band_pitch: usize,
    bar_width: usize,
    snow_density: Option<usize>,
    sparkle_density: Option<usize>,
    scan_line_speed: Option<f64>,
    sparkle_flicker_rate: f64,
}

impl Compositor {
    pub fn new(config: &FrameConfig) -> Self {
        let effects = &config.effects;
        Self {
            patterns: BarPatterns::new(config.display.height),
            band_pitch: config.display.band_pitch,
            bar_width: config.display.bar_width,
            snow_density: effects.snow.then_some(effects.snow_density),
            sparkle_density: effects.sparkle_grain.then_some(effects.sparkle_density),
            scan_line_speed: effects.scan_line.then_some(effects.scan_line_speed),
            sparkle_flicker_rate: effects.sparkle_flicker_rate,
        }
    }

    /// Render and flush one frame
    ///
    /// `heights` pairs with `bands` by index. Expired sparkles are pruned here.
    pub fn compose<D, R>(
        &self,
        display: &mut D,
        bands: &[Band],
        heights: &[usize],
        sparkles: &mut SparkleTracker,
        now: f64,
        rng: &mut R,
    ) -> Result<(), DisplayError>
    where
        D: Display + ?Sized,
        R: Rng + ?Sized,
    {
        let width = display.width();
        let height = display.height();

        // 1. No partial updates
        display.clear();

        // 2. Bars
        for (band, &bar_height) in bands.iter().zip(heights) {
            let mask = self.patterns.column(bar_height, band.inverted);
            let x_start = band.index * self.band_pitch;
            for x in x_start..x_start + self.bar_width {
                display.set_column(x, mask);
            }
        }

        // 3. Grain
        if width > 0 && height > 0 {
            if let Some(density) = self.snow_density {
                for _ in 0..density {
                    display.set_pixel(rng.gen_range(0..width), rng.gen_range(0..height), false);
                }
            }
            if let Some(density) = self.sparkle_density {
                for _ in 0..density {
                    display.set_pixel(rng.gen_range(0..width), rng.gen_range(0..height), true);
                }
            }
        }

        // 4. Scan line
        if let Some(speed) = self.scan_line_speed {
            let y = scan_line_row(now, height, speed);
            for x in 0..width {
                display.set_pixel(x, y, false);
            }
        }

        // 5. Transient sparkles on top
        for (x, y) in sparkles.lit_pixels(now, self.sparkle_flicker_rate, rng) {
            display.set_pixel(x, y, true);
        }

        // 6. Flush
        display.show()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{HeadlessDisplay, HEIGHT, WIDTH};
    use crate::visualizer::TransientSparkle;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn quiet_config() -> FrameConfig {
        let mut config = FrameConfig::default();
        config.effects.snow = false;
        config.effects.sparkle_grain = false;
        config.effects.scan_line = false;
        config
    }

    fn bands(config: &FrameConfig) -> Vec<Band> {
        config
            .analyzer
            .bands
            .iter()
            .enumerate()
            .map(|(i, r)| Band::new(i, *r))
            .collect()
    }

    #[test]
    fn test_patterns_match_seven_row_tables() {
        let patterns = BarPatterns::new(7);
        let normal: Vec<u32> = (0..=7).map(|h| patterns.column(h, false)).collect();
        let inverted: Vec<u32> = (0..=7).map(|h| patterns.column(h, true)).collect();

        assert_eq!(
            normal,
            vec![
                0b0000000, 0b1000000, 0b1100000, 0b1110000, 0b1111000, 0b1111100, 0b1111110,
                0b1111111
            ]
        );
        assert_eq!(
            inverted,
            vec![
                0b1111111, 0b0111111, 0b0011111, 0b0001111, 0b0000111, 0b0000011, 0b0000001,
                0b0000000
            ]
        );
        // Out-of-range heights clamp to the full bar
        assert_eq!(patterns.column(12, false), 0b1111111);
    }

    #[test]
    fn test_patterns_full_width_mask() {
        let patterns = BarPatterns::new(32);
        assert_eq!(patterns.column(32, false), u32::MAX);
        assert_eq!(patterns.column(1, false), 1 << 31);
        assert_eq!(patterns.column(0, true), u32::MAX);
    }

    #[test]
    fn test_scan_line_triangle_wave() {
        // speed 7 on a 7 row display: one row per second
        assert_eq!(scan_line_row(0.0, 7, 7.0), 6);
        assert_eq!(scan_line_row(1.5, 7, 7.0), 5);
        assert_eq!(scan_line_row(7.0, 7, 7.0), 0);
        assert_eq!(scan_line_row(10.5, 7, 7.0), 3);
        for step in 0..1000 {
            assert!(scan_line_row(step as f64 * 0.37, 7, 30.0) < 7);
        }
    }

    #[test]
    fn test_bars_drawn_across_band_span() {
        let config = quiet_config();
        let compositor = Compositor::new(&config);
        let mut display = HeadlessDisplay::new(WIDTH, HEIGHT);
        let bands = bands(&config);
        let mut sparkles = SparkleTracker::new();

        let heights = [0, 1, 2, 3, 7, 0];
        compositor
            .compose(&mut display, &bands, &heights, &mut sparkles, 0.0, &mut StepRng::new(0, 1))
            .unwrap();

        let frame = display.last_frame();
        for x in 8..13 {
            assert_eq!(frame.column(x), 0b1000000);
        }
        for x in 32..37 {
            assert_eq!(frame.column(x), 0b1111111);
        }
        // Gap columns stay dark
        for x in 13..16 {
            assert_eq!(frame.column(x), 0);
        }
        assert_eq!(frame.lit_count(), (1 + 2 + 3 + 7) * 5);
    }

    #[test]
    fn test_inverted_band_uses_inverted_pattern() {
        let config = quiet_config();
        let compositor = Compositor::new(&config);
        let mut display = HeadlessDisplay::new(WIDTH, HEIGHT);
        let mut bands = bands(&config);
        bands[0].inverted = true;
        let mut sparkles = SparkleTracker::new();

        compositor
            .compose(&mut display, &bands, &[2, 2, 0, 0, 0, 0], &mut sparkles, 0.0, &mut StepRng::new(0, 1))
            .unwrap();

        assert_eq!(display.last_frame().column(0), 0b0011111);
        assert_eq!(display.last_frame().column(8), 0b1100000);
    }

    #[test]
    fn test_frame_cleared_between_calls() {
        let config = quiet_config();
        let compositor = Compositor::new(&config);
        let mut display = HeadlessDisplay::new(WIDTH, HEIGHT);
        let bands = bands(&config);
        let mut sparkles = SparkleTracker::new();
        let mut rng = StepRng::new(0, 1);

        compositor
            .compose(&mut display, &bands, &[7; 6], &mut sparkles, 0.0, &mut rng)
            .unwrap();
        compositor
            .compose(&mut display, &bands, &[0; 6], &mut sparkles, 0.0, &mut rng)
            .unwrap();

        assert_eq!(display.last_frame().lit_count(), 0);
        assert_eq!(display.frames_shown(), 2);
    }

    #[test]
    fn test_scan_line_darkens_row_and_sparkles_draw_over_it() {
        let mut config = quiet_config();
        config.effects.scan_line = true;
        config.effects.scan_line_speed = 7.0;
        let compositor = Compositor::new(&config);
        let mut display = HeadlessDisplay::new(WIDTH, HEIGHT);
        let bands = bands(&config);
        let mut sparkles = SparkleTracker::new();
        sparkles.emit(TransientSparkle { x: 2, y: 6, expires_at: 1.0 });
        sparkles.emit(TransientSparkle { x: 3, y: 6, expires_at: 0.1 });

        // At t = 0.5 the scan line sits on the bottom row
        compositor
            .compose(&mut display, &bands, &[7; 6], &mut sparkles, 0.5, &mut StepRng::new(0, 1))
            .unwrap();

        let frame = display.last_frame();
        assert!(frame.get(2, 6));
        assert!(!frame.get(3, 6));
        assert!(!frame.get(10, 6));
        assert!(frame.get(10, 5));
        assert_eq!(sparkles.len(), 1);
    }

    #[test]
    fn test_grain_changes_pixels() {
        let mut config = quiet_config();
        config.effects.sparkle_grain = true;
        config.effects.sparkle_density = 12;
        let compositor = Compositor::new(&config);
        let mut display = HeadlessDisplay::new(WIDTH, HEIGHT);
        let bands = bands(&config);
        let mut sparkles = SparkleTracker::new();
        let mut rng = StdRng::seed_from_u64(5);

        compositor
            .compose(&mut display, &bands, &[0; 6], &mut sparkles, 0.0, &mut rng)
            .unwrap();

        // Draws may overlap, so at most `density` pixels light up
        let lit = display.last_frame().lit_count();
        assert!(lit >= 1 && lit <= 12);
    }

    #[test]
    fn test_snow_only_darkens() {
        let mut config = quiet_config();
        config.effects.snow = true;
        config.effects.snow_density = 200;
        let compositor = Compositor::new(&config);
        let mut display = HeadlessDisplay::new(WIDTH, HEIGHT);
        let bands = bands(&config);
        let mut sparkles = SparkleTracker::new();
        let mut rng = StdRng::seed_from_u64(8);

        compositor
            .compose(&mut display, &bands, &[7; 6], &mut sparkles, 0.0, &mut rng)
            .unwrap();

        let lit = display.last_frame().lit_count();
        assert!(lit < 6 * 5 * 7);
        // Nothing outside the bars got lit
        for x in [5, 6, 7, 13, 14, 15] {
            assert_eq!(display.last_frame().column(x), 0);
        }
    }
}

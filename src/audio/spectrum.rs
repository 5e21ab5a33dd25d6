//! Windowed FFT band analysis with a silence gate.

use std::f64::consts::PI;
use std::ops::Range;
use std::sync::Arc;

use log::debug;
use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::params::{AnalyzerConfig, BandRange};

/// Converts one audio block into one magnitude per configured band
pub struct SpectralAnalyzer {
    fft: Arc<dyn Fft<f64>>,
    window: Vec<f64>,
    /// Transform bins whose frequency falls in each band, precomputed
    band_bins: Vec<Range<usize>>,
    buffer: Vec<Complex<f64>>,
    silence_threshold: f64,
    blocks_transformed: u64,
}

impl SpectralAnalyzer {
    /// Plan the transform for `config.block_size` samples at `sample_rate_hz`
    pub fn new(config: &AnalyzerConfig, sample_rate_hz: u32) -> Self {
        let size = config.block_size;
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);

        let window = (0..size).map(|i| hann_window(i, size)).collect();
        let band_bins: Vec<_> = config
            .bands
            .iter()
            .map(|band| bins_for_band(band, size, sample_rate_hz))
            .collect();

        for (i, (band, bins)) in config.bands.iter().zip(&band_bins).enumerate() {
            if bins.is_empty() {
                debug!(
                    "[AUDIO] Band {} [{}, {}) Hz covers no transform bins",
                    i, band.low_hz, band.high_hz
                );
            }
        }

        Self {
            fft,
            window,
            band_bins,
            buffer: vec![Complex::new(0.0, 0.0); size],
            silence_threshold: config.silence_threshold,
            blocks_transformed: 0,
        }
    }

    pub fn band_count(&self) -> usize {
        self.band_bins.len()
    }

    /// Bin index range analysed for band `index`
    pub fn band_bins(&self, index: usize) -> Range<usize> {
        self.band_bins[index].clone()
    }

    /// Number of blocks that went through the transform (not gated)
    pub fn blocks_transformed(&self) -> u64 {
        self.blocks_transformed
    }

    /// True if the block's RMS is below the silence threshold
    pub fn is_silent(&self, samples: &[i32]) -> bool {
        block_rms(samples) < self.silence_threshold
    }

    /// Silence-gated band magnitudes; all zero for a quiet block
    pub fn analyze(&mut self, samples: &[i32]) -> Vec<f64> {
        if self.is_silent(samples) {
            return vec![0.0; self.band_count()];
        }
        self.magnitudes(samples)
    }

    /// Band magnitudes without the silence gate
    ///
    /// Short blocks are zero-padded, long blocks truncated to the planned size.
    pub fn magnitudes(&mut self, samples: &[i32]) -> Vec<f64> {
        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = samples.get(i).copied().unwrap_or(0) as f64;
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process(&mut self.buffer);
        self.blocks_transformed += 1;

        self.band_bins
            .iter()
            .map(|bins| {
                if bins.is_empty() {
                    0.0
                } else {
                    let sum: f64 = self.buffer[bins.clone()].iter().map(|c| c.norm()).sum();
                    sum / bins.len() as f64
                }
            })
            .collect()
    }
}

/// Real-transform bins (0..=size/2) whose centre frequency lies in `band`
fn bins_for_band(band: &BandRange, size: usize, sample_rate_hz: u32) -> Range<usize> {
    let half = size / 2;
    let freq = |bin: usize| bin as f64 * sample_rate_hz as f64 / size as f64;

    let start = (0..=half).find(|&k| freq(k) >= band.low_hz).unwrap_or(half + 1);
    let end = (start..=half)
        .find(|&k| !band.contains(freq(k)))
        .unwrap_or(half + 1);
    start..end
}

/// Root-mean-square amplitude of a block (0 for an empty block)
pub fn block_rms(samples: &[i32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_squares / samples.len() as f64).sqrt()
}

/// Symmetric Hann window
pub fn hann_window(index: usize, size: usize) -> f64 {
    if size <= 1 {
        return 1.0;
    }
    0.5 * (1.0 - ((2.0 * PI * index as f64) / (size as f64 - 1.0)).cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine_block(freq_hz: f64, amplitude: f64, config: &AnalyzerConfig) -> Vec<i32> {
        (0..config.block_size)
            .map(|i| {
                let t = i as f64 / config.sample_rate_hz as f64;
                (amplitude * (2.0 * PI * freq_hz * t).sin()) as i32
            })
            .collect()
    }

    #[test]
    fn test_hann_window() {
        let size = 1024;

        // Hann window should be 0 at edges, 1 at center
        assert!((hann_window(0, size) - 0.0).abs() < 0.01);
        assert!((hann_window(size - 1, size) - 0.0).abs() < 0.01);
        assert!((hann_window(size / 2, size) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_block_rms() {
        assert_eq!(block_rms(&[]), 0.0);
        assert_eq!(block_rms(&[3, -3, 3, -3]), 3.0);
        assert!((block_rms(&[i32::MAX; 4]) - i32::MAX as f64).abs() < 1.0);
    }

    #[test]
    fn test_band_bins_are_half_open() {
        let config = AnalyzerConfig::default();
        let analyzer = SpectralAnalyzer::new(&config, 44100);
        // ≈ 43.07 Hz per bin: 20-80 Hz only holds bin 1
        assert_eq!(analyzer.band_bins(0), 1..2);
        // 6000-20000 Hz: bins 140..465 (bin 465 ≈ 20026 Hz is excluded)
        assert_eq!(analyzer.band_bins(5), 140..465);
        // Adjacent bands never share a bin
        for i in 1..analyzer.band_count() {
            assert!(analyzer.band_bins(i - 1).end <= analyzer.band_bins(i).start);
        }
    }

    #[test]
    fn test_silent_block_bypasses_transform() {
        let config = AnalyzerConfig::default();
        let mut analyzer = SpectralAnalyzer::new(&config, 44100);

        let quiet = sine_block(1000.0, 5000.0, &config);
        let magnitudes = analyzer.analyze(&quiet);

        assert_eq!(magnitudes, vec![0.0; 6]);
        assert_eq!(analyzer.blocks_transformed(), 0);
    }

    #[test]
    fn test_tone_lands_in_its_band() {
        let config = AnalyzerConfig::default();
        let mut analyzer = SpectralAnalyzer::new(&config, 44100);

        let tone = sine_block(1000.0, 1.0e8, &config);
        let magnitudes = analyzer.analyze(&tone);

        assert_eq!(analyzer.blocks_transformed(), 1);
        let loudest = magnitudes
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i);
        assert_eq!(loudest, Some(3)); // 500-2000 Hz
    }

    #[test]
    fn test_band_without_bins_is_zero() {
        let mut config = AnalyzerConfig::default();
        config.bands = vec![BandRange::new(1.0, 2.0), BandRange::new(20.0, 20000.0)];
        let mut analyzer = SpectralAnalyzer::new(&config, 44100);

        let tone = sine_block(440.0, 1.0e8, &config);
        let magnitudes = analyzer.magnitudes(&tone);

        assert!(analyzer.band_bins(0).is_empty());
        assert_eq!(magnitudes[0], 0.0);
        assert!(magnitudes[1] > 0.0);
    }

    #[test]
    fn test_short_block_is_zero_padded() {
        let config = AnalyzerConfig::default();
        let mut analyzer = SpectralAnalyzer::new(&config, 44100);

        let tone = sine_block(1000.0, 1.0e8, &config);
        let magnitudes = analyzer.magnitudes(&tone[..100]);
        assert_eq!(magnitudes.len(), 6);
        assert!(magnitudes.iter().all(|m| m.is_finite()));
    }
}

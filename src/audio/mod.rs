//! Audio input and spectral analysis.
//!
//! Sources hand the frame loop fixed-size blocks of mono `i32` samples;
//! [`SpectralAnalyzer`] turns each block into per-band magnitudes.

mod capture;
mod spectrum;
mod wav;

pub use capture::{list_input_devices, CpalCapture};
pub use spectrum::{block_rms, hann_window, SpectralAnalyzer};
pub use wav::WavSource;

use crate::error::AudioError;

/// One block of mono samples, full-scale `i32`
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBlock {
    pub samples: Vec<i32>,

    /// Samples were dropped between this block and the previous one
    pub overflowed: bool,
}

/// Blocking source of fixed-size mono audio blocks
pub trait AudioSource {
    /// Sample rate of the delivered blocks (Hz)
    fn sample_rate(&self) -> u32;

    /// Block until one full block is available
    ///
    /// Overflow is reported through [`AudioBlock::overflowed`], never as an error.
    fn read_block(&mut self) -> Result<AudioBlock, AudioError>;

    /// Stop capturing and release the device
    fn close(&mut self);
}

impl<A: AudioSource + ?Sized> AudioSource for Box<A> {
    fn sample_rate(&self) -> u32 {
        (**self).sample_rate()
    }

    fn read_block(&mut self) -> Result<AudioBlock, AudioError> {
        (**self).read_block()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Average interleaved frames down to one channel
pub(crate) fn downmix(interleaved: &[i32], channels: usize) -> impl Iterator<Item = i32> + '_ {
    let channels = channels.max(1);
    interleaved.chunks(channels).map(move |frame| {
        let sum: i64 = frame.iter().map(|&s| s as i64).sum();
        (sum / frame.len() as i64) as i32
    })
}

/// Convert a float sample in [-1, 1] to full-scale `i32`
pub(crate) fn f32_to_i32(sample: f32) -> i32 {
    (sample.clamp(-1.0, 1.0) as f64 * i32::MAX as f64) as i32
}

/// Widen an integer sample of `bits` width to full-scale `i32`
pub(crate) fn widen_to_i32(sample: i32, bits: u16) -> i32 {
    if bits >= 32 {
        sample
    } else {
        sample << (32 - bits)
    }
}

//! WAV file replay as an audio source.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::{debug, info};

use super::{downmix, f32_to_i32, widen_to_i32, AudioBlock, AudioSource};
use crate::error::AudioError;

/// Replays a WAV file block by block, optionally looping
pub struct WavSource {
    reader: Option<hound::WavReader<BufReader<File>>>,
    spec: hound::WavSpec,
    block_size: usize,
    looping: bool,
    exhausted: bool,
}

impl WavSource {
    pub fn open(path: &Path, block_size: usize, looping: bool) -> Result<Self, AudioError> {
        let reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        info!(
            "[AUDIO] Replaying {:?}: {} Hz, {} ch, {} bit {:?}{}",
            path,
            spec.sample_rate,
            spec.channels,
            spec.bits_per_sample,
            spec.sample_format,
            if looping { " (looping)" } else { "" }
        );

        Ok(Self {
            reader: Some(reader),
            spec,
            block_size,
            looping,
            exhausted: false,
        })
    }

    /// Read up to `count` interleaved samples from the current position
    fn read_interleaved(&mut self, count: usize, out: &mut Vec<i32>) -> Result<(), AudioError> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(());
        };
        match self.spec.sample_format {
            hound::SampleFormat::Int => {
                let bits = self.spec.bits_per_sample;
                for sample in reader.samples::<i32>().take(count) {
                    out.push(widen_to_i32(sample?, bits));
                }
            }
            hound::SampleFormat::Float => {
                for sample in reader.samples::<f32>().take(count) {
                    out.push(f32_to_i32(sample?));
                }
            }
        }
        Ok(())
    }
}

impl AudioSource for WavSource {
    fn sample_rate(&self) -> u32 {
        self.spec.sample_rate
    }

    fn read_block(&mut self) -> Result<AudioBlock, AudioError> {
        if self.exhausted || self.reader.is_none() {
            return Err(AudioError::EndOfStream);
        }

        let channels = self.spec.channels.max(1) as usize;
        let wanted = self.block_size * channels;
        let mut interleaved = Vec::with_capacity(wanted);

        self.read_interleaved(wanted, &mut interleaved)?;
        let file_len = self.reader.as_ref().map_or(0, |r| r.len());
        // Files shorter than a block wrap several times
        while interleaved.len() < wanted && self.looping && file_len > 0 {
            debug!("[AUDIO] End of file, rewinding");
            if let Some(reader) = self.reader.as_mut() {
                reader.seek(0).map_err(hound::Error::from)?;
            }
            let before = interleaved.len();
            self.read_interleaved(wanted - before, &mut interleaved)?;
            if interleaved.len() == before {
                break;
            }
        }

        if interleaved.is_empty() {
            self.exhausted = true;
            return Err(AudioError::EndOfStream);
        }
        if interleaved.len() < wanted && !self.looping {
            self.exhausted = true;
        }

        let mut samples: Vec<i32> = downmix(&interleaved, channels).collect();
        samples.resize(self.block_size, 0);

        Ok(AudioBlock {
            samples,
            overflowed: false,
        })
    }

    fn close(&mut self) {
        if self.reader.take().is_some() {
            info!("[AUDIO] WAV input closed");
        }
    }
}

//! Live audio capture through cpal.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{debug, info, warn};

use super::{downmix, f32_to_i32, widen_to_i32, AudioBlock, AudioSource};
use crate::error::AudioError;

/// Blocks of headroom kept before the oldest samples are dropped
const QUEUE_BLOCKS: usize = 8;

/// Longest a read waits for the device before returning what it has
const READ_TIMEOUT: Duration = Duration::from_millis(250);

/// Samples handed from the device callback to the frame loop
struct SampleQueue {
    samples: VecDeque<i32>,
    capacity: usize,
    overflowed: bool,
}

impl SampleQueue {
    fn push(&mut self, mono: impl Iterator<Item = i32>) {
        self.samples.extend(mono);
        if self.samples.len() > self.capacity {
            let excess = self.samples.len() - self.capacity;
            self.samples.drain(..excess);
            self.overflowed = true;
        }
    }
}

struct Shared {
    queue: Mutex<SampleQueue>,
    ready: Condvar,
}

impl Shared {
    fn push(&self, interleaved: &[i32], channels: usize) {
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        queue.push(downmix(interleaved, channels));
        self.ready.notify_one();
    }
}

/// Input device stream delivering fixed-size mono blocks
pub struct CpalCapture {
    stream: Option<cpal::Stream>,
    shared: Arc<Shared>,
    block_size: usize,
    sample_rate: u32,
}

impl CpalCapture {
    /// Open the default input device, or the first whose name contains `device_name`
    pub fn open(device_name: Option<&str>, block_size: usize) -> Result<Self, AudioError> {
        debug!("[AUDIO] Initializing audio input...");

        let host = cpal::default_host();
        debug!("[AUDIO] Using host: {:?}", host.id());

        let device = match device_name {
            Some(wanted) => host
                .input_devices()
                .map_err(|e| AudioError::Device(format!("failed to enumerate devices: {}", e)))?
                .find(|d| d.name().map(|n| n.contains(wanted)).unwrap_or(false))
                .ok_or_else(|| AudioError::DeviceNotFound(wanted.to_string()))?,
            None => host.default_input_device().ok_or(AudioError::NoDevice)?,
        };

        let supported = device
            .default_input_config()
            .map_err(|e| AudioError::Device(format!("failed to get input config: {}", e)))?;
        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();
        let channels = config.channels as usize;
        let sample_rate = config.sample_rate.0;

        info!(
            "[AUDIO] Listening to '{}' at {} Hz ({} ch, {:?})",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate,
            channels,
            sample_format
        );

        let shared = Arc::new(Shared {
            queue: Mutex::new(SampleQueue {
                samples: VecDeque::with_capacity(block_size * QUEUE_BLOCKS),
                capacity: block_size * QUEUE_BLOCKS,
                overflowed: false,
            }),
            ready: Condvar::new(),
        });

        let err_fn = |err| warn!("[AUDIO] Stream error: {}", err);
        let sink = Arc::clone(&shared);

        let stream = match sample_format {
            cpal::SampleFormat::I16 => device.build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    let wide: Vec<i32> = data.iter().map(|&s| widen_to_i32(s as i32, 16)).collect();
                    sink.push(&wide, channels);
                },
                err_fn,
                None,
            ),
            cpal::SampleFormat::I32 => device.build_input_stream(
                &config,
                move |data: &[i32], _: &cpal::InputCallbackInfo| sink.push(data, channels),
                err_fn,
                None,
            ),
            cpal::SampleFormat::F32 => device.build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let wide: Vec<i32> = data.iter().map(|&s| f32_to_i32(s)).collect();
                    sink.push(&wide, channels);
                },
                err_fn,
                None,
            ),
            other => return Err(AudioError::UnsupportedFormat(format!("{:?}", other))),
        }
        .map_err(|e| AudioError::Device(format!("failed to build input stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| AudioError::Device(format!("failed to start input stream: {}", e)))?;

        info!("[AUDIO] Audio input initialized successfully");

        Ok(Self {
            stream: Some(stream),
            shared,
            block_size,
            sample_rate,
        })
    }
}

impl AudioSource for CpalCapture {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn read_block(&mut self) -> Result<AudioBlock, AudioError> {
        let block_size = self.block_size;
        let queue = self.shared.queue.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut queue, wait) = self
            .shared
            .ready
            .wait_timeout_while(queue, READ_TIMEOUT, |q| q.samples.len() < block_size)
            .unwrap_or_else(PoisonError::into_inner);

        if wait.timed_out() {
            debug!(
                "[AUDIO] Read timed out with {} of {} samples, padding with silence",
                queue.samples.len(),
                block_size
            );
        }

        let available = queue.samples.len().min(block_size);
        let mut samples: Vec<i32> = queue.samples.drain(..available).collect();
        samples.resize(block_size, 0);
        let overflowed = std::mem::take(&mut queue.overflowed);

        Ok(AudioBlock {
            samples,
            overflowed,
        })
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                debug!("[AUDIO] Failed to pause stream on close: {}", e);
            }
            info!("[AUDIO] Audio input closed");
        }
    }
}

impl Drop for CpalCapture {
    fn drop(&mut self) {
        self.close();
    }
}

/// Names of all input devices on the default host
pub fn list_input_devices() -> Result<Vec<String>, AudioError> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .map_err(|e| AudioError::Device(format!("failed to enumerate devices: {}", e)))?;
    Ok(devices
        .map(|d| d.name().unwrap_or_else(|_| "Unknown".to_string()))
        .collect())
}

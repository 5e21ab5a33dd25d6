//! Recording display: every shown frame becomes a PNG file.

use std::fs;
use std::path::PathBuf;

use log::{debug, info};

use super::{Display, FrameBuffer};
use crate::error::DisplayError;
use crate::params::RecordingConfig;

/// Grey level of an unlit dot, so the matrix layout stays visible
const UNLIT_LEVEL: u8 = 24;

/// Writes `frame_NNNNN.png` images into the recording's frame directory
pub struct RecordingDisplay {
    buffer: FrameBuffer,
    frames_dir: PathBuf,
    pixel_scale: u32,
    brightness: f32,
    frame_num: usize,
}

impl RecordingDisplay {
    /// Create the frame directory and an empty buffer
    pub fn new(config: &RecordingConfig, width: usize, height: usize) -> Result<Self, DisplayError> {
        let frames_dir = config.frames_dir();
        fs::create_dir_all(&frames_dir)?;
        info!(
            "[DISPLAY] Recording {} frames to {:?}",
            config.total_frames(),
            frames_dir
        );

        Ok(Self {
            buffer: FrameBuffer::new(width, height),
            frames_dir,
            pixel_scale: config.pixel_scale.max(1),
            brightness: 1.0,
            frame_num: 0,
        })
    }

    pub fn frames_written(&self) -> usize {
        self.frame_num
    }

    /// Path of the PNG for frame `frame_num`
    pub fn frame_path(&self, frame_num: usize) -> PathBuf {
        self.frames_dir.join(format!("frame_{:05}.png", frame_num))
    }

    /// Upscaled 8-bit greyscale image of the current buffer
    fn rasterize(&self) -> (Vec<u8>, u32, u32) {
        let scale = self.pixel_scale as usize;
        let width = self.buffer.width() * scale;
        let height = self.buffer.height() * scale;
        let lit_level = (self.brightness * 255.0).round() as u8;

        // Leave a one pixel dark gutter around each dot when there's room
        let (start, end) = if scale >= 3 { (1, scale - 1) } else { (0, scale) };

        let mut image_data = vec![0u8; width * height];
        for (y, row) in self.buffer.rows().enumerate() {
            for (x, &lit) in row.iter().enumerate() {
                let level = if lit { lit_level } else { UNLIT_LEVEL };
                for dy in start..end {
                    let offset = (y * scale + dy) * width + x * scale;
                    for dx in start..end {
                        image_data[offset + dx] = level;
                    }
                }
            }
        }
        (image_data, width as u32, height as u32)
    }
}

impl Display for RecordingDisplay {
    fn width(&self) -> usize {
        self.buffer.width()
    }

    fn height(&self) -> usize {
        self.buffer.height()
    }

    fn set_pixel(&mut self, x: usize, y: usize, lit: bool) {
        self.buffer.set(x, y, lit);
    }

    fn set_column(&mut self, x: usize, mask: u32) {
        self.buffer.set_column(x, mask);
    }

    fn clear(&mut self) {
        self.buffer.clear();
    }

    fn show(&mut self) -> Result<(), DisplayError> {
        let (image_data, width, height) = self.rasterize();
        let frame_path = self.frame_path(self.frame_num);

        image::save_buffer(
            &frame_path,
            &image_data,
            width,
            height,
            image::ColorType::L8,
        )
        .map_err(|source| DisplayError::Image {
            path: frame_path.clone(),
            source,
        })?;

        debug!("[DISPLAY] Saved {:?}", frame_path);
        self.frame_num += 1;
        Ok(())
    }

    fn set_brightness(&mut self, level: f32) {
        self.brightness = level.clamp(0.0, 1.0);
    }
}

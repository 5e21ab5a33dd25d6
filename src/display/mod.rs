//! Dot-matrix display abstraction and backends.
//!
//! The visualizer only talks to the [`Display`] trait. Backends keep a
//! [`FrameBuffer`] and push it somewhere on [`Display::show`].

mod recording;
mod terminal;

pub use recording::RecordingDisplay;
pub use terminal::TerminalDisplay;

use crate::error::DisplayError;

/// Default display width (six 5x7 matrices on an 8 column pitch)
pub const WIDTH: usize = 45;

/// Default display height
pub const HEIGHT: usize = 7;

/// Pixel-level output device
pub trait Display {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    /// Light or darken one pixel; out-of-range coordinates are ignored
    fn set_pixel(&mut self, x: usize, y: usize, lit: bool);

    /// Write a whole column, bit `y` of `mask` addresses row `y`
    fn set_column(&mut self, x: usize, mask: u32);

    /// Darken every pixel
    fn clear(&mut self);

    /// Push the buffered frame to the device
    fn show(&mut self) -> Result<(), DisplayError>;

    /// Global brightness, 0.0..=1.0
    fn set_brightness(&mut self, level: f32);
}

impl<D: Display + ?Sized> Display for Box<D> {
    fn width(&self) -> usize {
        (**self).width()
    }

    fn height(&self) -> usize {
        (**self).height()
    }

    fn set_pixel(&mut self, x: usize, y: usize, lit: bool) {
        (**self).set_pixel(x, y, lit)
    }

    fn set_column(&mut self, x: usize, mask: u32) {
        (**self).set_column(x, mask)
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn show(&mut self) -> Result<(), DisplayError> {
        (**self).show()
    }

    fn set_brightness(&mut self, level: f32) {
        (**self).set_brightness(level)
    }
}

/// Lit/unlit pixel grid, row 0 is the top
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<bool>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![false; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.pixels[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, lit: bool) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = lit;
        }
    }

    pub fn set_column(&mut self, x: usize, mask: u32) {
        for y in 0..self.height {
            self.set(x, y, mask & (1 << y) != 0);
        }
    }

    /// Column `x` packed back into a bitmask
    pub fn column(&self, x: usize) -> u32 {
        (0..self.height)
            .filter(|&y| self.get(x, y))
            .fold(0, |mask, y| mask | (1 << y))
    }

    pub fn clear(&mut self) {
        self.pixels.fill(false);
    }

    pub fn lit_count(&self) -> usize {
        self.pixels.iter().filter(|&&p| p).count()
    }

    /// Iterate rows top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.pixels.chunks(self.width.max(1))
    }
}

/// Display that keeps the last shown frame in memory
#[derive(Debug, Clone)]
pub struct HeadlessDisplay {
    buffer: FrameBuffer,
    shown: FrameBuffer,
    brightness: f32,
    frames_shown: usize,
}

impl HeadlessDisplay {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            buffer: FrameBuffer::new(width, height),
            shown: FrameBuffer::new(width, height),
            brightness: 1.0,
            frames_shown: 0,
        }
    }

    /// Frame as of the most recent `show`
    pub fn last_frame(&self) -> &FrameBuffer {
        &self.shown
    }

    pub fn frames_shown(&self) -> usize {
        self.frames_shown
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }
}

impl Display for HeadlessDisplay {
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
        self.shown.clone_from(&self.buffer);
        self.frames_shown += 1;
        Ok(())
    }

    fn set_brightness(&mut self, level: f32) {
        self.brightness = level.clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_mask_addresses_rows() {
        let mut fb = FrameBuffer::new(WIDTH, HEIGHT);
        fb.set_column(3, 0b1100000);

        assert!(fb.get(3, 6));
        assert!(fb.get(3, 5));
        assert!(!fb.get(3, 4));
        assert!(!fb.get(3, 0));
        assert_eq!(fb.column(3), 0b1100000);
        assert_eq!(fb.lit_count(), 2);
    }

    #[test]
    fn test_out_of_range_pixels_ignored() {
        let mut fb = FrameBuffer::new(4, 2);
        fb.set(4, 0, true);
        fb.set(0, 2, true);
        assert_eq!(fb.lit_count(), 0);
        assert!(!fb.get(10, 10));
    }

    #[test]
    fn test_headless_show_snapshots_buffer() {
        let mut display = HeadlessDisplay::new(4, 2);
        display.set_pixel(1, 1, true);
        assert_eq!(display.last_frame().lit_count(), 0);

        display.show().unwrap();
        assert!(display.last_frame().get(1, 1));
        assert_eq!(display.frames_shown(), 1);

        display.clear();
        display.show().unwrap();
        assert_eq!(display.last_frame().lit_count(), 0);
    }
}

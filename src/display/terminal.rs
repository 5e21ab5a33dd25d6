//! ANSI terminal rendering of the dot matrix.

use std::io::Write;

use super::{Display, FrameBuffer};
use crate::error::DisplayError;

const CURSOR_HOME: &str = "\x1b[H";
const CLEAR_SCREEN: &str = "\x1b[2J";
const RESET_COLOR: &str = "\x1b[0m";
const CLEAR_TO_EOL: &str = "\x1b[0K";

const LIT_DOT: &str = "●";
const UNLIT_DOT: &str = "·";

/// Draws each shown frame as a grid of dots on a text terminal
pub struct TerminalDisplay<W: Write> {
    out: W,
    buffer: FrameBuffer,
    brightness: f32,
    first_frame: bool,
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(out: W, width: usize, height: usize) -> Self {
        Self {
            out,
            buffer: FrameBuffer::new(width, height),
            brightness: 1.0,
            first_frame: true,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Truecolor escape for a lit dot at the current brightness (warm white)
    fn lit_color(&self) -> String {
        let level = (self.brightness * 255.0).round() as u8;
        let blue = (self.brightness * 200.0).round() as u8;
        format!("\x1b[38;2;{};{};{}m", level, level, blue)
    }

    fn render(&self) -> String {
        let mut output = String::with_capacity((self.buffer.width() * 8 + 16) * self.buffer.height());
        if self.first_frame {
            output.push_str(CLEAR_SCREEN);
        }
        output.push_str(CURSOR_HOME);

        let lit_color = self.lit_color();
        for row in self.buffer.rows() {
            for &lit in row {
                if lit {
                    output.push_str(&lit_color);
                    output.push_str(LIT_DOT);
                } else {
                    output.push_str("\x1b[38;2;40;40;40m");
                    output.push_str(UNLIT_DOT);
                }
            }
            output.push_str(RESET_COLOR);
            output.push_str(CLEAR_TO_EOL);
            output.push_str("\r\n");
        }
        output
    }
}

impl<W: Write> Display for TerminalDisplay<W> {
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
        let output = self.render();
        // Write in one go for atomic update
        self.out.write_all(output.as_bytes())?;
        self.out.flush()?;
        self.first_frame = false;
        Ok(())
    }

    fn set_brightness(&mut self, level: f32) {
        self.brightness = level.clamp(0.0, 1.0);
    }
}

//! Command-line argument parsing.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::params::{FrameConfig, RecordingConfig};

/// Where frames go
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DisplayMode {
    /// ANSI dots on stdout
    Terminal,
    /// PNG frame sequence
    Record,
    /// Render without output
    Headless,
}

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "dotspectrum")]
#[command(about = "Audio-reactive spectrum bars for a 45x7 dot-matrix display", long_about = None)]
pub struct Args {
    /// TOML file overriding any subset of the default configuration
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Input device name (substring match); default input if omitted
    #[arg(long, value_name = "NAME")]
    pub device: Option<String>,

    /// List input devices and exit
    #[arg(long)]
    pub list_devices: bool,

    /// Replay a WAV file instead of capturing live audio
    #[arg(long, value_name = "WAV")]
    pub input: Option<PathBuf>,

    /// Loop the WAV file instead of stopping at its end
    #[arg(long, requires = "input")]
    pub loop_input: bool,

    /// Output backend
    #[arg(long, value_enum, default_value_t = DisplayMode::Terminal)]
    pub display: DisplayMode,

    /// Record frames to PNG for this many seconds (default 10 with --display record)
    #[arg(long, value_name = "SECONDS")]
    pub record: Option<f32>,

    /// Output directory for recorded frames
    #[arg(long, value_name = "DIR", default_value = "recording")]
    pub output_dir: PathBuf,

    /// Global brightness (0..=1)
    #[arg(long, value_name = "LEVEL")]
    pub brightness: Option<f32>,

    /// Target frame rate
    #[arg(long, value_name = "FPS")]
    pub fps: Option<u32>,

    /// Seed for grain and strobe randomness
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Disable the band inversion strobe
    #[arg(long)]
    pub no_strobe: bool,

    /// Disable snow and sparkle grain
    #[arg(long)]
    pub no_grain: bool,

    /// Enable the sweeping scan line
    #[arg(long)]
    pub scan_line: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub dump_config: bool,
}

impl Args {
    /// Backend actually used; `--record` upgrades the terminal default to recording
    pub fn display_mode(&self) -> DisplayMode {
        match (self.record, self.display) {
            (Some(_), DisplayMode::Terminal) => DisplayMode::Record,
            (_, mode) => mode,
        }
    }

    /// Layer command-line overrides on top of `config`
    pub fn apply(&self, config: &mut FrameConfig) {
        if let Some(brightness) = self.brightness {
            config.display.base_brightness = brightness;
        }
        if let Some(fps) = self.fps {
            config.display.fps = fps;
        }
        if self.no_strobe {
            config.effects.invert_strobe = false;
        }
        if self.no_grain {
            config.effects.snow = false;
            config.effects.sparkle_grain = false;
        }
        if self.scan_line {
            config.effects.scan_line = true;
        }
    }

    /// Create recording configuration if recording mode is enabled
    pub fn recording_config(&self, fps: u32) -> Option<RecordingConfig> {
        (self.display_mode() == DisplayMode::Record).then(|| {
            let mut config = RecordingConfig::new(self.record.unwrap_or(10.0), fps);
            config.output_dir = self.output_dir.clone();
            config
        })
    }
}

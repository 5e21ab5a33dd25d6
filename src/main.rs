//! dotspectrum - spectrum bars for a 45x7 dot-matrix display
//!
//! Captures live audio (or replays a WAV), splits it into six frequency
//! bands and draws them as bouncing bars with strobe, grain and sparkle
//! effects.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use dotspectrum::audio::{list_input_devices, AudioSource, CpalCapture, WavSource};
use dotspectrum::cli::{Args, DisplayMode};
use dotspectrum::display::{Display, HeadlessDisplay, RecordingDisplay, TerminalDisplay};
use dotspectrum::frame_loop::{FrameLoop, MonotonicClock};
use dotspectrum::params::FrameConfig;

/// Set from the signal handler, polled between frames
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
fn install_signal_handlers() {
    extern "C" fn handle_signal(_: libc::c_int) {
        SHUTDOWN.store(true, Ordering::SeqCst);
    }

    // SAFETY: the handler only stores to an atomic
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = handle_signal as libc::sighandler_t;
        libc::sigaction(libc::SIGINT, &action, std::ptr::null_mut());
        libc::sigaction(libc::SIGTERM, &action, std::ptr::null_mut());
    }
}

#[cfg(not(unix))]
fn install_signal_handlers() {
    warn!("Signal handling unavailable on this platform; the loop runs until input ends");
}

fn load_config(args: &Args) -> Result<FrameConfig> {
    let mut config = match &args.config {
        Some(path) => FrameConfig::load(path)?,
        None => FrameConfig::default(),
    };
    args.apply(&mut config);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn open_audio(args: &Args, config: &FrameConfig) -> Result<Box<dyn AudioSource>> {
    let block_size = config.analyzer.block_size;
    let source: Box<dyn AudioSource> = match &args.input {
        Some(path) => Box::new(
            WavSource::open(path, block_size, args.loop_input)
                .with_context(|| format!("Failed to open {:?}", path))?,
        ),
        None => Box::new(
            CpalCapture::open(args.device.as_deref(), block_size)
                .context("Failed to open audio input")?,
        ),
    };
    Ok(source)
}

fn open_display(args: &Args, config: &FrameConfig) -> Result<(Box<dyn Display>, Option<usize>)> {
    let width = config.display.width;
    let height = config.display.height;

    if args.record.is_some() && args.display_mode() == DisplayMode::Headless {
        warn!("--record has no effect with --display headless");
    }

    let opened: (Box<dyn Display>, Option<usize>) =
        match args.recording_config(config.display.fps) {
            Some(recording) => {
                info!(
                    "Recording {:.1}s ({} frames) to {:?}",
                    recording.duration_secs,
                    recording.total_frames(),
                    recording.frames_dir()
                );
                let display = RecordingDisplay::new(&recording, width, height)
                    .context("Failed to prepare recording output")?;
                (Box::new(display), Some(recording.total_frames()))
            }
            None if args.display_mode() == DisplayMode::Headless => {
                (Box::new(HeadlessDisplay::new(width, height)), None)
            }
            None => (Box::new(TerminalDisplay::new(io::stdout(), width, height)), None),
        };
    Ok(opened)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.list_devices {
        for name in list_input_devices().context("Failed to enumerate input devices")? {
            println!("{}", name);
        }
        return Ok(());
    }

    let config = load_config(&args)?;
    if args.dump_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    info!("dotspectrum - audio-reactive dot-matrix spectrum");
    let audio = open_audio(&args, &config)?;
    let (display, frame_limit) = open_display(&args, &config)?;

    let rng = match args.seed {
        Some(seed) => {
            info!("Using seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    install_signal_handlers();

    let mut frame_loop = FrameLoop::new(config, audio, display, MonotonicClock::new(), rng)
        .with_frame_limit(frame_limit);
    let reason = frame_loop.run(&SHUTDOWN)?;
    info!("Stopped ({:?})", reason);

    Ok(())
}

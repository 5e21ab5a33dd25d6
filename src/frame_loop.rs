//! Fixed-cadence driver tying audio, analysis, effects and display together.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rand::Rng;

use crate::audio::{AudioSource, SpectralAnalyzer};
use crate::display::Display;
use crate::error::{AudioError, FrameError};
use crate::params::FrameConfig;
use crate::visualizer::{BandDynamics, Compositor, FrameContext};

/// Source of elapsed time for effects and frame pacing
pub trait Clock {
    /// Seconds since the clock started
    fn now(&self) -> f64;

    fn sleep(&mut self, duration: Duration);
}

/// Wall-clock time from a monotonic [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Interrupted,
    FrameLimit,
    EndOfStream,
}

/// Owns the frame context and every collaborator for one run
pub struct FrameLoop<A, D, C, R> {
    context: FrameContext,
    analyzer: SpectralAnalyzer,
    dynamics: BandDynamics,
    compositor: Compositor,
    audio: A,
    display: D,
    clock: C,
    rng: R,
    frame_budget_s: f64,
    frame_limit: Option<usize>,
    frames: usize,
    overflows: u64,
    shut_down: bool,
}

impl<A, D, C, R> FrameLoop<A, D, C, R>
where
    A: AudioSource,
    D: Display,
    C: Clock,
    R: Rng,
{
    /// Build the pipeline for `audio`'s sample rate and set the base brightness
    pub fn new(config: FrameConfig, audio: A, mut display: D, clock: C, rng: R) -> Self {
        let sample_rate_hz = match audio.sample_rate() {
            0 => config.analyzer.sample_rate_hz,
            rate => rate,
        };
        let analyzer = SpectralAnalyzer::new(&config.analyzer, sample_rate_hz);
        let dynamics = BandDynamics::new(&config);
        let compositor = Compositor::new(&config);
        let frame_budget_s = config.display.frame_budget_s();

        display.set_brightness(config.display.base_brightness);

        Self {
            context: FrameContext::new(config),
            analyzer,
            dynamics,
            compositor,
            audio,
            display,
            clock,
            rng,
            frame_budget_s,
            frame_limit: None,
            frames: 0,
            overflows: 0,
            shut_down: false,
        }
    }

    /// Stop after `limit` frames (recording mode)
    pub fn with_frame_limit(mut self, limit: Option<usize>) -> Self {
        self.frame_limit = limit;
        self
    }

    pub fn context(&self) -> &FrameContext {
        &self.context
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn overflows(&self) -> u64 {
        self.overflows
    }

    /// Produce exactly one frame
    pub fn step(&mut self) -> Result<(), FrameError> {
        let block = self.audio.read_block()?;
        if block.overflowed {
            self.overflows += 1;
            debug!("[LOOP] Input overflow, continuing with partial data");
        }

        let now = self.clock.now();
        let ctx = &mut self.context;

        let magnitudes = self.analyzer.analyze(&block.samples);
        let heights: Vec<usize> = self
            .dynamics
            .update_all(&mut ctx.bands, &magnitudes, now, &mut ctx.sparkles)
            .iter()
            .map(|frame| frame.bar_height)
            .collect();

        if ctx.config.effects.invert_strobe {
            ctx.strobe.update(now, &mut ctx.bands, &mut self.rng);
        }

        self.compositor.compose(
            &mut self.display,
            &ctx.bands,
            &heights,
            &mut ctx.sparkles,
            now,
            &mut self.rng,
        )?;

        self.frames += 1;
        Ok(())
    }

    /// Run until `stop` is set, the frame limit is hit or the input ends
    ///
    /// Shutdown runs on every exit path, including errors.
    pub fn run(&mut self, stop: &AtomicBool) -> Result<StopReason, FrameError> {
        info!(
            "[LOOP] Starting: {} bands, {:.0} FPS target",
            self.context.bands.len(),
            1.0 / self.frame_budget_s
        );
        let result = self.run_frames(stop);
        self.shutdown();
        result
    }

    fn run_frames(&mut self, stop: &AtomicBool) -> Result<StopReason, FrameError> {
        loop {
            if stop.load(Ordering::SeqCst) {
                return Ok(StopReason::Interrupted);
            }
            if self.frame_limit.is_some_and(|limit| self.frames >= limit) {
                return Ok(StopReason::FrameLimit);
            }

            let frame_start = self.clock.now();
            match self.step() {
                Ok(()) => {}
                Err(FrameError::Audio(AudioError::EndOfStream)) => {
                    return Ok(StopReason::EndOfStream);
                }
                Err(e) => return Err(e),
            }

            // Sleep off whatever is left of the frame budget
            let remaining = self.frame_budget_s - (self.clock.now() - frame_start);
            if remaining > 0.0 {
                self.clock.sleep(Duration::from_secs_f64(remaining));
            }
        }
    }

    /// Blank the display and release the audio input; later calls do nothing
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        info!("[LOOP] Shutting down...");
        self.display.clear();
        if let Err(e) = self.display.show() {
            warn!("[LOOP] Failed to blank display: {}", e);
        }
        self.audio.close();

        info!(
            "[LOOP] Stopped after {} frames ({} analysed, {} overflows)",
            self.frames,
            self.analyzer.blocks_transformed(),
            self.overflows
        );
    }
}

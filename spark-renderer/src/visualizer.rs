//! Ambient audio-bar visualizer.
//!
//! Produces a fresh draw list of vertical bars each frame from a signal
//! source. When no real audio analyser is wired in, a simulated signal
//! (phase-shifted sines plus seeded noise) keeps the bars alive so the
//! canvas never looks frozen. Disposal cancels the sampling loop and
//! releases the source exactly once.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use spark_core::TimeOfDay;

use crate::{RenderError, RenderResult};

/// A per-frame signal producer feeding the bar visualizer.
///
/// Implementations fill `out` with one byte per bar in `0..=255`.
pub trait SignalSource {
    /// Fill `out` with the current signal levels.
    fn sample(&mut self, clock_secs: f32, out: &mut [u8]);

    /// Release any underlying resource (analyser node, stream handle).
    fn release(&mut self);
}

/// Deterministic stand-in signal: two phase-shifted sines plus seeded
/// noise, so tests and the no-audio path get stable, lively bars.
#[derive(Debug)]
pub struct SimulatedSignal {
    rng: StdRng,
}

impl SimulatedSignal {
    /// Create a simulated signal from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for SimulatedSignal {
    fn default() -> Self {
        Self::new(0)
    }
}

impl SignalSource for SimulatedSignal {
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn sample(&mut self, clock_secs: f32, out: &mut [u8]) {
        for (i, slot) in out.iter_mut().enumerate() {
            let x = i as f32 * 0.4;
            let wave = (clock_secs * 2.0 + x).sin() * 0.5 + (clock_secs * 3.1 + x * 1.7).sin() * 0.3;
            let noise = self.rng.gen_range(-0.08..=0.08_f32);
            let level = (wave * 0.5 + 0.5 + noise).clamp(0.0, 1.0);
            *slot = (level * 255.0) as u8;
        }
    }

    fn release(&mut self) {}
}

/// One bar in the per-frame draw list, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarDrawOp {
    /// Left edge of the bar.
    pub x: f32,
    /// Top edge of the bar (bars grow upward from the baseline).
    pub y: f32,
    /// Bar width.
    pub width: f32,
    /// Bar height, clamped to the surface height.
    pub height: f32,
    /// Gradient stops for the fill, from the time-of-day palette.
    pub gradient: (spark_core::Rgb, spark_core::Rgb),
}

/// Configuration for the bar visualizer.
#[derive(Debug, Clone, Copy)]
pub struct VisualizerConfig {
    /// Number of bars.
    pub bar_count: usize,
    /// Gap between bars in logical pixels.
    pub bar_gap: f32,
    /// Palette source for the bar gradient.
    pub time_of_day: TimeOfDay,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            bar_count: 32,
            bar_gap: 2.0,
            time_of_day: TimeOfDay::Afternoon,
        }
    }
}

/// Bar visualizer driving a fresh draw list each frame.
pub struct AudioBarVisualizer {
    config: VisualizerConfig,
    source: Box<dyn SignalSource>,
    levels: Vec<u8>,
    width: f32,
    height: f32,
    disposed: bool,
}

impl std::fmt::Debug for AudioBarVisualizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioBarVisualizer")
            .field("config", &self.config)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl AudioBarVisualizer {
    /// Create a visualizer over a signal source.
    #[must_use]
    pub fn new(config: VisualizerConfig, source: Box<dyn SignalSource>) -> Self {
        let levels = vec![0; config.bar_count];
        Self {
            config,
            source,
            levels,
            width: 320.0,
            height: 80.0,
            disposed: false,
        }
    }

    /// Create a visualizer with the default simulated signal.
    #[must_use]
    pub fn simulated(config: VisualizerConfig, seed: u64) -> Self {
        Self::new(config, Box::new(SimulatedSignal::new(seed)))
    }

    /// Set the surface size the bars are laid out in.
    pub fn set_size(&mut self, width: f32, height: f32) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
    }

    /// Sample the source and build this frame's draw list.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Disposed`] after disposal.
    #[allow(clippy::cast_precision_loss)]
    pub fn frame(&mut self, clock_secs: f32) -> RenderResult<Vec<BarDrawOp>> {
        if self.disposed {
            return Err(RenderError::Disposed);
        }
        self.source.sample(clock_secs, &mut self.levels);

        let gradient = self.config.time_of_day.gradient();
        let count = self.levels.len();
        let slot_width = self.width / count as f32;
        let bar_width = (slot_width - self.config.bar_gap).max(1.0);

        let ops = self
            .levels
            .iter()
            .enumerate()
            .map(|(i, &level)| {
                let height =
                    (f32::from(level) / 255.0 * self.height).clamp(0.0, self.height);
                BarDrawOp {
                    x: i as f32 * slot_width,
                    y: self.height - height,
                    width: bar_width,
                    height,
                    gradient,
                }
            })
            .collect();
        Ok(ops)
    }

    /// Whether the visualizer has been disposed.
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Cancel the sampling loop and release the source. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.source.release();
        self.disposed = true;
        tracing::debug!("Audio bar visualizer disposed");
    }
}

impl Drop for AudioBarVisualizer {
    fn drop(&mut self) {
        self.dispose();
    }
}

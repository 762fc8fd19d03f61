//! # Performance and Connectivity Adaptation
//!
//! Observes frame timing and online state on a fixed polling interval and
//! derives a reduced-features mode that the rest of the canvas branches on:
//! smaller particle pools, no GPU renderer, suppressed ambient audio.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Configuration for the performance adapter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PerfConfig {
    /// How often the state is recomputed, in milliseconds.
    pub poll_interval_ms: u64,
    /// Frame rate below which the device counts as low-performance.
    pub low_fps_threshold: f32,
    /// Sliding window for the fps estimate, in milliseconds.
    pub fps_window_ms: u64,
}

impl Default for PerfConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 3000,
            low_fps_threshold: 25.0,
            fps_window_ms: 1000,
        }
    }
}

/// Observed device/network condition driving conditional construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceState {
    /// Whether the host reports network connectivity.
    pub is_online: bool,
    /// Whether the measured frame rate is below the threshold.
    pub is_low_performance_device: bool,
    /// Combined degradation flag all components branch on.
    pub reduced_features: bool,
    /// Latest frame-rate estimate.
    pub fps: f32,
}

impl Default for PerformanceState {
    fn default() -> Self {
        Self {
            is_online: true,
            is_low_performance_device: false,
            reduced_features: false,
            fps: 60.0,
        }
    }
}

/// Polls frame timing and connectivity into a [`PerformanceState`].
#[derive(Debug)]
pub struct PerformanceAdapter {
    config: PerfConfig,
    frame_times_ms: VecDeque<u64>,
    is_online: bool,
    last_poll_ms: Option<u64>,
    state: PerformanceState,
}

impl PerformanceAdapter {
    /// Create an adapter with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(PerfConfig::default())
    }

    /// Create an adapter with custom configuration.
    #[must_use]
    pub fn with_config(config: PerfConfig) -> Self {
        Self {
            config,
            frame_times_ms: VecDeque::new(),
            is_online: true,
            last_poll_ms: None,
            state: PerformanceState::default(),
        }
    }

    /// Get the current configuration.
    #[must_use]
    pub const fn config(&self) -> &PerfConfig {
        &self.config
    }

    /// Record a rendered frame timestamp.
    pub fn record_frame(&mut self, now_ms: u64) {
        self.frame_times_ms.push_back(now_ms);
        let window_start = now_ms.saturating_sub(self.config.fps_window_ms);
        while self
            .frame_times_ms
            .front()
            .is_some_and(|&t| t < window_start)
        {
            self.frame_times_ms.pop_front();
        }
    }

    /// Update the host-reported connectivity flag.
    pub fn set_online(&mut self, is_online: bool) {
        if self.is_online != is_online {
            tracing::info!("Connectivity changed: online={is_online}");
        }
        self.is_online = is_online;
    }

    /// Frame-rate estimate over the sliding window.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fps(&self) -> f32 {
        let frames = self.frame_times_ms.len();
        if frames < 2 {
            // Not enough samples to judge; assume nominal.
            return 60.0;
        }
        frames as f32 * 1000.0 / self.config.fps_window_ms as f32
    }

    /// Recompute the state if the polling interval has elapsed.
    ///
    /// Returns the new state when a recomputation happened.
    pub fn poll(&mut self, now_ms: u64) -> Option<PerformanceState> {
        let due = self
            .last_poll_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= self.config.poll_interval_ms);
        if !due {
            return None;
        }

        self.last_poll_ms = Some(now_ms);
        let fps = self.fps();
        let is_low = fps < self.config.low_fps_threshold;
        let reduced = is_low || !self.is_online;

        if reduced && !self.state.reduced_features {
            tracing::warn!("Entering reduced-features mode (fps {fps:.0}, online {})", self.is_online);
        }

        self.state = PerformanceState {
            is_online: self.is_online,
            is_low_performance_device: is_low,
            reduced_features: reduced,
            fps,
        };
        Some(self.state)
    }

    /// The last computed state.
    #[must_use]
    pub const fn state(&self) -> &PerformanceState {
        &self.state
    }

    /// Particle pool size for a requested count under the current state.
    ///
    /// Reduced features cut the pool to a third; the result is always
    /// strictly below the full-features count for the same request.
    #[must_use]
    pub const fn particle_count(&self, requested: usize) -> usize {
        if self.state.reduced_features {
            requested / 3
        } else {
            requested
        }
    }
}

impl Default for PerformanceAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Feed `fps` frames spread over one second ending at `end_ms`.
    fn feed_frames(adapter: &mut PerformanceAdapter, fps: u64, end_ms: u64) {
        let start = end_ms - 1000;
        for i in 0..fps {
            adapter.record_frame(start + i * 1000 / fps);
        }
    }

    #[test]
    fn test_fps_estimate() {
        let mut adapter = PerformanceAdapter::new();
        feed_frames(&mut adapter, 60, 1000);
        assert!((adapter.fps() - 60.0).abs() < 2.0);
    }

    #[test]
    fn test_poll_interval_gating() {
        let mut adapter = PerformanceAdapter::new();
        assert!(adapter.poll(0).is_some());
        assert!(adapter.poll(1000).is_none());
        assert!(adapter.poll(2999).is_none());
        assert!(adapter.poll(3000).is_some());
    }

    #[test]
    fn test_low_fps_triggers_reduced_features() {
        let mut adapter = PerformanceAdapter::new();
        feed_frames(&mut adapter, 15, 1000);

        let state = adapter.poll(1000).expect("first poll runs");
        assert!(state.is_low_performance_device);
        assert!(state.reduced_features);
    }

    #[test]
    fn test_offline_triggers_reduced_features() {
        let mut adapter = PerformanceAdapter::new();
        feed_frames(&mut adapter, 60, 1000);
        adapter.set_online(false);

        let state = adapter.poll(1000).expect("first poll runs");
        assert!(!state.is_low_performance_device);
        assert!(state.reduced_features);
        assert!(!state.is_online);
    }

    #[test]
    fn test_healthy_device_full_features() {
        let mut adapter = PerformanceAdapter::new();
        feed_frames(&mut adapter, 60, 1000);

        let state = adapter.poll(1000).expect("first poll runs");
        assert!(!state.reduced_features);
    }

    #[test]
    fn test_reduced_particle_count_strictly_less() {
        let mut adapter = PerformanceAdapter::new();
        let full = adapter.particle_count(600);
        assert_eq!(full, 600);

        feed_frames(&mut adapter, 10, 1000);
        adapter.poll(1000);
        let reduced = adapter.particle_count(600);

        assert!(reduced < full);
        assert_eq!(reduced, 200);
    }

    #[test]
    fn test_old_frames_leave_window() {
        let mut adapter = PerformanceAdapter::new();
        feed_frames(&mut adapter, 60, 1000);
        // A single frame far in the future evicts the rest.
        adapter.record_frame(10_000);
        assert!((adapter.fps() - 60.0).abs() < f32::EPSILON); // < 2 samples → nominal
    }

    #[test]
    fn test_recovery_restores_full_features() {
        let mut adapter = PerformanceAdapter::new();
        adapter.set_online(false);
        adapter.poll(0);
        assert!(adapter.state().reduced_features);

        adapter.set_online(true);
        feed_frames(&mut adapter, 60, 4000);
        let state = adapter.poll(4000).expect("interval elapsed");
        assert!(!state.reduced_features);
    }
}

//! # Spark Canvas Renderer
//!
//! Ambient rendering for the Spark Canvas: a GPU-accelerated particle field
//! with a static low-performance fallback, plus the 2D draw-list producers
//! (audio bars, constellation, reward sprites) that the hosting surface
//! blits each frame.
//!
//! ## Rendering Backends
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │            AmbientBackend Trait             │
//! ├──────────────────────┬──────────────────────┤
//! │ wgpu point cloud     │ Static fallback      │
//! │ (per-frame drift)    │ (no displacement)    │
//! └──────────────────────┴──────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod constellation;
pub mod error;
pub mod particle;
pub mod reward_fx;
pub mod visualizer;

pub use backend::{AmbientBackend, BackendKind};
pub use constellation::{ConstellationView, EdgeDrawOp, NodeOverlay};
pub use error::{RenderError, RenderResult};
pub use particle::{DriftPattern, Particle, ParticleField, ParticleFieldConfig, ParticleVertex};
pub use reward_fx::{reward_sprite, RewardSprite};
pub use visualizer::{
    AudioBarVisualizer, BarDrawOp, SignalSource, SimulatedSignal, VisualizerConfig,
};

use rand::Rng;

/// Configuration for the ambient renderer.
#[derive(Debug, Clone)]
pub struct AmbientRendererConfig {
    /// Preferred backend (falls back to static if unavailable).
    pub preferred_backend: BackendKind,
    /// Particle field configuration.
    pub field: ParticleFieldConfig,
}

impl Default for AmbientRendererConfig {
    fn default() -> Self {
        Self {
            preferred_backend: BackendKind::Gpu,
            field: ParticleFieldConfig::default(),
        }
    }
}

/// The ambient particle renderer.
///
/// Owns the particle pool and exactly one backend instance; disposal
/// releases the backend's buffers and context and is idempotent.
pub struct AmbientRenderer {
    field: ParticleField,
    backend: Box<dyn AmbientBackend>,
    frame_count: u64,
    disposed: bool,
}

impl AmbientRenderer {
    /// Create a renderer, constructing the particle pool and backend.
    ///
    /// Under `reduced_features` the GPU backend is skipped entirely; a GPU
    /// initialization failure also falls back to the static path.
    ///
    /// # Errors
    ///
    /// Returns an error only if no backend can be constructed.
    pub fn new<R: Rng + ?Sized>(
        config: AmbientRendererConfig,
        reduced_features: bool,
        rng: &mut R,
    ) -> RenderResult<Self> {
        let field = ParticleField::new(config.field, rng);
        let backend = Self::create_backend(config.preferred_backend, reduced_features)?;

        Ok(Self {
            field,
            backend,
            frame_count: 0,
            disposed: false,
        })
    }

    fn create_backend(
        preferred: BackendKind,
        reduced_features: bool,
    ) -> RenderResult<Box<dyn AmbientBackend>> {
        if reduced_features || preferred == BackendKind::Static {
            return Ok(Box::new(backend::static_fallback::StaticBackend::new()));
        }

        #[cfg(feature = "gpu")]
        {
            match backend::wgpu::WgpuBackend::new() {
                Ok(b) => return Ok(Box::new(b)),
                Err(e) => {
                    tracing::warn!("GPU backend unavailable, falling back to static: {e}");
                }
            }
        }

        Ok(Box::new(backend::static_fallback::StaticBackend::new()))
    }

    /// Advance the field and render one frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the renderer is disposed or the backend fails.
    pub fn frame(&mut self, dt_secs: f32) -> RenderResult<()> {
        if self.disposed {
            return Err(RenderError::Disposed);
        }
        self.field.update(dt_secs);
        self.backend.render(&self.field)?;
        self.frame_count += 1;
        Ok(())
    }

    /// Update the smoothed pointer target (normalized to `[-1, 1]`).
    pub fn set_pointer(&mut self, nx: f32, ny: f32) {
        self.field.set_pointer(nx, ny);
    }

    /// Resize the rendering surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend resize fails.
    pub fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        self.backend.resize(width, height)
    }

    /// Rebuild the particle pool at a new tier count.
    pub fn retier<R: Rng + ?Sized>(&mut self, particle_count: usize, rng: &mut R) {
        self.field.resize(particle_count, rng);
    }

    /// The particle field.
    #[must_use]
    pub const fn field(&self) -> &ParticleField {
        &self.field
    }

    /// Frames rendered so far.
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// The active backend kind.
    #[must_use]
    pub fn active_backend(&self) -> BackendKind {
        self.backend.backend_kind()
    }

    /// Whether the renderer has been disposed.
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Number of GPU buffers still allocated by the backend.
    #[must_use]
    pub fn live_buffers(&self) -> usize {
        self.backend.live_buffers()
    }

    /// Dispose the backend: geometry buffers, materials, and the context.
    /// Idempotent; also runs on drop. Leaked contexts are a correctness
    /// bug, not a cosmetic issue.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.backend.dispose();
        self.disposed = true;
        tracing::debug!("Ambient renderer disposed after {} frames", self.frame_count);
    }
}

impl Drop for AmbientRenderer {
    fn drop(&mut self) {
        self.dispose();
    }
}

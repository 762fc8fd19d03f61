//! Ambient rendering backend implementations.

pub mod static_fallback;
#[cfg(feature = "gpu")]
pub mod wgpu;

use crate::particle::ParticleField;
use crate::RenderResult;

/// Available ambient backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// wgpu point cloud with per-frame vertex drift.
    Gpu,
    /// Static material, no per-frame displacement (low-performance path).
    Static,
}

/// Trait for ambient rendering backends.
///
/// Exactly one backend instance owns the rendering context per canvas;
/// `dispose` must release every acquired resource and is called from the
/// renderer's single teardown path (including drop).
pub trait AmbientBackend {
    /// Get the backend kind.
    fn backend_kind(&self) -> BackendKind;

    /// Render one frame of the particle field.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, field: &ParticleField) -> RenderResult<()>;

    /// Resize the rendering surface.
    ///
    /// # Errors
    ///
    /// Returns an error if resizing fails.
    fn resize(&mut self, width: u32, height: u32) -> RenderResult<()>;

    /// Release geometry buffers, materials, and the context. Idempotent.
    fn dispose(&mut self);

    /// Number of GPU buffers still allocated (0 for non-GPU backends).
    fn live_buffers(&self) -> usize;
}

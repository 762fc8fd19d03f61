//! Static ambient fallback.
//!
//! Used when the GPU backend is unavailable or the device is in
//! reduced-features mode. Particles keep their sampled positions (no
//! per-frame drift) and are projected to 2D point sprites that the host
//! blits as a flat layer. Holds no GPU resources.

use crate::particle::ParticleField;
use crate::{RenderError, RenderResult};

use super::{AmbientBackend, BackendKind};

/// A projected point sprite in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticSprite {
    /// Horizontal position in logical pixels.
    pub x: f32,
    /// Vertical position in logical pixels.
    pub y: f32,
    /// Sprite diameter in logical pixels.
    pub size: f32,
    /// Base color.
    pub color: [f32; 3],
}

/// CPU-only ambient backend with no per-frame displacement.
#[derive(Debug)]
pub struct StaticBackend {
    width: u32,
    height: u32,
    sprites: Vec<StaticSprite>,
    disposed: bool,
}

impl StaticBackend {
    /// Create the static backend at a nominal surface size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            width: 800,
            height: 600,
            sprites: Vec::new(),
            disposed: false,
        }
    }

    /// Sprites produced by the most recent frame.
    #[must_use]
    pub fn sprites(&self) -> &[StaticSprite] {
        &self.sprites
    }

    /// Project one particle through the scene rotation onto the surface.
    #[allow(clippy::cast_precision_loss)]
    fn project(&self, position: [f32; 3], size: f32, rotation: [f32; 2]) -> StaticSprite {
        let [rx, ry] = rotation;
        let [x, y, z] = position;

        // Rotate around Y then X, matching the vertex-stage order.
        let (sy, cy) = ry.sin_cos();
        let xz_x = cy * x + sy * z;
        let xz_z = -sy * x + cy * z;
        let (sx, cx) = rx.sin_cos();
        let rot_y = cx * y - sx * xz_z;

        let half_w = self.width as f32 / 2.0;
        let half_h = self.height as f32 / 2.0;
        StaticSprite {
            x: half_w + xz_x * half_w * 0.12,
            y: half_h - rot_y * half_h * 0.12,
            size,
            color: [0.0, 0.0, 0.0],
        }
    }
}

impl Default for StaticBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AmbientBackend for StaticBackend {
    fn backend_kind(&self) -> BackendKind {
        BackendKind::Static
    }

    fn render(&mut self, field: &ParticleField) -> RenderResult<()> {
        if self.disposed {
            return Err(RenderError::Disposed);
        }
        let rotation = field.rotation();
        self.sprites.clear();
        self.sprites.reserve(field.len());
        for p in field.particles() {
            let mut sprite = self.project(p.position, p.size, rotation);
            sprite.color = p.color;
            self.sprites.push(sprite);
        }
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidSize { width, height });
        }
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn dispose(&mut self) {
        self.sprites.clear();
        self.sprites.shrink_to_fit();
        self.disposed = true;
    }

    fn live_buffers(&self) -> usize {
        0
    }
}

//! # Ambient Particle Field
//!
//! A pool of particles sampled once at creation within a capped sphere,
//! colored from the time-of-day palette with per-particle jitter. The
//! field owns rotation state: pointer position (normalized to `[-1, 1]`)
//! is lerped toward each frame, or the scene free-rotates at a fixed slow
//! rate when pointer tracking is off. Per-frame displacement happens in
//! the GPU vertex stage on the high-fidelity path; the static fallback
//! draws the sampled positions as-is.

use bytemuck::{Pod, Zeroable};
use rand::Rng;
use serde::{Deserialize, Serialize};

use spark_core::{Rgb, TimeOfDay};

/// Base sphere radius at intensity 1.0, in scene units.
const BASE_RADIUS: f32 = 4.0;

/// Hard cap on the sampling sphere regardless of intensity.
const MAX_RADIUS: f32 = 8.0;

/// Drift pattern assigned per particle, dispatched exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriftPattern {
    /// Slow vertical bob.
    Float,
    /// Radial breathing.
    Pulse,
    /// Lateral circling.
    Orbit,
}

impl DriftPattern {
    const ALL: [Self; 3] = [Self::Float, Self::Pulse, Self::Orbit];

    /// Assign a pattern by pool index.
    #[must_use]
    pub const fn nth(index: usize) -> Self {
        Self::ALL[index % 3]
    }

    /// CPU-side sinusoidal displacement for the fallback path.
    #[must_use]
    pub fn displacement(self, phase: f32, clock: f32) -> [f32; 3] {
        let t = clock + phase;
        match self {
            Self::Float => [0.0, (t * 0.8).sin() * 0.2, 0.0],
            Self::Pulse => {
                let s = (t * 1.2).sin() * 0.1;
                [s, s, s]
            }
            Self::Orbit => [(t * 0.6).cos() * 0.15, 0.0, (t * 0.6).sin() * 0.15],
        }
    }
}

/// A single ambient particle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Position in scene units, sampled once at creation.
    pub position: [f32; 3],
    /// Point size in logical pixels.
    pub size: f32,
    /// Color from the time-of-day palette with ±10% jitter.
    pub color: Rgb,
    /// Drift pattern tag.
    pub pattern: DriftPattern,
    /// Phase offset for the drift animation.
    pub phase: f32,
}

/// Vertex layout uploaded to the GPU point-cloud pipeline.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct ParticleVertex {
    /// Sampled position.
    pub position: [f32; 3],
    /// Point size.
    pub size: f32,
    /// Base color.
    pub color: [f32; 3],
    /// Drift phase (the shader adds the clock uniform).
    pub phase: f32,
}

impl From<&Particle> for ParticleVertex {
    fn from(p: &Particle) -> Self {
        Self {
            position: p.position,
            size: p.size,
            color: p.color,
            phase: p.phase,
        }
    }
}

/// Configuration for the particle field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ParticleFieldConfig {
    /// Number of particles in the pool.
    pub particle_count: usize,
    /// Scales the sampling sphere radius (capped at a fixed maximum).
    pub intensity: f32,
    /// Palette source.
    pub time_of_day: TimeOfDay,
    /// Whether the scene rotation follows the pointer.
    pub pointer_tracking: bool,
    /// Free-rotation rate in radians per second when tracking is off.
    pub free_rotation_rate: f32,
    /// Per-frame lerp factor toward the pointer target.
    pub pointer_lerp: f32,
}

impl Default for ParticleFieldConfig {
    fn default() -> Self {
        Self {
            particle_count: 600,
            intensity: 1.0,
            time_of_day: TimeOfDay::Afternoon,
            pointer_tracking: true,
            free_rotation_rate: 0.05,
            pointer_lerp: 0.08,
        }
    }
}

/// The particle pool plus rotation/clock state.
#[derive(Debug)]
pub struct ParticleField {
    config: ParticleFieldConfig,
    particles: Vec<Particle>,
    /// Scene rotation (x, y) in radians.
    rotation: [f32; 2],
    /// Smoothed rotation target from pointer input.
    pointer_target: [f32; 2],
    /// Animation clock in seconds, fed to the drift shader as a uniform.
    clock: f32,
}

impl ParticleField {
    /// Sample a new pool.
    #[must_use]
    pub fn new<R: Rng + ?Sized>(config: ParticleFieldConfig, rng: &mut R) -> Self {
        let particles = Self::sample_pool(&config, rng);
        Self {
            config,
            particles,
            rotation: [0.0, 0.0],
            pointer_target: [0.0, 0.0],
            clock: 0.0,
        }
    }

    fn sample_pool<R: Rng + ?Sized>(config: &ParticleFieldConfig, rng: &mut R) -> Vec<Particle> {
        let radius = (BASE_RADIUS * config.intensity).min(MAX_RADIUS);
        let palette = config.time_of_day.palette();

        (0..config.particle_count)
            .map(|i| {
                // Uniform sample inside the sphere: random direction, r ∝ cbrt(u).
                let theta = rng.gen_range(0.0..std::f32::consts::TAU);
                let cos_phi = rng.gen_range(-1.0_f32..1.0);
                let sin_phi = (1.0 - cos_phi * cos_phi).sqrt();
                let r = radius * rng.gen_range(0.0_f32..1.0).cbrt();

                let base = palette[i % 3];
                let size = rng.gen_range(1.5..=4.0);
                let phase = rng.gen_range(0.0..std::f32::consts::TAU);
                let mut jitter = |c: f32| (c * rng.gen_range(0.9..=1.1)).clamp(0.0, 1.0);

                Particle {
                    position: [
                        r * sin_phi * theta.cos(),
                        r * sin_phi * theta.sin(),
                        r * cos_phi,
                    ],
                    size,
                    color: [jitter(base[0]), jitter(base[1]), jitter(base[2])],
                    pattern: DriftPattern::nth(i),
                    phase,
                }
            })
            .collect()
    }

    /// Rebuild the pool at a new count (device-capability change).
    pub fn resize<R: Rng + ?Sized>(&mut self, particle_count: usize, rng: &mut R) {
        self.config.particle_count = particle_count;
        self.particles = Self::sample_pool(&self.config, rng);
        tracing::debug!("Particle pool rebuilt: {particle_count} particles");
    }

    /// Update the pointer rotation target, clamped to `[-1, 1]`.
    pub fn set_pointer(&mut self, nx: f32, ny: f32) {
        // Pointer y tilts around x, pointer x turns around y.
        self.pointer_target = [
            ny.clamp(-1.0, 1.0) * 0.3,
            nx.clamp(-1.0, 1.0) * 0.3,
        ];
    }

    /// Advance the clock and rotation by `dt_secs`.
    pub fn update(&mut self, dt_secs: f32) {
        self.clock += dt_secs;

        if self.config.pointer_tracking {
            let lerp = self.config.pointer_lerp;
            self.rotation[0] += (self.pointer_target[0] - self.rotation[0]) * lerp;
            self.rotation[1] += (self.pointer_target[1] - self.rotation[1]) * lerp;
        } else {
            self.rotation[1] =
                (self.rotation[1] + self.config.free_rotation_rate * dt_secs)
                    % std::f32::consts::TAU;
        }
    }

    /// Pool size.
    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether the pool is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// The particle pool.
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Current scene rotation (x, y) in radians.
    #[must_use]
    pub const fn rotation(&self) -> [f32; 2] {
        self.rotation
    }

    /// Current animation clock in seconds.
    #[must_use]
    pub const fn clock(&self) -> f32 {
        self.clock
    }

    /// Field configuration.
    #[must_use]
    pub const fn config(&self) -> &ParticleFieldConfig {
        &self.config
    }

    /// Vertex data for GPU upload.
    #[must_use]
    pub fn vertices(&self) -> Vec<ParticleVertex> {
        self.particles.iter().map(ParticleVertex::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;

    fn field(count: usize) -> ParticleField {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        ParticleField::new(
            ParticleFieldConfig {
                particle_count: count,
                ..ParticleFieldConfig::default()
            },
            &mut rng,
        )
    }

    #[test]
    fn test_pool_size() {
        assert_eq!(field(100).len(), 100);
        assert!(field(0).is_empty());
    }

    #[test]
    fn test_positions_within_capped_sphere() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let field = ParticleField::new(
            ParticleFieldConfig {
                particle_count: 500,
                intensity: 10.0, // would exceed the cap without clamping
                ..ParticleFieldConfig::default()
            },
            &mut rng,
        );

        for p in field.particles() {
            let [x, y, z] = p.position;
            let r = (x * x + y * y + z * z).sqrt();
            assert!(r <= MAX_RADIUS + 1e-4, "particle at radius {r}");
        }
    }

    #[test]
    fn test_colors_in_unit_range() {
        for p in field(300).particles() {
            for channel in p.color {
                assert!((0.0..=1.0).contains(&channel));
            }
        }
    }

    #[test]
    fn test_sizes_within_sample_range() {
        for p in field(300).particles() {
            assert!((1.5..=4.0).contains(&p.size), "size {}", p.size);
        }
    }

    #[test]
    fn test_pattern_round_robin() {
        let field = field(6);
        let patterns: Vec<_> = field.particles().iter().map(|p| p.pattern).collect();
        assert_eq!(patterns[0], DriftPattern::Float);
        assert_eq!(patterns[1], DriftPattern::Pulse);
        assert_eq!(patterns[2], DriftPattern::Orbit);
        assert_eq!(patterns[3], DriftPattern::Float);
    }

    #[test]
    fn test_pointer_lerp_converges() {
        let mut field = field(10);
        field.set_pointer(1.0, 0.0);

        for _ in 0..200 {
            field.update(0.016);
        }

        // rotation[1] approaches nx * 0.3
        assert!((field.rotation()[1] - 0.3).abs() < 1e-3);
        assert!(field.rotation()[0].abs() < 1e-3);
    }

    #[test]
    fn test_pointer_clamped() {
        let mut field = field(10);
        field.set_pointer(5.0, -5.0);
        for _ in 0..300 {
            field.update(0.016);
        }
        assert!((field.rotation()[1] - 0.3).abs() < 1e-3);
        assert!((field.rotation()[0] + 0.3).abs() < 1e-3);
    }

    #[test]
    fn test_free_rotation_without_pointer() {
        let mut rng = StepRng::new(0, 1);
        let mut field = ParticleField::new(
            ParticleFieldConfig {
                particle_count: 10,
                pointer_tracking: false,
                ..ParticleFieldConfig::default()
            },
            &mut rng,
        );

        field.update(1.0);
        assert!((field.rotation()[1] - 0.05).abs() < 1e-5);
        field.update(1.0);
        assert!((field.rotation()[1] - 0.10).abs() < 1e-5);
    }

    #[test]
    fn test_clock_advances() {
        let mut field = field(1);
        field.update(0.5);
        field.update(0.25);
        assert!((field.clock() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_resize_rebuilds_pool() {
        let mut field = field(100);
        let mut rng = rand::rngs::StdRng::seed_from_u64(8);
        field.resize(40, &mut rng);
        assert_eq!(field.len(), 40);
    }

    #[test]
    fn test_displacement_is_bounded() {
        for pattern in [DriftPattern::Float, DriftPattern::Pulse, DriftPattern::Orbit] {
            for step in 0..100 {
                #[allow(clippy::cast_precision_loss)]
                let clock = step as f32 * 0.1;
                let [dx, dy, dz] = pattern.displacement(1.3, clock);
                assert!(dx.abs() <= 0.2 && dy.abs() <= 0.2 && dz.abs() <= 0.2);
            }
        }
    }

    #[test]
    fn test_vertex_conversion() {
        let field = field(3);
        let vertices = field.vertices();
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[0].position, field.particles()[0].position);
    }
}

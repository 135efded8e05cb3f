//! Procedural nebula synthesis.
//!
//! # Responsibility
//! - Populate a galaxy-shaped particle cloud with two visual roles:
//!   trajectory highlights and ambient fill.
//! - Produce a static spherical backdrop of background stars.
//! - Emit flat, upload-ready buffers.
//!
//! # Invariants
//! - Output buffers are immutable once built; regeneration replaces them
//!   wholesale.
//! - Generation never fails. An empty category list falls back to white.
//! - Output is a pure function of the config, the category colors and the
//!   random source.

use crate::config::FieldConfig;
use crate::field::trajectory::{generate_trajectories, Trajectory};
use crate::model::category::CategoryInfo;
use crate::model::color::Rgb;
use log::info;
use rand::Rng;
use std::f32::consts::{FRAC_PI_2, TAU};
use std::time::Instant;

const ARM_COUNT: usize = 3;
const ARM_SPREAD: f32 = 0.6;
const DISC_FLATTENING: f32 = 0.75;
const BASE_SCATTER: f32 = 0.5;
const SCATTER_PER_RADIUS: f32 = 0.08;
const AMBIENT_RADIUS_EXPONENT: f32 = 0.9;

/// Visual role of one nebula particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleRole {
    TrajectoryHighlight,
    AmbientFill,
}

/// One particle read back from the flat buffers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: [f32; 3],
    pub color: Rgb,
    pub brightness: f32,
    pub flicker_phase: f32,
    pub size: f32,
    pub role: ParticleRole,
}

/// Static backdrop on a spherical shell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackgroundStars {
    positions: Vec<f32>,
    brightness: Vec<f32>,
    sizes: Vec<f32>,
}

impl BackgroundStars {
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Interleaved `xyz` triples.
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn brightness(&self) -> &[f32] {
        &self.brightness
    }

    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }
}

/// Flat particle buffers ready for direct upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldBuffers {
    positions: Vec<f32>,
    colors: Vec<f32>,
    brightness: Vec<f32>,
    sizes: Vec<f32>,
    flicker_phases: Vec<f32>,
    roles: Vec<ParticleRole>,
    background: BackgroundStars,
}

impl FieldBuffers {
    fn with_capacity(particles: usize) -> Self {
        Self {
            positions: Vec::with_capacity(particles * 3),
            colors: Vec::with_capacity(particles * 3),
            brightness: Vec::with_capacity(particles),
            sizes: Vec::with_capacity(particles),
            flicker_phases: Vec::with_capacity(particles),
            roles: Vec::with_capacity(particles),
            background: BackgroundStars::default(),
        }
    }

    fn push(&mut self, particle: Particle) {
        self.positions.extend_from_slice(&particle.position);
        self.colors.extend_from_slice(&particle.color.to_array());
        self.brightness.push(particle.brightness);
        self.sizes.push(particle.size);
        self.flicker_phases.push(particle.flicker_phase);
        self.roles.push(particle.role);
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Interleaved `xyz` triples.
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Interleaved `rgb` triples.
    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    pub fn brightness(&self) -> &[f32] {
        &self.brightness
    }

    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    pub fn flicker_phases(&self) -> &[f32] {
        &self.flicker_phases
    }

    pub fn roles(&self) -> &[ParticleRole] {
        &self.roles
    }

    pub fn background(&self) -> &BackgroundStars {
        &self.background
    }

    pub fn highlight_count(&self) -> usize {
        self.roles
            .iter()
            .filter(|role| **role == ParticleRole::TrajectoryHighlight)
            .count()
    }

    pub fn particle(&self, index: usize) -> Option<Particle> {
        let role = *self.roles.get(index)?;
        let base = index * 3;
        Some(Particle {
            position: [
                self.positions[base],
                self.positions[base + 1],
                self.positions[base + 2],
            ],
            color: Rgb::new(
                self.colors[base],
                self.colors[base + 1],
                self.colors[base + 2],
            ),
            brightness: self.brightness[index],
            flicker_phase: self.flicker_phases[index],
            size: self.sizes[index],
            role,
        })
    }

    pub fn particles(&self) -> impl Iterator<Item = Particle> + '_ {
        (0..self.len()).filter_map(move |index| self.particle(index))
    }
}

/// Synthesizes nebula fields from a [`FieldConfig`].
#[derive(Debug, Clone, Default)]
pub struct FieldGenerator {
    config: FieldConfig,
}

impl FieldGenerator {
    pub fn new(config: FieldConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Builds a complete field for the given category colors.
    ///
    /// Fresh trajectories are drawn on every call, so layout is not stable
    /// across regenerations.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        categories: &[CategoryInfo],
    ) -> FieldBuffers {
        let started_at = Instant::now();
        let palette: Vec<Rgb> = categories.iter().map(|category| category.color).collect();
        let trajectories = generate_trajectories(rng, self.config.trajectory_count);

        let mut buffers = FieldBuffers::with_capacity(self.config.particle_count);
        for index in 0..self.config.particle_count {
            let color = palette_color(&palette, index);
            let roll = rng.gen::<f32>();
            let particle = if roll < self.config.highlight_probability && !trajectories.is_empty() {
                let trajectory = &trajectories[index % trajectories.len()];
                self.trajectory_particle(rng, trajectory, color)
            } else {
                self.ambient_particle(rng, color)
            };
            buffers.push(particle);
        }
        buffers.background = self.background_stars(rng);

        info!(
            "event=field_generate module=field status=ok particles={} highlights={} background={} categories={} duration_ms={}",
            buffers.len(),
            buffers.highlight_count(),
            buffers.background.len(),
            categories.len(),
            started_at.elapsed().as_millis()
        );
        buffers
    }

    fn trajectory_particle<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        trajectory: &Trajectory,
        category_color: Rgb,
    ) -> Particle {
        let sample = trajectory.sample(rng);
        let (color, brightness, size) = if sample.segment_mask > self.config.segment_threshold {
            (
                Rgb::WHITE,
                rng.gen_range(1.2f32..1.6),
                rng.gen_range(0.35f32..0.6),
            )
        } else {
            (
                category_color,
                rng.gen_range(0.15f32..0.35),
                rng.gen_range(0.08f32..0.2),
            )
        };

        Particle {
            position: sample.position,
            color,
            brightness,
            flicker_phase: rng.gen_range(0.0..TAU),
            size,
            role: ParticleRole::TrajectoryHighlight,
        }
    }

    fn ambient_particle<R: Rng + ?Sized>(&self, rng: &mut R, color: Rgb) -> Particle {
        let max_radius = self.config.ambient_max_radius;
        let radius = rng.gen::<f32>().powf(AMBIENT_RADIUS_EXPONENT) * max_radius;

        let arm = rng.gen_range(0..ARM_COUNT);
        let base_angle =
            arm as f32 * TAU / ARM_COUNT as f32 + rng.gen_range(-ARM_SPREAD..ARM_SPREAD);
        let angle = base_angle + radius * self.config.spiral_shear;

        let scatter = BASE_SCATTER + radius * SCATTER_PER_RADIUS;
        let x = angle.cos() * radius + rng.gen_range(-scatter..scatter);
        let z = angle.sin() * radius * DISC_FLATTENING + rng.gen_range(-scatter..scatter);

        let taper = ((radius / max_radius).min(1.0) * FRAC_PI_2).cos();
        let y = rng.gen_range(-1.0f32..1.0) * self.config.disc_half_thickness * taper;

        let size = 0.1 + rng.gen::<f32>().powi(3) * 0.35;
        Particle {
            position: [x, y, z],
            color,
            brightness: rng.gen_range(0.4..1.0),
            flicker_phase: rng.gen_range(0.0..TAU),
            size,
            role: ParticleRole::AmbientFill,
        }
    }

    fn background_stars<R: Rng + ?Sized>(&self, rng: &mut R) -> BackgroundStars {
        let count = self.config.background_star_count;
        let radius = self.config.background_radius;
        let mut stars = BackgroundStars {
            positions: Vec::with_capacity(count * 3),
            brightness: Vec::with_capacity(count),
            sizes: Vec::with_capacity(count),
        };

        for _ in 0..count {
            // Uniform on the sphere: uniform height, uniform azimuth.
            let height: f32 = rng.gen_range(-1.0..=1.0);
            let azimuth = rng.gen_range(0.0..TAU);
            let ring = (1.0 - height * height).max(0.0).sqrt();
            stars.positions.extend_from_slice(&[
                radius * ring * azimuth.cos(),
                radius * height,
                radius * ring * azimuth.sin(),
            ]);
            stars.brightness.push(rng.gen_range(0.3..1.0));
            stars.sizes.push(rng.gen_range(0.5..1.5));
        }
        stars
    }
}

fn palette_color(palette: &[Rgb], index: usize) -> Rgb {
    if palette.is_empty() {
        Rgb::WHITE
    } else {
        palette[index % palette.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::{palette_color, FieldGenerator, ParticleRole};
    use crate::config::FieldConfig;
    use crate::model::color::Rgb;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn small_config() -> FieldConfig {
        FieldConfig {
            particle_count: 2_000,
            background_star_count: 200,
            ..FieldConfig::default()
        }
    }

    #[test]
    fn palette_falls_back_to_white() {
        assert_eq!(palette_color(&[], 5), Rgb::WHITE);
        let palette = [Rgb::from_u8(1, 2, 3), Rgb::from_u8(4, 5, 6)];
        assert_eq!(palette_color(&palette, 3), palette[1]);
    }

    #[test]
    fn buffers_have_consistent_lengths() {
        let generator = FieldGenerator::new(small_config());
        let field = generator.generate(&mut ChaCha8Rng::seed_from_u64(1), &[]);
        assert_eq!(field.len(), 2_000);
        assert_eq!(field.positions().len(), 6_000);
        assert_eq!(field.colors().len(), 6_000);
        assert_eq!(field.sizes().len(), 2_000);
        assert_eq!(field.flicker_phases().len(), 2_000);
        assert_eq!(field.background().len(), 200);
        assert_eq!(field.background().positions().len(), 600);
    }

    #[test]
    fn ambient_sizes_follow_cubic_range() {
        let generator = FieldGenerator::new(small_config());
        let field = generator.generate(&mut ChaCha8Rng::seed_from_u64(2), &[]);
        for particle in field
            .particles()
            .filter(|p| p.role == ParticleRole::AmbientFill)
        {
            assert!((0.1..=0.45).contains(&particle.size));
            assert!((0.4..1.0).contains(&particle.brightness));
        }
    }

    #[test]
    fn background_sits_on_the_shell() {
        let generator = FieldGenerator::new(small_config());
        let field = generator.generate(&mut ChaCha8Rng::seed_from_u64(3), &[]);
        let radius = generator.config().background_radius;
        for xyz in field.background().positions().chunks_exact(3) {
            let distance = (xyz[0] * xyz[0] + xyz[1] * xyz[1] + xyz[2] * xyz[2]).sqrt();
            assert!((distance - radius).abs() < 0.01 * radius);
        }
    }

    #[test]
    fn zero_highlight_probability_yields_only_ambient() {
        let generator = FieldGenerator::new(FieldConfig {
            highlight_probability: 0.0,
            ..small_config()
        });
        let field = generator.generate(&mut ChaCha8Rng::seed_from_u64(4), &[]);
        assert_eq!(field.highlight_count(), 0);
    }
}

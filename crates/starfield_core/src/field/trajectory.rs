//! Parametric orbital curves that bias highlight-particle placement.
//!
//! Trajectories are throwaway generation inputs: they are produced right
//! before a field is synthesized and dropped right after.

use rand::Rng;
use std::f32::consts::TAU;
use std::ops::Range;

const RADIUS_RANGE: Range<f32> = 18.0..50.0;
const TILT_RANGE: Range<f32> = -0.225..0.225;
const DRIFT_FREQUENCY_RANGE: Range<f32> = 0.5..1.0;
const DRIFT_AMPLITUDE_RANGE: Range<f32> = 1.0..4.0;
const SEGMENT_FREQUENCY_RANGE: Range<f32> = 2.0..6.0;

const POSITION_JITTER: f32 = 0.4;
const VERTICAL_JITTER: f32 = 0.3;
const VERTICAL_WAVE_SCALE: f32 = 4.0;

/// One orbital curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trajectory {
    pub radius_x: f32,
    pub radius_z: f32,
    pub tilt_x: f32,
    pub tilt_z: f32,
    pub tilt_y: f32,
    pub drift_frequency: f32,
    pub drift_amplitude: f32,
    pub segment_frequency: f32,
    pub segment_phase_offset: f32,
}

/// Sampled point on a trajectory plus its segment mask value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySample {
    pub position: [f32; 3],
    /// `sin(angle * segment_frequency + segment_phase_offset)`, in `[-1, 1]`.
    pub segment_mask: f32,
}

impl Trajectory {
    /// Draws one trajectory with every parameter independently randomized.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            radius_x: rng.gen_range(RADIUS_RANGE),
            radius_z: rng.gen_range(RADIUS_RANGE),
            tilt_x: rng.gen_range(TILT_RANGE),
            tilt_z: rng.gen_range(TILT_RANGE),
            tilt_y: rng.gen_range(TILT_RANGE),
            drift_frequency: rng.gen_range(DRIFT_FREQUENCY_RANGE),
            drift_amplitude: rng.gen_range(DRIFT_AMPLITUDE_RANGE),
            segment_frequency: rng.gen_range(SEGMENT_FREQUENCY_RANGE),
            segment_phase_offset: rng.gen_range(0.0..TAU),
        }
    }

    /// Samples a jittered point at a uniformly random angle.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> TrajectorySample {
        let angle = rng.gen_range(0.0..TAU);
        let drift = (angle * self.drift_frequency).sin() * self.drift_amplitude;

        let x = angle.cos() * (self.radius_x + drift) + jitter(rng, POSITION_JITTER);
        let z = angle.sin() * (self.radius_z + drift) + jitter(rng, POSITION_JITTER);
        let y = x * self.tilt_x
            + z * self.tilt_z
            + (angle * 2.0).sin() * self.tilt_y * VERTICAL_WAVE_SCALE
            + jitter(rng, VERTICAL_JITTER);

        TrajectorySample {
            position: [x, y, z],
            segment_mask: (angle * self.segment_frequency + self.segment_phase_offset).sin(),
        }
    }
}

/// Produces `count` independent trajectories.
pub fn generate_trajectories<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<Trajectory> {
    (0..count).map(|_| Trajectory::random(rng)).collect()
}

fn jitter<R: Rng + ?Sized>(rng: &mut R, half_width: f32) -> f32 {
    rng.gen_range(-half_width..half_width)
}

#[cfg(test)]
mod tests {
    use super::{generate_trajectories, RADIUS_RANGE, TILT_RANGE};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn parameters_stay_in_declared_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let trajectories = generate_trajectories(&mut rng, 64);
        assert_eq!(trajectories.len(), 64);
        for t in &trajectories {
            assert!(RADIUS_RANGE.contains(&t.radius_x));
            assert!(RADIUS_RANGE.contains(&t.radius_z));
            assert!(TILT_RANGE.contains(&t.tilt_x));
            assert!(TILT_RANGE.contains(&t.tilt_y));
            assert!((0.5..1.0).contains(&t.drift_frequency));
        }
    }

    #[test]
    fn samples_stay_near_the_orbit() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let trajectory = generate_trajectories(&mut rng, 1)[0];
        let outer = trajectory.radius_x.max(trajectory.radius_z) + trajectory.drift_amplitude + 1.0;
        for _ in 0..500 {
            let sample = trajectory.sample(&mut rng);
            let [x, _, z] = sample.position;
            assert!((x * x + z * z).sqrt() <= outer);
            assert!((-1.0..=1.0).contains(&sample.segment_mask));
        }
    }

    #[test]
    fn same_seed_same_trajectories() {
        let a = generate_trajectories(&mut ChaCha8Rng::seed_from_u64(3), 7);
        let b = generate_trajectories(&mut ChaCha8Rng::seed_from_u64(3), 7);
        assert_eq!(a, b);
    }
}

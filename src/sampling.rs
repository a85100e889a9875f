use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::{PI, TAU};

const UNIT_SCALE: f32 = 1.0 / (1u32 << 24) as f32;

/// Maps the unit square onto the sphere with `theta = 2πu`, `phi = πv`.
pub fn plane_to_sphere(uv: Vec2) -> Vec3 {
    let theta = uv.x * TAU;
    let phi = uv.y * PI;
    let (sin_theta, cos_theta) = theta.sin_cos();
    let (sin_phi, cos_phi) = phi.sin_cos();
    Vec3::new(cos_theta * sin_phi, sin_theta * sin_phi, cos_phi)
}

/// Inverse of [`plane_to_sphere`] for unit directions.
pub fn sphere_to_plane(dir: Vec3) -> Vec2 {
    let mut theta = dir.y.atan2(dir.x);
    if theta < 0.0 {
        theta += TAU;
    }
    let phi = Vec2::new(dir.x, dir.y).length().atan2(dir.z);
    Vec2::new(theta / TAU, phi / PI)
}

/// Deterministic 2D Sobol (0,2)-sequence with optional XOR scrambling.
///
/// The first dimension is the base-2 radical inverse and the second uses the
/// direction numbers of the second Sobol dimension. Two samplers built with
/// the same scramble always produce the same points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SobolSampler {
    index: u32,
    scramble: [u32; 2],
}

impl SobolSampler {
    pub fn new() -> Self {
        Self::with_scramble([0, 0])
    }

    pub fn with_scramble(scramble: [u32; 2]) -> Self {
        Self { index: 0, scramble }
    }

    pub fn seeded(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::with_scramble([rng.gen(), rng.gen()])
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn scramble(&self) -> [u32; 2] {
        self.scramble
    }

    /// Current point, each component in `[0, 1)`.
    pub fn get_2d(&self) -> Vec2 {
        let u = radical_inverse_base2(self.index) ^ self.scramble[0];
        let v = sobol_second_dimension(self.index) ^ self.scramble[1];
        Vec2::new(to_unit(u), to_unit(v))
    }

    pub fn next_sample(&mut self) {
        self.index = self.index.wrapping_add(1);
    }
}

impl Default for SobolSampler {
    fn default() -> Self {
        Self::new()
    }
}

fn radical_inverse_base2(index: u32) -> u32 {
    index.reverse_bits()
}

fn sobol_second_dimension(mut index: u32) -> u32 {
    let mut result = 0u32;
    let mut direction = 1u32 << 31;
    while index != 0 {
        if index & 1 != 0 {
            result ^= direction;
        }
        index >>= 1;
        direction ^= direction >> 1;
    }
    result
}

fn to_unit(bits: u32) -> f32 {
    (bits >> 8) as f32 * UNIT_SCALE
}

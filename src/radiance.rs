use crate::basis::{BASIS_COUNT, BASIS_DIRECTIONS};
use crate::lobe::eval_lobe;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Anything that can be queried for linear RGB radiance along a unit direction.
pub trait RadianceSource: Sync {
    fn radiance(&self, direction: Vec3) -> Vec3;
}

impl<F> RadianceSource for F
where
    F: Fn(Vec3) -> Vec3 + Sync,
{
    fn radiance(&self, direction: Vec3) -> Vec3 {
        self(direction)
    }
}

/// Per-lobe RGB weights of a fitted environment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoefficientSet {
    coefficients: [Vec3; BASIS_COUNT],
}

impl CoefficientSet {
    pub fn new(coefficients: [Vec3; BASIS_COUNT]) -> Self {
        Self { coefficients }
    }

    /// Rebuilds the per-lobe layout from one coefficient column per channel.
    pub fn from_channels(channels: [[f32; BASIS_COUNT]; 3]) -> Self {
        let coefficients =
            std::array::from_fn(|i| Vec3::new(channels[0][i], channels[1][i], channels[2][i]));
        Self { coefficients }
    }

    pub fn get(&self, index: usize) -> Vec3 {
        self.coefficients[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.coefficients.iter().copied()
    }

    pub fn channel(&self, channel: usize) -> [f32; BASIS_COUNT] {
        std::array::from_fn(|i| self.coefficients[i][channel])
    }

    /// Contribution of a single weighted lobe towards `direction`.
    pub fn lobe_response(&self, index: usize, direction: Vec3) -> Vec3 {
        self.coefficients[index] * eval_lobe(BASIS_DIRECTIONS[index], direction)
    }

    pub fn evaluate(&self, direction: Vec3) -> Vec3 {
        let mut result = Vec3::ZERO;
        for (coefficient, lobe) in self.coefficients.iter().zip(BASIS_DIRECTIONS.iter()) {
            result += *coefficient * eval_lobe(*lobe, direction);
        }
        result
    }
}

impl RadianceSource for CoefficientSet {
    fn radiance(&self, direction: Vec3) -> Vec3 {
        self.evaluate(direction)
    }
}

pub fn evaluate(coefficients: &CoefficientSet, direction: Vec3) -> Vec3 {
    coefficients.evaluate(direction)
}

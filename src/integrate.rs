use crate::error::FitError;
use crate::sampling::{plane_to_sphere, SobolSampler};
use glam::Vec3;
use std::f32::consts::FRAC_1_PI;

/// One point of the integration sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub index: u32,
    pub direction: Vec3,
}

/// Monte-Carlo estimator of `∫ f(ω) g(ω) dω` over the sphere.
///
/// Every call replays the same low-discrepancy sequence from its start, so
/// two integrals computed by the same integrator share their sample set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Integrator {
    sample_count: u32,
    scramble: [u32; 2],
}

impl Integrator {
    pub fn new(sample_count: u32) -> Result<Self, FitError> {
        if sample_count == 0 {
            return Err(FitError::ZeroSamples);
        }
        Ok(Self { sample_count, scramble: [0, 0] })
    }

    /// Scrambles the sequence from `seed`; `None` keeps the plain sequence.
    pub fn with_seed(self, seed: Option<u64>) -> Self {
        let scramble = seed.map(|seed| SobolSampler::seeded(seed).scramble()).unwrap_or([0, 0]);
        Self { scramble, ..self }
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn sampler(&self) -> SobolSampler {
        SobolSampler::with_scramble(self.scramble)
    }

    /// Weight applied to every sample product.
    pub fn sample_weight(&self) -> f32 {
        (1.0 / self.sample_count as f32) * 0.25 * FRAC_1_PI
    }

    pub fn samples(&self) -> Samples {
        Samples { sampler: self.sampler(), remaining: self.sample_count }
    }

    pub fn integrate<F, G>(&self, f: F, g: G) -> f32
    where
        F: Fn(Vec3) -> f32,
        G: Fn(Vec3) -> f32,
    {
        let weight = self.sample_weight();
        let mut sum = 0.0f32;
        for sample in self.samples() {
            sum += f(sample.direction) * g(sample.direction) * weight;
        }
        sum
    }
}

pub struct Samples {
    sampler: SobolSampler,
    remaining: u32,
}

impl Iterator for Samples {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let sample =
            Sample { index: self.sampler.index(), direction: plane_to_sphere(self.sampler.get_2d()) };
        self.sampler.next_sample();
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Samples {}

pub fn integrate<F, G>(sample_count: u32, f: F, g: G) -> Result<f32, FitError>
where
    F: Fn(Vec3) -> f32,
    G: Fn(Vec3) -> f32,
{
    Ok(Integrator::new(sample_count)?.integrate(f, g))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::BASIS_DIRECTIONS;
    use crate::lobe::eval_lobe;

    #[test]
    fn rejects_zero_samples() {
        assert_eq!(Integrator::new(0), Err(FitError::ZeroSamples));
        assert!(integrate(0, |_| 1.0, |_| 1.0).is_err());
    }

    #[test]
    fn constant_integrand_matches_normalisation() {
        let value = integrate(4096, |_| 1.0, |_| 1.0).expect("integrate");
        assert!((value - 0.25 * FRAC_1_PI).abs() < 1e-4);
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        let integrator = Integrator::new(8192).expect("integrator");
        let lobe = BASIS_DIRECTIONS[5];
        let f = |w: Vec3| w.z * w.z + 0.5;
        let first = integrator.integrate(f, |w| eval_lobe(lobe, w));
        let second = integrator.integrate(f, |w| eval_lobe(lobe, w));
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn integrand_order_does_not_matter() {
        let integrator = Integrator::new(2048).expect("integrator");
        let a = |w: Vec3| eval_lobe(BASIS_DIRECTIONS[0], w);
        let b = |w: Vec3| eval_lobe(BASIS_DIRECTIONS[4], w);
        let ab = integrator.integrate(a, b);
        let ba = integrator.integrate(b, a);
        assert!((ab - ba).abs() <= f32::EPSILON * ab.abs());
    }

    #[test]
    fn samples_iterate_exactly_n_unit_directions() {
        let integrator = Integrator::new(300).expect("integrator").with_seed(Some(3));
        let samples: Vec<Sample> = integrator.samples().collect();
        assert_eq!(samples.len(), 300);
        for (i, sample) in samples.iter().enumerate() {
            assert_eq!(sample.index, i as u32);
            assert!((sample.direction.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn seed_changes_the_sequence() {
        let plain = Integrator::new(16).expect("integrator");
        let scrambled = plain.with_seed(Some(11));
        let a: Vec<Vec3> = plain.samples().map(|s| s.direction).collect();
        let b: Vec<Vec3> = scrambled.samples().map(|s| s.direction).collect();
        assert_ne!(a, b);
        assert_eq!(scrambled.with_seed(None), plain);
    }
}

//! Least-squares fit of the lobe basis to a radiance source.
//!
//! The fit solves the normal equations `G c = b` per colour channel, where
//! `G[i][j] = <lobe_i, lobe_j>` and `b[i] = <signal, lobe_i>` are estimated by
//! the same Monte-Carlo integrator. The Gram matrix does not depend on the
//! signal, so it is assembled once and shared by the three channel solves.

use crate::basis::{BASIS_COUNT, BASIS_DIRECTIONS};
use crate::error::FitError;
use crate::integrate::Integrator;
use crate::lobe::eval_lobe;
use crate::radiance::{CoefficientSet, RadianceSource};
use log::{debug, info, warn};
use nalgebra::{SMatrix, SVector};
use rayon::prelude::*;
use std::time::Instant;

pub type GramMatrix = SMatrix<f32, BASIS_COUNT, BASIS_COUNT>;
pub type ProjectionVector = SVector<f32, BASIS_COUNT>;

pub const DEFAULT_SAMPLE_COUNT: u32 = 65_536;
pub const DEFAULT_MAX_CONDITION: f32 = 1.0e4;

/// Diagnostics describing how well-posed a fit was.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitReport {
    pub sample_count: u32,
    /// Ratio of the largest to the smallest Gram eigenvalue.
    pub condition: f32,
    /// `|G c - b| / |b|` for each channel.
    pub residuals: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    pub coefficients: CoefficientSet,
    pub report: FitReport,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    integrator: Integrator,
    max_condition: f32,
    parallel: bool,
}

impl Projector {
    pub fn new(integrator: Integrator) -> Self {
        Self { integrator, max_condition: DEFAULT_MAX_CONDITION, parallel: true }
    }

    pub fn with_max_condition(self, max_condition: f32) -> Self {
        Self { max_condition, ..self }
    }

    pub fn with_parallel(self, parallel: bool) -> Self {
        Self { parallel, ..self }
    }

    pub fn integrator(&self) -> &Integrator {
        &self.integrator
    }

    pub fn gram_matrix(&self) -> GramMatrix {
        let pairs: Vec<(usize, usize)> =
            (0..BASIS_COUNT).flat_map(|i| (i..BASIS_COUNT).map(move |j| (i, j))).collect();
        let integrator = self.integrator;
        let values = evaluate_cells(&pairs, self.parallel, |&(i, j)| {
            integrator.integrate(
                |w| eval_lobe(BASIS_DIRECTIONS[i], w),
                |w| eval_lobe(BASIS_DIRECTIONS[j], w),
            )
        });
        let mut gram = GramMatrix::zeros();
        for (&(i, j), value) in pairs.iter().zip(values) {
            gram[(i, j)] = value;
            gram[(j, i)] = value;
        }
        gram
    }

    pub fn projection_vectors<S>(&self, signal: &S) -> [ProjectionVector; 3]
    where
        S: RadianceSource + ?Sized,
    {
        let cells: Vec<(usize, usize)> =
            (0..3).flat_map(|channel| (0..BASIS_COUNT).map(move |i| (channel, i))).collect();
        let integrator = self.integrator;
        let values = evaluate_cells(&cells, self.parallel, |&(channel, i)| {
            integrator.integrate(|w| signal.radiance(w)[channel], |w| eval_lobe(BASIS_DIRECTIONS[i], w))
        });
        let mut vectors = [ProjectionVector::zeros(); 3];
        for (&(channel, i), value) in cells.iter().zip(values) {
            vectors[channel][i] = value;
        }
        vectors
    }

    pub fn project<S>(&self, signal: &S) -> Result<Fit, FitError>
    where
        S: RadianceSource + ?Sized,
    {
        let started = Instant::now();
        info!(
            "fitting {BASIS_COUNT} lobes with {} samples per integral{}",
            self.integrator.sample_count(),
            if self.parallel { " (parallel)" } else { "" }
        );
        let gram = self.gram_matrix();
        let projections = self.projection_vectors(signal);
        if projections.iter().any(|b| b.iter().any(|value| !value.is_finite())) {
            warn!("projection contains non-finite values; the source radiance is not finite everywhere");
        }
        let fit = solve(&gram, &projections, self.max_condition, self.integrator.sample_count())?;
        info!(
            "fit finished in {:.2?} (condition {:.3}, residuals {:.3e}/{:.3e}/{:.3e})",
            started.elapsed(),
            fit.report.condition,
            fit.report.residuals[0],
            fit.report.residuals[1],
            fit.report.residuals[2]
        );
        Ok(fit)
    }
}

/// Fits `signal` with `sample_count` samples per integral and default settings.
pub fn project<S>(sample_count: u32, signal: &S) -> Result<Fit, FitError>
where
    S: RadianceSource + ?Sized,
{
    Projector::new(Integrator::new(sample_count)?).project(signal)
}

/// Largest over smallest eigenvalue; infinite when the matrix is not positive definite.
pub fn condition_estimate(gram: &GramMatrix) -> f32 {
    let eigenvalues = gram.symmetric_eigenvalues();
    let smallest = eigenvalues.iter().copied().fold(f32::INFINITY, f32::min);
    let largest = eigenvalues.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if smallest <= 0.0 || !smallest.is_finite() {
        return f32::INFINITY;
    }
    largest / smallest
}

/// Solves `gram * c = b` for each channel via Cholesky after checking conditioning.
pub fn solve(
    gram: &GramMatrix,
    projections: &[ProjectionVector; 3],
    max_condition: f32,
    sample_count: u32,
) -> Result<Fit, FitError> {
    let condition = condition_estimate(gram);
    // NaN must fail this check too.
    if !(condition <= max_condition) {
        return Err(FitError::IllConditioned { condition, limit: max_condition });
    }
    let cholesky = gram.cholesky().ok_or(FitError::Singular)?;

    let mut channels = [[0.0f32; BASIS_COUNT]; 3];
    let mut residuals = [0.0f32; 3];
    for (channel, b) in projections.iter().enumerate() {
        let c = cholesky.solve(b);
        let residual = (gram * c - b).norm();
        let scale = b.norm();
        residuals[channel] = if scale > 0.0 { residual / scale } else { residual };
        debug!("channel {channel}: relative residual {:.3e}", residuals[channel]);
        channels[channel].copy_from_slice(c.as_slice());
    }

    Ok(Fit {
        coefficients: CoefficientSet::from_channels(channels),
        report: FitReport { sample_count, condition, residuals },
    })
}

fn evaluate_cells<T, F>(cells: &[T], parallel: bool, eval: F) -> Vec<f32>
where
    T: Sync,
    F: Fn(&T) -> f32 + Sync + Send,
{
    if parallel {
        cells.par_iter().map(&eval).collect()
    } else {
        cells.iter().map(&eval).collect()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FitError {
    #[error("sample count must be at least 1")]
    ZeroSamples,
    #[error("gram matrix is ill-conditioned: condition estimate {condition:.3e} exceeds limit {limit:.3e}")]
    IllConditioned { condition: f32, limit: f32 },
    #[error("gram matrix is not positive definite")]
    Singular,
}

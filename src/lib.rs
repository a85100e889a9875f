//! Fits a 12-lobe spherical basis to environment maps.
//!
//! The basis lobes sit on the vertices of a regular icosahedron. A fit
//! projects the environment onto every lobe with a deterministic Monte-Carlo
//! integrator and solves the resulting normal equations per colour channel.

pub mod app;
pub mod basis;
pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod integrate;
pub mod lobe;
pub mod projection;
pub mod radiance;
pub mod sampling;

pub use basis::{nearest_six, BASIS_COUNT, BASIS_DIRECTIONS};
pub use environment::EnvironmentMap;
pub use error::FitError;
pub use integrate::{integrate, Integrator};
pub use lobe::eval_lobe;
pub use projection::{project, Fit, FitReport, Projector};
pub use radiance::{evaluate, CoefficientSet, RadianceSource};

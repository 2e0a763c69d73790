//! Error types for curve construction and simulation setup.

use thiserror::Error;

/// Rejected construction input.
///
/// Queries and simulation steps never fail; only building a curve, a roll
/// curve or validating simulation parameters reports these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInput {
    #[error("no control points supplied")]
    NoControlPoints,

    #[error("resolution must be positive and finite, got {0}")]
    InvalidResolution(f64),

    #[error("control point {index} has a non-finite coordinate")]
    NonFiniteControlPoint { index: usize },

    #[error("control point {index} has non-positive weight {weight}")]
    InvalidWeight { index: usize, weight: f64 },

    #[error("roll point {index} has a non-finite value")]
    NonFiniteRollPoint { index: usize },

    #[error("max delta time must be positive and finite, got {0}")]
    InvalidMaxDeltaTime(f64),
}

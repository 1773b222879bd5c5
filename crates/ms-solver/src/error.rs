//! Error types for solver operations.

use ms_core::CoreError;
use thiserror::Error;

/// Errors that can occur while building operators, packing registries or
/// running a root finder.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Configuration error: {what}")]
    Configuration { what: String },

    #[error("Convergence failed: {what}")]
    ConvergenceFailed { what: String },

    #[error("Numerical domain error: {what}")]
    NumericalDomain { what: String },

    #[error("Evaluation failed: {what}")]
    Evaluation { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<CoreError> for SolverError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::NonFinite { .. } => SolverError::NumericalDomain {
                what: e.to_string(),
            },
            CoreError::InvalidArg { .. } => SolverError::Configuration {
                what: e.to_string(),
            },
        }
    }
}

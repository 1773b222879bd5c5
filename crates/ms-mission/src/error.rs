//! Error types for segment and mission operations.

use ms_core::CoreError;
use ms_solver::SolverError;
use thiserror::Error;

/// Errors that abort a segment solve.
///
/// Non-convergence is deliberately absent: a segment that fails to converge
/// is reported through [`crate::SegmentOutcome::Failed`], not as an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MissionError {
    #[error("Configuration error: {what}")]
    Configuration { what: String },

    #[error("Numerical domain error: {what}")]
    NumericalDomain { what: String },

    #[error("Contributor '{tag}' failed: {what}")]
    Contributor { tag: String, what: String },

    #[error("Solver error: {what}")]
    Solver { what: String },
}

pub type MissionResult<T> = Result<T, MissionError>;

impl MissionError {
    pub fn configuration(what: impl Into<String>) -> Self {
        MissionError::Configuration { what: what.into() }
    }
}

impl From<SolverError> for MissionError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::Configuration { what } => MissionError::Configuration { what },
            SolverError::NumericalDomain { what } => MissionError::NumericalDomain { what },
            SolverError::ConvergenceFailed { what } | SolverError::Evaluation { what } => {
                MissionError::Solver { what }
            }
        }
    }
}

impl From<MissionError> for SolverError {
    fn from(e: MissionError) -> Self {
        match e {
            MissionError::Configuration { what } => SolverError::Configuration { what },
            MissionError::NumericalDomain { what } => SolverError::NumericalDomain { what },
            other => SolverError::Evaluation {
                what: other.to_string(),
            },
        }
    }
}

impl From<CoreError> for MissionError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::NonFinite { .. } => MissionError::NumericalDomain {
                what: e.to_string(),
            },
            CoreError::InvalidArg { .. } => MissionError::Configuration {
                what: e.to_string(),
            },
        }
    }
}

//! Error types for the ms-app service layer.

use std::path::PathBuf;

/// Application error type wrapping the errors of the backend crates.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Mission file error: {0}")]
    Config(String),

    #[error("Failed to write summary file: {path}")]
    SummaryWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read summary file: {path}")]
    SummaryRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Mission validation failed: {0}")]
    Validation(String),

    #[error("Unsupported mission file: {path}")]
    UnsupportedFile { path: PathBuf },

    #[error("Component '{id}' could not be built: {message}")]
    Component { id: String, message: String },

    #[error("Mission error: {0}")]
    Mission(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for ms-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<ms_config::ConfigError> for AppError {
    fn from(err: ms_config::ConfigError) -> Self {
        match err {
            ms_config::ConfigError::Validation(e) => AppError::Validation(e.to_string()),
            other => AppError::Config(other.to_string()),
        }
    }
}

impl From<ms_config::ValidationError> for AppError {
    fn from(err: ms_config::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<ms_mission::MissionError> for AppError {
    fn from(err: ms_mission::MissionError) -> Self {
        AppError::Mission(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

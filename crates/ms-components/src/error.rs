//! Error types for component operations.

use ms_mission::MissionError;
use thiserror::Error;

/// Errors raised while building or evaluating a component.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type ComponentResult<T> = Result<T, ComponentError>;

impl From<ComponentError> for MissionError {
    fn from(e: ComponentError) -> Self {
        match e {
            ComponentError::NonPhysical { .. } => MissionError::NumericalDomain {
                what: e.to_string(),
            },
            ComponentError::InvalidArg { .. } => MissionError::Configuration {
                what: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ComponentError::NonPhysical { what: "density" };
        assert!(err.to_string().contains("density"));
    }

    #[test]
    fn error_conversion() {
        let err: MissionError = ComponentError::InvalidArg { what: "test" }.into();
        assert!(matches!(err, MissionError::Configuration { .. }));
        let err: MissionError = ComponentError::NonPhysical { what: "test" }.into();
        assert!(matches!(err, MissionError::NumericalDomain { .. }));
    }
}

//! Cognita replay tool error types.

use cognita_core::error::DomainError;
use thiserror::Error;

/// Startup and runtime errors for the replay tool.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The flow document could not be read.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The flow document is not valid YAML or JSON for its shape.
    #[error("flow document error: {0}")]
    Parse(String),

    /// A core operation failed.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl AppError {
    /// Machine-readable error code, printed alongside the message on exit.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "config_error",
            Self::Io(_) => "io_error",
            Self::Parse(_) => "parse_error",
            Self::Domain(DomainError::AggregateNotFound(_)) => "aggregate_not_found",
            Self::Domain(DomainError::ConcurrencyConflict { .. }) => "concurrency_conflict",
            Self::Domain(DomainError::Validation(_)) => "validation_error",
            Self::Domain(DomainError::FlowState(_)) => "flow_state_error",
            Self::Domain(DomainError::SessionState(_)) => "session_state_error",
            Self::Domain(DomainError::Infrastructure(_)) => "infrastructure_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cognita_core::error::{FlowStateError, SessionStateError};
    use uuid::Uuid;

    #[test]
    fn test_domain_errors_map_to_stable_codes() {
        assert_eq!(
            AppError::from(DomainError::AggregateNotFound(Uuid::new_v4())).code(),
            "aggregate_not_found"
        );
        assert_eq!(
            AppError::from(DomainError::from(FlowStateError::EmptyFlow)).code(),
            "flow_state_error"
        );
        assert_eq!(
            AppError::from(DomainError::from(SessionStateError::SessionClosed)).code(),
            "session_state_error"
        );
        assert_eq!(
            AppError::from(DomainError::Infrastructure("down".into())).code(),
            "infrastructure_error"
        );
    }

    #[test]
    fn test_domain_error_message_is_passed_through() {
        let err = AppError::from(DomainError::from(SessionStateError::SessionClosed));

        assert_eq!(err.to_string(), "session state error: session is closed");
    }

    #[test]
    fn test_config_error_message_names_the_problem() {
        let err = AppError::Config("COGNITA_FLOW_FILE must be set".into());

        assert_eq!(err.code(), "config_error");
        assert_eq!(
            err.to_string(),
            "configuration error: COGNITA_FLOW_FILE must be set"
        );
    }
}

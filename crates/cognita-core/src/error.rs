//! Domain error types.
//!
//! Three families of errors exist and they are handled differently:
//!
//! - [`ValidationError`] rejects a single untrusted content record. It is
//!   always recoverable by discarding that record.
//! - [`FlowStateError`] and [`SessionStateError`] report a caller breaking
//!   a state-machine contract.
//! - [`DomainError`] wraps the above for application handlers and adds the
//!   persistence failures those handlers can run into.

use thiserror::Error;
use uuid::Uuid;

/// Why an untrusted content record could not be materialized.
///
/// Every variant other than [`ValidationError::UnknownVariant`] names the
/// field path that failed, e.g. `gridSize.rows` or `operators[1]`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The `type` discriminant is absent, not a string, or not a known tag.
    #[error("unknown content variant: {}", .0.as_deref().unwrap_or("<missing>"))]
    UnknownVariant(Option<String>),

    /// A required field is absent.
    #[error("missing field `{field}`")]
    MissingField {
        /// Path of the absent field.
        field: String,
    },

    /// A field is present but has the wrong JSON type.
    #[error("field `{field}` must be {expected}")]
    InvalidType {
        /// Path of the offending field.
        field: String,
        /// Human-readable description of the expected type.
        expected: &'static str,
    },

    /// A field has the right type but violates a range or size constraint.
    #[error("field `{field}` out of range: {reason}")]
    OutOfRange {
        /// Path of the offending field.
        field: String,
        /// Which bound was violated.
        reason: String,
    },

    /// A field holds a value outside its closed set of allowed members.
    #[error("field `{field}` has invalid member {value:?}")]
    InvalidEnumMember {
        /// Path of the offending field.
        field: String,
        /// The rejected value.
        value: String,
    },

    /// A field refers to something that does not exist elsewhere in the record.
    #[error("field `{field}` does not match its referent: {reason}")]
    ReferentialMismatch {
        /// Path of the offending field.
        field: String,
        /// What the field failed to reference.
        reason: String,
    },
}

impl ValidationError {
    /// Returns the field path that failed, if the error is tied to one.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::UnknownVariant(_) => None,
            Self::MissingField { field }
            | Self::InvalidType { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::InvalidEnumMember { field, .. }
            | Self::ReferentialMismatch { field, .. } => Some(field),
        }
    }
}

/// Contract violations raised by the step sequencer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowStateError {
    /// `advance()` was called while the current step is not ready.
    #[error("step {index} is not ready to advance")]
    NotReady {
        /// The current step index.
        index: usize,
    },

    /// The requested transition is not permitted from the current state.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// The flow is finished or abandoned and accepts no further mutation.
    #[error("flow already closed")]
    FlowAlreadyClosed,

    /// A flow must contain at least one step.
    #[error("flow has no steps")]
    EmptyFlow,
}

/// Contract violations raised by the session engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionStateError {
    /// The command is not valid in the session's current phase.
    #[error("session must be in {expected} phase, but is {actual}")]
    InvalidPhase {
        /// The phase the command requires.
        expected: &'static str,
        /// The phase the session is actually in.
        actual: &'static str,
    },

    /// The session reached a terminal phase and must be discarded.
    #[error("session is closed")]
    SessionClosed,

    /// The input does not fit the content being played.
    #[error("input rejected: {0}")]
    InputRejected(String),

    /// Valid content from which no playable session can be drawn.
    #[error("content cannot be played: {0}")]
    UnplayableContent(String),
}

/// Top-level domain error type for application handlers.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An aggregate was not found.
    #[error("aggregate not found: {0}")]
    AggregateNotFound(Uuid),

    /// Optimistic concurrency conflict.
    #[error(
        "concurrency conflict on aggregate {aggregate_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        /// The aggregate that had the conflict.
        aggregate_id: Uuid,
        /// The expected version.
        expected: i64,
        /// The actual version found.
        actual: i64,
    },

    /// Content failed validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A flow contract was violated.
    #[error("flow state error: {0}")]
    FlowState(#[from] FlowStateError),

    /// A session contract was violated.
    #[error("session state error: {0}")]
    SessionState(#[from] SessionStateError),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

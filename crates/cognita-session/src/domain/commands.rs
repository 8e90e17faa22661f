//! Commands for the session context.

use cognita_content::ContentVariant;
use cognita_core::command::Command;
use uuid::Uuid;

use super::input::SessionInput;
use super::settings::SessionSettings;

/// Command to set up a new session.
#[derive(Debug, Clone)]
pub struct PrepareSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session to create.
    pub session_id: Uuid,
    /// Validated content to play.
    pub content: ContentVariant,
    /// Settings in force.
    pub settings: SessionSettings,
}

impl Command for PrepareSession {
    fn command_type(&self) -> &'static str {
        "session.prepare"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> Uuid {
        self.session_id
    }
}

/// Command to begin the active phase.
#[derive(Debug, Clone)]
pub struct StartSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session identifier.
    pub session_id: Uuid,
}

impl Command for StartSession {
    fn command_type(&self) -> &'static str {
        "session.start"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> Uuid {
        self.session_id
    }
}

/// Command to record one learner input.
#[derive(Debug, Clone)]
pub struct RecordInput {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session identifier.
    pub session_id: Uuid,
    /// The input.
    pub input: SessionInput,
}

impl Command for RecordInput {
    fn command_type(&self) -> &'static str {
        "session.record_input"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> Uuid {
        self.session_id
    }
}

/// Command to end the active phase if its time limit has elapsed.
#[derive(Debug, Clone)]
pub struct CheckDeadline {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session identifier.
    pub session_id: Uuid,
}

impl Command for CheckDeadline {
    fn command_type(&self) -> &'static str {
        "session.check_deadline"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> Uuid {
        self.session_id
    }
}

/// Command to score a session.
#[derive(Debug, Clone)]
pub struct FinalizeSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session identifier.
    pub session_id: Uuid,
}

impl Command for FinalizeSession {
    fn command_type(&self) -> &'static str {
        "session.finalize"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> Uuid {
        self.session_id
    }
}

/// Command to cancel a session.
#[derive(Debug, Clone)]
pub struct AbandonSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session identifier.
    pub session_id: Uuid,
}

impl Command for AbandonSession {
    fn command_type(&self) -> &'static str {
        "session.abandon"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> Uuid {
        self.session_id
    }
}

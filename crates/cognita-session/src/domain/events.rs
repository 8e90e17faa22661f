//! Domain events for the session context.

use cognita_content::ContentVariant;
use cognita_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};

use super::input::SessionInput;
use super::plan::SessionPlan;
use super::scoring::Outcome;
use super::settings::SessionSettings;

/// Emitted when a session is set up from validated content.
///
/// Carries the derived plan so replay never consults an RNG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPrepared {
    /// The content being played.
    pub content: ContentVariant,
    /// SHA-256 of the content's canonical JSON.
    pub content_fingerprint: String,
    /// Settings in force.
    pub settings: SessionSettings,
    /// The derived plan.
    pub plan: SessionPlan,
}

/// Emitted when the active phase begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStarted {
    /// Inputs the plan requires.
    pub required_inputs: usize,
}

/// Emitted for every accepted input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecorded {
    /// The input.
    pub input: SessionInput,
}

/// What ended the active phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringTrigger {
    /// Every required input was collected.
    InputsComplete,
    /// The time limit elapsed first.
    TimedOut,
}

/// Emitted when the active phase ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringStarted {
    /// Why scoring began.
    pub trigger: ScoringTrigger,
}

/// Emitted when the session is scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCompleted {
    /// The final result.
    pub outcome: Outcome,
}

/// Emitted when the session is cancelled before scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionAbandoned {
    /// Phase the session was in when cancelled.
    pub from_phase: String,
}

/// Event payload variants for the session context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEventKind {
    /// The session was set up.
    SessionPrepared(SessionPrepared),
    /// The session became active.
    SessionStarted(SessionStarted),
    /// An input was accepted.
    InputRecorded(InputRecorded),
    /// The active phase ended.
    ScoringStarted(ScoringStarted),
    /// The session was scored.
    SessionCompleted(SessionCompleted),
    /// The session was cancelled.
    SessionAbandoned(SessionAbandoned),
}

impl SessionEventKind {
    /// The routing name of this kind.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SessionPrepared(_) => "session.prepared",
            Self::SessionStarted(_) => "session.started",
            Self::InputRecorded(_) => "session.input_recorded",
            Self::ScoringStarted(_) => "session.scoring_started",
            Self::SessionCompleted(_) => "session.completed",
            Self::SessionAbandoned(_) => "session.abandoned",
        }
    }
}

/// Domain event envelope for the session context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: SessionEventKind,
}

impl DomainEvent for SessionEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("SessionEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}

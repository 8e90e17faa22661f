//! Domain events for the flow context.

use cognita_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};

/// A step became the current step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepEntered {
    /// Index of the entered step.
    pub index: usize,
}

/// The current step reported whether it may be left.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessChanged {
    /// Index of the reporting step.
    pub index: usize,
    /// The new readiness flag.
    pub ready: bool,
}

/// The current step was advanced past.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepCompleted {
    /// Index of the completed step.
    pub index: usize,
}

/// The flow moved back one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRetreated {
    /// The step that was left.
    pub from: usize,
    /// The step that became current again.
    pub to: usize,
}

/// The user completed the flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowFinished {
    /// Number of steps marked completed when the flow finished.
    pub completed_steps: usize,
}

/// The flow was interrupted before completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowAbandoned {
    /// The step that was current when the flow was torn down.
    pub at_index: usize,
}

/// Event payload variants for the flow context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowEventKind {
    /// A step became current.
    StepEntered(StepEntered),
    /// Readiness of the current step changed.
    ReadinessChanged(ReadinessChanged),
    /// A step was completed.
    StepCompleted(StepCompleted),
    /// The flow moved back.
    StepRetreated(StepRetreated),
    /// The flow finished.
    FlowFinished(FlowFinished),
    /// The flow was abandoned.
    FlowAbandoned(FlowAbandoned),
}

impl FlowEventKind {
    /// The routing name of this kind.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::StepEntered(_) => "flow.step_entered",
            Self::ReadinessChanged(_) => "flow.readiness_changed",
            Self::StepCompleted(_) => "flow.step_completed",
            Self::StepRetreated(_) => "flow.step_retreated",
            Self::FlowFinished(_) => "flow.finished",
            Self::FlowAbandoned(_) => "flow.abandoned",
        }
    }
}

/// Domain event envelope for the flow context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: FlowEventKind,
}

impl DomainEvent for FlowEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("FlowEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}

//! The step sequencer aggregate.
//!
//! A sequencer is created for one flow instance and owns that flow's step
//! definitions, its position and the per-step readiness flags. Each
//! transition is raised as a [`FlowEvent`], applied immediately and kept in
//! the uncommitted buffer until the owner drains it.
//!
//! Invariant: `current_index < steps.len()` at all times; once the phase is
//! terminal nothing but a repeated `finish()` on a finished flow succeeds.

use std::fmt;
use std::sync::Arc;

use cognita_core::aggregate::AggregateRoot;
use cognita_core::clock::Clock;
use cognita_core::error::FlowStateError;
use cognita_core::event::EventMetadata;
use cognita_i18n::{TranslationMap, localize_variant};
use serde::Serialize;
use uuid::Uuid;

use super::events::{
    FlowAbandoned, FlowEvent, FlowEventKind, FlowFinished, ReadinessChanged, StepCompleted,
    StepEntered, StepRetreated,
};
use super::step::{StepContent, StepDefinition};

/// Per-step progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Not yet shown, or left by retreating.
    NotReached,
    /// The step on screen.
    Current,
    /// Advanced past.
    Completed,
}

/// Flow-level lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowPhase {
    /// Steps are being shown.
    InProgress,
    /// The user completed the flow.
    Finished,
    /// The flow was torn down without completion.
    Abandoned,
}

impl FlowPhase {
    /// Whether the flow accepts no further mutation.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// Result of a successful `advance()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The step at this index is now current.
    Moved(usize),
    /// The last step was completed and the flow finished.
    Finished,
}

/// What the rendering layer needs to show the current step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepView {
    /// Position of the step.
    pub index: usize,
    /// Number of steps in the flow.
    pub total: usize,
    /// Rendering handler selector.
    pub kind: String,
    /// Localized heading.
    pub headline: String,
    /// Localized secondary text.
    pub subtext: String,
    /// Localized call-to-action label.
    pub cta: String,
    /// Attached content, localized where it carries text.
    pub content: StepContent,
    /// Whether the step may be left forwards.
    pub ready: bool,
    /// Whether a back action should be offered.
    pub can_retreat: bool,
    /// Whether a forward action should be offered.
    pub can_advance: bool,
}

/// The aggregate root for one flow instance.
pub struct StepSequencer {
    id: Uuid,
    version: i64,
    steps: Vec<StepDefinition>,
    current_index: usize,
    readiness: Vec<bool>,
    statuses: Vec<StepStatus>,
    phase: FlowPhase,
    clock: Arc<dyn Clock>,
    uncommitted_events: Vec<FlowEvent>,
}

impl fmt::Debug for StepSequencer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepSequencer")
            .field("id", &self.id)
            .field("version", &self.version)
            .field("current_index", &self.current_index)
            .field("readiness", &self.readiness)
            .field("statuses", &self.statuses)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl StepSequencer {
    /// Starts a flow over `steps` with the first step current.
    ///
    /// Interactive steps start not ready; presentational steps start ready.
    ///
    /// # Errors
    ///
    /// Returns `FlowStateError::EmptyFlow` if `steps` is empty.
    pub fn new(
        flow_id: Uuid,
        steps: Vec<StepDefinition>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, FlowStateError> {
        if steps.is_empty() {
            return Err(FlowStateError::EmptyFlow);
        }
        let readiness = steps.iter().map(|step| !step.is_interactive()).collect();
        let statuses = vec![StepStatus::NotReached; steps.len()];

        let mut sequencer = Self {
            id: flow_id,
            version: 0,
            steps,
            current_index: 0,
            readiness,
            statuses,
            phase: FlowPhase::InProgress,
            clock,
            uncommitted_events: Vec::new(),
        };
        sequencer.raise(FlowEventKind::StepEntered(StepEntered { index: 0 }));
        Ok(sequencer)
    }

    /// The flow identifier.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Index of the current step.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The current step.
    #[must_use]
    pub fn current_step(&self) -> &StepDefinition {
        &self.steps[self.current_index]
    }

    /// All step definitions, in order.
    #[must_use]
    pub fn steps(&self) -> &[StepDefinition] {
        &self.steps
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false; a sequencer never holds zero steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The flow phase.
    #[must_use]
    pub fn phase(&self) -> FlowPhase {
        self.phase
    }

    /// Readiness of step `index`, or `None` if out of bounds.
    #[must_use]
    pub fn is_ready(&self, index: usize) -> Option<bool> {
        self.readiness.get(index).copied()
    }

    /// Progress of step `index`, or `None` if out of bounds.
    #[must_use]
    pub fn status(&self, index: usize) -> Option<StepStatus> {
        self.statuses.get(index).copied()
    }

    /// Progress of every step, in order.
    #[must_use]
    pub fn statuses(&self) -> &[StepStatus] {
        &self.statuses
    }

    /// Whether `retreat()` would succeed.
    #[must_use]
    pub fn can_retreat(&self) -> bool {
        !self.phase.is_terminal() && self.current_index > 0
    }

    /// Whether `advance()` would succeed.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        !self.phase.is_terminal() && self.readiness[self.current_index]
    }

    /// Completes the current step and moves to the next, finishing the flow
    /// after the last step.
    ///
    /// # Errors
    ///
    /// Returns `FlowStateError::NotReady`, leaving the position unchanged,
    /// if the current step is not ready. Returns
    /// `FlowStateError::FlowAlreadyClosed` on a terminal flow.
    pub fn advance(&mut self) -> Result<Advance, FlowStateError> {
        self.ensure_open()?;
        let index = self.current_index;
        if !self.readiness[index] {
            return Err(FlowStateError::NotReady { index });
        }

        self.raise(FlowEventKind::StepCompleted(StepCompleted { index }));
        if index + 1 == self.steps.len() {
            self.raise_finished();
            Ok(Advance::Finished)
        } else {
            let next = index + 1;
            self.raise(FlowEventKind::StepEntered(StepEntered { index: next }));
            Ok(Advance::Moved(next))
        }
    }

    /// Moves back one step. Readiness flags are left as they were.
    ///
    /// # Errors
    ///
    /// Returns `FlowStateError::InvalidTransition` on the first step and
    /// `FlowStateError::FlowAlreadyClosed` on a terminal flow.
    pub fn retreat(&mut self) -> Result<usize, FlowStateError> {
        self.ensure_open()?;
        let from = self.current_index;
        if from == 0 {
            return Err(FlowStateError::InvalidTransition(
                "cannot retreat from the first step".to_owned(),
            ));
        }
        let to = from - 1;
        self.raise(FlowEventKind::StepRetreated(StepRetreated { from, to }));
        Ok(to)
    }

    /// Records whether the current step may be left.
    ///
    /// # Errors
    ///
    /// Returns `FlowStateError::InvalidTransition` if `index` is not the
    /// current step and `FlowStateError::FlowAlreadyClosed` on a terminal
    /// flow.
    pub fn set_readiness(&mut self, index: usize, ready: bool) -> Result<(), FlowStateError> {
        self.ensure_open()?;
        if index != self.current_index {
            return Err(FlowStateError::InvalidTransition(format!(
                "readiness reported by step {index} while step {} is current",
                self.current_index
            )));
        }
        if self.readiness[index] != ready {
            self.raise(FlowEventKind::ReadinessChanged(ReadinessChanged {
                index,
                ready,
            }));
        }
        Ok(())
    }

    /// Finishes the flow. Repeated calls on a finished flow do nothing.
    ///
    /// # Errors
    ///
    /// Returns `FlowStateError::FlowAlreadyClosed` if the flow was
    /// abandoned.
    pub fn finish(&mut self) -> Result<(), FlowStateError> {
        match self.phase {
            FlowPhase::Finished => Ok(()),
            FlowPhase::Abandoned => Err(FlowStateError::FlowAlreadyClosed),
            FlowPhase::InProgress => {
                self.raise_finished();
                Ok(())
            }
        }
    }

    /// Ends the flow without completion.
    ///
    /// # Errors
    ///
    /// Returns `FlowStateError::FlowAlreadyClosed` on a terminal flow.
    pub fn abandon(&mut self) -> Result<(), FlowStateError> {
        self.ensure_open()?;
        self.raise(FlowEventKind::FlowAbandoned(FlowAbandoned {
            at_index: self.current_index,
        }));
        Ok(())
    }

    /// Builds the view of the current step, localized through `map`.
    #[must_use]
    pub fn current_view(&self, map: &TranslationMap) -> StepView {
        let step = self.current_step();
        let entity_id = step.entity_id.as_deref();
        let text = |field: &str, base: Option<&String>| match entity_id {
            Some(entity_id) => map
                .resolve(entity_id, field, base.map(String::as_str))
                .to_owned(),
            None => base.cloned().unwrap_or_default(),
        };

        let content = match (&step.content, entity_id) {
            (StepContent::Variant(variant), Some(entity_id)) => {
                StepContent::Variant(localize_variant(variant, map, entity_id))
            }
            (content, _) => content.clone(),
        };

        StepView {
            index: self.current_index,
            total: self.steps.len(),
            kind: step.kind.clone(),
            headline: text("headline", step.copy.headline.as_ref()),
            subtext: text("subtext", step.copy.subtext.as_ref()),
            cta: text("cta", step.copy.cta.as_ref()),
            content,
            ready: self.readiness[self.current_index],
            can_retreat: self.can_retreat(),
            can_advance: self.can_advance(),
        }
    }

    fn ensure_open(&self) -> Result<(), FlowStateError> {
        if self.phase.is_terminal() {
            Err(FlowStateError::FlowAlreadyClosed)
        } else {
            Ok(())
        }
    }

    fn raise_finished(&mut self) {
        let completed_steps = self
            .statuses
            .iter()
            .filter(|status| **status == StepStatus::Completed)
            .count();
        self.raise(FlowEventKind::FlowFinished(FlowFinished { completed_steps }));
    }

    fn raise(&mut self, kind: FlowEventKind) {
        let event = FlowEvent {
            metadata: EventMetadata::new(
                kind.event_type(),
                self.id,
                self.version + 1,
                self.id,
                self.clock.now(),
            ),
            kind,
        };
        self.apply(&event);
        self.uncommitted_events.push(event);
    }
}

impl AggregateRoot for StepSequencer {
    type Event = FlowEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            FlowEventKind::StepEntered(payload) => {
                self.current_index = payload.index;
                self.statuses[payload.index] = StepStatus::Current;
            }
            FlowEventKind::ReadinessChanged(payload) => {
                self.readiness[payload.index] = payload.ready;
            }
            FlowEventKind::StepCompleted(payload) => {
                self.statuses[payload.index] = StepStatus::Completed;
            }
            FlowEventKind::StepRetreated(payload) => {
                self.statuses[payload.from] = StepStatus::NotReached;
                self.statuses[payload.to] = StepStatus::Current;
                self.current_index = payload.to;
            }
            FlowEventKind::FlowFinished(_) => self.phase = FlowPhase::Finished,
            FlowEventKind::FlowAbandoned(_) => self.phase = FlowPhase::Abandoned,
        }
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn take_uncommitted_events(&mut self) -> Vec<Self::Event> {
        std::mem::take(&mut self.uncommitted_events)
    }
}

//! Flow controller.
//!
//! Owns a sequencer together with the completion port. UI code mutates the
//! sequencer through [`FlowController::sequencer_mut`] and then calls
//! [`FlowController::commit`], which drains the raised events into the
//! controller's journal and persists completion when the flow finished.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use cognita_core::aggregate::AggregateRoot;
use cognita_core::error::DomainError;
use cognita_core::ports::CompletionStore;
use tracing::{debug, info, instrument};

use crate::domain::events::{FlowEvent, FlowEventKind};
use crate::domain::sequencer::StepSequencer;

/// Outcome of one [`FlowController::commit`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitSummary {
    /// Events drained by this call.
    pub drained: usize,
    /// Whether this call persisted the flow's completion.
    pub completion_persisted: bool,
}

/// Binds a flow instance to its completion side effect.
pub struct FlowController {
    sequencer: StepSequencer,
    completion_store: Arc<dyn CompletionStore>,
    pending_completion: Option<DateTime<Utc>>,
    completion_persisted: bool,
    journal: Vec<FlowEvent>,
}

impl std::fmt::Debug for FlowController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowController")
            .field("sequencer", &self.sequencer)
            .field("pending_completion", &self.pending_completion)
            .field("completion_persisted", &self.completion_persisted)
            .field("journal_len", &self.journal.len())
            .finish_non_exhaustive()
    }
}

impl FlowController {
    /// Wraps `sequencer`.
    #[must_use]
    pub fn new(sequencer: StepSequencer, completion_store: Arc<dyn CompletionStore>) -> Self {
        Self {
            sequencer,
            completion_store,
            pending_completion: None,
            completion_persisted: false,
            journal: Vec::new(),
        }
    }

    /// The owned sequencer.
    #[must_use]
    pub fn sequencer(&self) -> &StepSequencer {
        &self.sequencer
    }

    /// Mutable access for driving transitions.
    pub fn sequencer_mut(&mut self) -> &mut StepSequencer {
        &mut self.sequencer
    }

    /// Every event committed so far, in order.
    #[must_use]
    pub fn journal(&self) -> &[FlowEvent] {
        &self.journal
    }

    /// Whether completion has been durably recorded.
    #[must_use]
    pub fn completion_persisted(&self) -> bool {
        self.completion_persisted
    }

    /// Drains the sequencer's events and persists completion if the flow
    /// finished.
    ///
    /// `mark_complete` is invoked at most once over the controller's life
    /// and never for an abandoned flow. A failed call is retried by the
    /// next `commit()`.
    ///
    /// # Errors
    ///
    /// Returns the completion store's `DomainError` if persisting fails.
    #[instrument(skip(self), fields(flow_id = %self.sequencer.id()))]
    pub async fn commit(&mut self) -> Result<CommitSummary, DomainError> {
        let events = self.sequencer.take_uncommitted_events();
        let drained = events.len();
        for event in &events {
            if matches!(event.kind, FlowEventKind::FlowFinished(_)) && !self.completion_persisted
            {
                self.pending_completion = Some(event.metadata.occurred_at);
            }
        }
        self.journal.extend(events);
        debug!(drained, "flow events committed");

        let Some(completed_at) = self.pending_completion else {
            return Ok(CommitSummary {
                drained,
                completion_persisted: false,
            });
        };

        self.completion_store
            .mark_complete(self.sequencer.id(), completed_at)
            .await?;
        self.pending_completion = None;
        self.completion_persisted = true;
        info!(%completed_at, "flow completion persisted");

        Ok(CommitSummary {
            drained,
            completion_persisted: true,
        })
    }
}

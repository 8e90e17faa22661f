//! Aggregate root for one game session.

use chrono::{DateTime, Utc};
use cognita_content::ContentVariant;
use cognita_core::aggregate::AggregateRoot;
use cognita_core::clock::{Clock, elapsed_ms};
use cognita_core::error::SessionStateError;
use cognita_core::event::EventMetadata;
use cognita_core::rng::DeterministicRng;
use serde::Serialize;
use uuid::Uuid;

use super::events::{
    InputRecorded, ScoringStarted, ScoringTrigger, SessionAbandoned, SessionCompleted,
    SessionEvent, SessionEventKind, SessionPrepared, SessionStarted,
};
use super::input::SessionInput;
use super::plan::SessionPlan;
use super::scoring::{Outcome, score};
use super::settings::SessionSettings;

/// Session lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Plan derived, waiting to start.
    Setup,
    /// Collecting inputs.
    Active,
    /// Inputs closed, waiting to be scored.
    Scoring,
    /// Scored. Terminal.
    Complete,
    /// Cancelled without a score. Terminal.
    Abandoned,
}

impl SessionPhase {
    /// Lowercase name of the phase.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Active => "active",
            Self::Scoring => "scoring",
            Self::Complete => "complete",
            Self::Abandoned => "abandoned",
        }
    }

    /// Whether the session must be discarded.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Abandoned)
    }
}

/// The aggregate root for one game session.
///
/// A session is built once with [`GameSession::setup`] and never reset;
/// a new game needs a new session.
#[derive(Debug)]
pub struct GameSession {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Current version (event count).
    pub(crate) version: i64,
    pub(crate) phase: SessionPhase,
    pub(crate) content: Option<ContentVariant>,
    pub(crate) content_fingerprint: Option<String>,
    pub(crate) settings: SessionSettings,
    pub(crate) plan: Option<SessionPlan>,
    pub(crate) started_at: Option<DateTime<Utc>>,
    pub(crate) scoring_started_at: Option<DateTime<Utc>>,
    pub(crate) scoring_trigger: Option<ScoringTrigger>,
    pub(crate) inputs: Vec<SessionInput>,
    pub(crate) outcome: Option<Outcome>,
    uncommitted_events: Vec<SessionEvent>,
}

impl GameSession {
    /// Creates an empty aggregate for reconstitution.
    #[must_use]
    pub(crate) fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            phase: SessionPhase::Setup,
            content: None,
            content_fingerprint: None,
            settings: SessionSettings::default(),
            plan: None,
            started_at: None,
            scoring_started_at: None,
            scoring_trigger: None,
            inputs: Vec::new(),
            outcome: None,
            uncommitted_events: Vec::new(),
        }
    }

    /// Sets up a session for `content`, deriving its plan from `rng`.
    ///
    /// # Errors
    ///
    /// `UnplayableContent` if no plan can be derived for `content`.
    pub fn setup(
        session_id: Uuid,
        content: &ContentVariant,
        settings: SessionSettings,
        rng: &mut dyn DeterministicRng,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<Self, SessionStateError> {
        let plan = SessionPlan::derive(content, settings, rng)?;
        let mut session = Self::new(session_id);
        session.raise(
            SessionEventKind::SessionPrepared(SessionPrepared {
                content: content.clone(),
                content_fingerprint: content.fingerprint(),
                settings,
                plan,
            }),
            correlation_id,
            clock,
        );
        Ok(session)
    }

    /// The lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// The content being played.
    #[must_use]
    pub fn content(&self) -> Option<&ContentVariant> {
        self.content.as_ref()
    }

    /// Fingerprint of the content recorded at setup.
    #[must_use]
    pub fn content_fingerprint(&self) -> Option<&str> {
        self.content_fingerprint.as_deref()
    }

    /// The derived plan.
    #[must_use]
    pub fn plan(&self) -> Option<&SessionPlan> {
        self.plan.as_ref()
    }

    /// Settings in force.
    #[must_use]
    pub fn settings(&self) -> SessionSettings {
        self.settings
    }

    /// When the active phase began.
    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Inputs accepted so far.
    #[must_use]
    pub fn inputs(&self) -> &[SessionInput] {
        &self.inputs
    }

    /// Why the active phase ended, once it has.
    #[must_use]
    pub fn scoring_trigger(&self) -> Option<ScoringTrigger> {
        self.scoring_trigger
    }

    /// The final result, once complete.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Inputs still needed before scoring.
    #[must_use]
    pub fn remaining_inputs(&self) -> usize {
        self.plan
            .as_ref()
            .map_or(0, |plan| plan.required_inputs().saturating_sub(self.inputs.len()))
    }

    /// Begins the active phase. A plan needing no inputs goes straight to
    /// scoring.
    ///
    /// # Errors
    ///
    /// `SessionClosed` on a terminal session; `InvalidPhase` outside
    /// `Setup`.
    pub fn start(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), SessionStateError> {
        self.require(SessionPhase::Setup)?;
        let required_inputs = self.prepared_plan()?.required_inputs();

        self.raise(
            SessionEventKind::SessionStarted(SessionStarted { required_inputs }),
            correlation_id,
            clock,
        );
        if required_inputs == 0 {
            self.begin_scoring(ScoringTrigger::InputsComplete, correlation_id, clock);
        }
        Ok(())
    }

    /// Records one input. Collecting the last required input moves the
    /// session to scoring.
    ///
    /// # Errors
    ///
    /// `SessionClosed` on a terminal session; `InvalidPhase` outside
    /// `Active`; `InputRejected` if the input does not fit the plan.
    pub fn record_input(
        &mut self,
        input: SessionInput,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), SessionStateError> {
        self.require(SessionPhase::Active)?;
        self.check_input(input)?;

        self.raise(
            SessionEventKind::InputRecorded(InputRecorded { input }),
            correlation_id,
            clock,
        );
        if self.remaining_inputs() == 0 {
            self.begin_scoring(ScoringTrigger::InputsComplete, correlation_id, clock);
        }
        Ok(())
    }

    /// Ends the active phase if the time limit has elapsed. Returns whether
    /// it did.
    ///
    /// # Errors
    ///
    /// `SessionClosed` on a terminal session; `InvalidPhase` outside
    /// `Active`.
    pub fn check_deadline(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<bool, SessionStateError> {
        self.require(SessionPhase::Active)?;
        let (Some(limit), Some(started_at)) = (self.settings.time_limit_ms(), self.started_at)
        else {
            return Ok(false);
        };
        if elapsed_ms(started_at, clock.now()) < limit {
            return Ok(false);
        }
        self.begin_scoring(ScoringTrigger::TimedOut, correlation_id, clock);
        Ok(true)
    }

    /// Scores the session and closes it.
    ///
    /// # Errors
    ///
    /// `SessionClosed` on a terminal session; `InvalidPhase` outside
    /// `Scoring`.
    pub fn finalize(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<Outcome, SessionStateError> {
        self.require(SessionPhase::Scoring)?;
        let plan = self.prepared_plan()?;
        let elapsed = match (self.started_at, self.scoring_started_at) {
            (Some(start), Some(end)) => elapsed_ms(start, end),
            _ => 0,
        };
        let outcome = score(plan, &self.inputs).with_elapsed(elapsed);

        self.raise(
            SessionEventKind::SessionCompleted(SessionCompleted { outcome }),
            correlation_id,
            clock,
        );
        Ok(outcome)
    }

    /// Cancels the session. Abandonment is a normal terminal outcome and
    /// carries no score.
    ///
    /// # Errors
    ///
    /// `SessionClosed` on a terminal session; `InvalidPhase` in `Scoring`.
    pub fn abandon(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), SessionStateError> {
        match self.phase {
            SessionPhase::Complete | SessionPhase::Abandoned => {
                Err(SessionStateError::SessionClosed)
            }
            SessionPhase::Scoring => Err(SessionStateError::InvalidPhase {
                expected: "setup or active",
                actual: self.phase.name(),
            }),
            SessionPhase::Setup | SessionPhase::Active => {
                self.raise(
                    SessionEventKind::SessionAbandoned(SessionAbandoned {
                        from_phase: self.phase.name().to_owned(),
                    }),
                    correlation_id,
                    clock,
                );
                Ok(())
            }
        }
    }

    fn require(&self, expected: SessionPhase) -> Result<(), SessionStateError> {
        if self.phase.is_terminal() {
            return Err(SessionStateError::SessionClosed);
        }
        if self.phase != expected {
            return Err(SessionStateError::InvalidPhase {
                expected: expected.name(),
                actual: self.phase.name(),
            });
        }
        Ok(())
    }

    fn prepared_plan(&self) -> Result<&SessionPlan, SessionStateError> {
        self.plan.as_ref().ok_or(SessionStateError::InvalidPhase {
            expected: "setup",
            actual: "unprepared",
        })
    }

    fn check_input(&self, input: SessionInput) -> Result<(), SessionStateError> {
        let plan = self.prepared_plan()?;
        match (plan, input) {
            (SessionPlan::Arithmetic { .. }, SessionInput::Answer { .. }) => Ok(()),
            (SessionPlan::Matrix { rows, cols, .. }, SessionInput::Cell { row, col }) => {
                if row >= *rows || col >= *cols {
                    return Err(SessionStateError::InputRejected(format!(
                        "cell ({row}, {col}) is outside the {rows}x{cols} grid"
                    )));
                }
                if self.inputs.contains(&input) {
                    return Err(SessionStateError::InputRejected(format!(
                        "cell ({row}, {col}) was already selected"
                    )));
                }
                Ok(())
            }
            (SessionPlan::Language { options, .. }, SessionInput::Choice { index }) => {
                if index >= options.len() {
                    return Err(SessionStateError::InputRejected(format!(
                        "option {index} does not exist"
                    )));
                }
                Ok(())
            }
            (_, other) => Err(SessionStateError::InputRejected(format!(
                "{} input does not fit this game",
                other.kind()
            ))),
        }
    }

    fn begin_scoring(
        &mut self,
        trigger: ScoringTrigger,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) {
        self.raise(
            SessionEventKind::ScoringStarted(ScoringStarted { trigger }),
            correlation_id,
            clock,
        );
    }

    fn raise(&mut self, kind: SessionEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let event = SessionEvent {
            metadata: EventMetadata::new(
                kind.event_type(),
                self.id,
                self.version + 1,
                correlation_id,
                clock.now(),
            ),
            kind,
        };
        self.apply(&event);
        self.uncommitted_events.push(event);
    }
}

impl AggregateRoot for GameSession {
    type Event = SessionEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            SessionEventKind::SessionPrepared(payload) => {
                self.content = Some(payload.content.clone());
                self.content_fingerprint = Some(payload.content_fingerprint.clone());
                self.settings = payload.settings;
                self.plan = Some(payload.plan.clone());
                self.phase = SessionPhase::Setup;
            }
            SessionEventKind::SessionStarted(_) => {
                self.started_at = Some(event.metadata.occurred_at);
                self.phase = SessionPhase::Active;
            }
            SessionEventKind::InputRecorded(payload) => {
                self.inputs.push(payload.input);
            }
            SessionEventKind::ScoringStarted(payload) => {
                self.scoring_started_at = Some(event.metadata.occurred_at);
                self.scoring_trigger = Some(payload.trigger);
                self.phase = SessionPhase::Scoring;
            }
            SessionEventKind::SessionCompleted(payload) => {
                self.outcome = Some(payload.outcome);
                self.phase = SessionPhase::Complete;
            }
            SessionEventKind::SessionAbandoned(_) => {
                self.phase = SessionPhase::Abandoned;
            }
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

//! Query handlers for the session context.

use chrono::{DateTime, Utc};
use cognita_core::aggregate::AggregateRoot;
use cognita_core::error::DomainError;
use cognita_core::repository::EventRepository;
use serde::Serialize;
use uuid::Uuid;

use crate::application::command_handlers;
use crate::domain::events::ScoringTrigger;
use crate::domain::plan::SessionPlan;
use crate::domain::scoring::Outcome;

/// Read-only view of a game session.
#[derive(Debug, Serialize)]
pub struct SessionView {
    /// The session identifier.
    pub session_id: Uuid,
    /// Current phase as a string.
    pub phase: String,
    /// Discriminant of the content being played.
    pub game: Option<&'static str>,
    /// Fingerprint of the content recorded at setup.
    pub content_fingerprint: Option<String>,
    /// The derived plan.
    pub plan: Option<SessionPlan>,
    /// When the active phase began.
    pub started_at: Option<DateTime<Utc>>,
    /// Inputs accepted so far.
    pub inputs_recorded: usize,
    /// Inputs still needed.
    pub inputs_remaining: usize,
    /// Why the active phase ended.
    pub scoring_trigger: Option<ScoringTrigger>,
    /// The final result, once complete.
    pub outcome: Option<Outcome>,
    /// Current version (event count).
    pub version: i64,
}

/// Retrieves a session by its aggregate ID.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no events exist for the ID.
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub async fn get_session_by_id(
    session_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<SessionView, DomainError> {
    let stored_events = repo.load_events(session_id).await?;
    if stored_events.is_empty() {
        return Err(DomainError::AggregateNotFound(session_id));
    }
    let session = command_handlers::reconstitute(session_id, &stored_events)?;

    Ok(SessionView {
        session_id,
        phase: session.phase().name().to_owned(),
        game: session.content().map(cognita_content::ContentVariant::tag),
        content_fingerprint: session.content_fingerprint().map(str::to_owned),
        plan: session.plan().cloned(),
        started_at: session.started_at(),
        inputs_recorded: session.inputs().len(),
        inputs_remaining: session.remaining_inputs(),
        scoring_trigger: session.scoring_trigger(),
        outcome: session.outcome(),
        version: session.version(),
    })
}

//! Command handlers for the session context.
//!
//! Each handler loads the session's journal, replays it into a
//! `GameSession`, executes one command and appends the raised events. A
//! session's plan lives in its `SessionPrepared` event, so only the prepare
//! handler ever touches an RNG.

use cognita_core::aggregate::AggregateRoot;
use cognita_core::clock::Clock;
use cognita_core::error::DomainError;
use cognita_core::event::EventMetadata;
use cognita_core::repository::{EventRepository, StoredEvent};
use cognita_core::rng::DeterministicRng;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::aggregates::{GameSession, SessionPhase};
use crate::domain::commands::{
    AbandonSession, CheckDeadline, FinalizeSession, PrepareSession, RecordInput, StartSession,
};
use crate::domain::events::{SessionEvent, SessionEventKind};
use crate::domain::scoring::Outcome;

/// Result of a successfully handled command.
#[derive(Debug)]
pub struct SessionCommandResult {
    /// The session affected by the command.
    pub aggregate_id: Uuid,
    /// Phase after the command.
    pub phase: SessionPhase,
    /// The final result, once the session is complete.
    pub outcome: Option<Outcome>,
    /// The stored events produced and persisted.
    pub stored_events: Vec<StoredEvent>,
}

/// Reconstitutes a `GameSession` from stored events.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub(crate) fn reconstitute(
    session_id: Uuid,
    existing_events: &[StoredEvent],
) -> Result<GameSession, DomainError> {
    let mut session = GameSession::new(session_id);
    for stored in existing_events {
        let kind: SessionEventKind =
            serde_json::from_value(stored.payload.clone()).map_err(|e| {
                DomainError::Infrastructure(format!("event deserialization failed: {e}"))
            })?;
        let event = SessionEvent {
            metadata: EventMetadata {
                event_id: stored.event_id,
                event_type: stored.event_type.clone(),
                aggregate_id: stored.aggregate_id,
                sequence_number: stored.sequence_number,
                correlation_id: stored.correlation_id,
                occurred_at: stored.occurred_at,
            },
            kind,
        };
        session.apply(&event);
    }
    Ok(session)
}

async fn load(session_id: Uuid, repo: &dyn EventRepository) -> Result<GameSession, DomainError> {
    let existing_events = repo.load_events(session_id).await?;
    if existing_events.is_empty() {
        return Err(DomainError::AggregateNotFound(session_id));
    }
    reconstitute(session_id, &existing_events)
}

async fn persist(
    mut session: GameSession,
    repo: &dyn EventRepository,
) -> Result<SessionCommandResult, DomainError> {
    let expected_version = session.committed_version();
    let stored_events: Vec<StoredEvent> = session
        .take_uncommitted_events()
        .iter()
        .map(StoredEvent::from_event)
        .collect();

    if !stored_events.is_empty() {
        repo.append_events(session.id, expected_version, &stored_events)
            .await?;
    }

    Ok(SessionCommandResult {
        aggregate_id: session.id,
        phase: session.phase(),
        outcome: session.outcome(),
        stored_events,
    })
}

/// Handles the `PrepareSession` command: derives the plan and opens the
/// session's journal.
///
/// # Errors
///
/// Returns `DomainError::SessionState` if no plan can be drawn from the
/// content, `DomainError::ConcurrencyConflict` if the session already has a
/// journal, or the repository's error if appending fails.
#[instrument(skip_all, fields(session_id = %command.session_id, game = command.content.tag()))]
pub async fn handle_prepare_session(
    command: &PrepareSession,
    rng: &mut dyn DeterministicRng,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<SessionCommandResult, DomainError> {
    let session = GameSession::setup(
        command.session_id,
        &command.content,
        command.settings,
        rng,
        command.correlation_id,
        clock,
    )?;
    let required_inputs = session.remaining_inputs();

    let result = persist(session, repo).await?;
    info!(required_inputs, "session prepared");
    Ok(result)
}

/// Handles the `StartSession` command.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` for an unknown session,
/// `DomainError::SessionState` if the session cannot start, or the
/// repository's error.
#[instrument(skip_all, fields(session_id = %command.session_id))]
pub async fn handle_start_session(
    command: &StartSession,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<SessionCommandResult, DomainError> {
    let mut session = load(command.session_id, repo).await?;
    session.start(command.correlation_id, clock)?;

    let result = persist(session, repo).await?;
    info!(phase = result.phase.name(), "session started");
    Ok(result)
}

/// Handles the `RecordInput` command.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` for an unknown session,
/// `DomainError::SessionState` if the input is not accepted, or the
/// repository's error.
#[instrument(skip_all, fields(session_id = %command.session_id, input = command.input.kind()))]
pub async fn handle_record_input(
    command: &RecordInput,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<SessionCommandResult, DomainError> {
    let mut session = load(command.session_id, repo).await?;
    session.record_input(command.input, command.correlation_id, clock)?;
    persist(session, repo).await
}

/// Handles the `CheckDeadline` command. Nothing is appended while time
/// remains.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` for an unknown session,
/// `DomainError::SessionState` outside the active phase, or the
/// repository's error.
#[instrument(skip_all, fields(session_id = %command.session_id))]
pub async fn handle_check_deadline(
    command: &CheckDeadline,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<SessionCommandResult, DomainError> {
    let mut session = load(command.session_id, repo).await?;
    if session.check_deadline(command.correlation_id, clock)? {
        info!("session time limit elapsed");
    }
    persist(session, repo).await
}

/// Handles the `FinalizeSession` command.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` for an unknown session,
/// `DomainError::SessionState` outside the scoring phase, or the
/// repository's error.
#[instrument(skip_all, fields(session_id = %command.session_id))]
pub async fn handle_finalize_session(
    command: &FinalizeSession,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<SessionCommandResult, DomainError> {
    let mut session = load(command.session_id, repo).await?;
    let outcome = session.finalize(command.correlation_id, clock)?;

    let result = persist(session, repo).await?;
    info!(
        score = outcome.score,
        correct = outcome.correct,
        elapsed_ms = outcome.elapsed_ms,
        "session complete"
    );
    Ok(result)
}

/// Handles the `AbandonSession` command.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` for an unknown session,
/// `DomainError::SessionState` if the session can no longer be abandoned,
/// or the repository's error.
#[instrument(skip_all, fields(session_id = %command.session_id))]
pub async fn handle_abandon_session(
    command: &AbandonSession,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<SessionCommandResult, DomainError> {
    let mut session = load(command.session_id, repo).await?;
    session.abandon(command.correlation_id, clock)?;

    let result = persist(session, repo).await?;
    info!("session abandoned");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cognita_content::{ContentVariant, validate};
    use cognita_core::error::SessionStateError;
    use cognita_core::rng::SeededRng;
    use cognita_event_store::MemoryEventRepository;
    use cognita_test_support::{
        EmptyEventRepository, FailingEventRepository, FixedClock, MockRng,
        RecordingEventRepository, fixed_now,
    };
    use serde_json::json;

    use crate::domain::input::SessionInput;
    use crate::domain::settings::SessionSettings;

    fn language() -> ContentVariant {
        validate(&json!({
            "type": "mental_language_discrimination",
            "sentenceParts": ["She", "to school."],
            "options": ["go", "goes", "going"],
            "answer": "goes"
        }))
        .unwrap()
    }

    fn prepare(session_id: Uuid, content: ContentVariant) -> PrepareSession {
        PrepareSession {
            correlation_id: Uuid::new_v4(),
            session_id,
            content,
            settings: SessionSettings::default(),
        }
    }

    #[tokio::test]
    async fn test_handle_prepare_session_persists_prepared_event() {
        // Arrange
        let session_id = Uuid::new_v4();
        let clock = FixedClock(fixed_now());
        let repo = RecordingEventRepository::default();
        let command = prepare(session_id, language());

        // Act
        let result = handle_prepare_session(&command, &mut MockRng, &clock, &repo)
            .await
            .unwrap();

        // Assert
        assert_eq!(result.aggregate_id, session_id);
        assert_eq!(result.phase, SessionPhase::Setup);
        let appended = repo.appended_events();
        assert_eq!(appended.len(), 1);
        let (agg_id, expected_version, events) = &appended[0];
        assert_eq!(*agg_id, session_id);
        assert_eq!(*expected_version, 0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "session.prepared");
        assert_eq!(events[0].sequence_number, 1);
        assert_eq!(events[0].correlation_id, command.correlation_id);
        assert_eq!(events[0].occurred_at, fixed_now());
    }

    #[tokio::test]
    async fn test_full_session_through_handlers() {
        // Arrange
        let session_id = Uuid::new_v4();
        let clock = FixedClock(fixed_now());
        let repo = RecordingEventRepository::default();
        let correlation_id = Uuid::new_v4();
        handle_prepare_session(&prepare(session_id, language()), &mut MockRng, &clock, &repo)
            .await
            .unwrap();

        // Act
        handle_start_session(
            &StartSession {
                correlation_id,
                session_id,
            },
            &clock,
            &repo,
        )
        .await
        .unwrap();
        let recorded = handle_record_input(
            &RecordInput {
                correlation_id,
                session_id,
                input: SessionInput::Choice { index: 1 },
            },
            &clock,
            &repo,
        )
        .await
        .unwrap();
        let finalized = handle_finalize_session(
            &FinalizeSession {
                correlation_id,
                session_id,
            },
            &clock,
            &repo,
        )
        .await
        .unwrap();

        // Assert
        assert_eq!(recorded.phase, SessionPhase::Scoring);
        assert_eq!(
            finalized.outcome,
            Some(Outcome {
                score: 1,
                correct: true,
                elapsed_ms: 0
            })
        );
        let versions: Vec<i64> = repo
            .appended_events()
            .iter()
            .map(|(_, expected, _)| *expected)
            .collect();
        assert_eq!(versions, vec![0, 1, 2, 4]);
    }

    #[tokio::test]
    async fn test_handle_start_session_returns_not_found_for_unknown_session() {
        // Arrange
        let session_id = Uuid::new_v4();
        let clock = FixedClock(fixed_now());

        // Act
        let result = handle_start_session(
            &StartSession {
                correlation_id: Uuid::new_v4(),
                session_id,
            },
            &clock,
            &EmptyEventRepository,
        )
        .await;

        // Assert
        match result.unwrap_err() {
            DomainError::AggregateNotFound(id) => assert_eq!(id, session_id),
            other => panic!("expected AggregateNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_handle_finalize_before_scoring_surfaces_session_state_error() {
        // Arrange
        let session_id = Uuid::new_v4();
        let clock = FixedClock(fixed_now());
        let repo = RecordingEventRepository::default();
        handle_prepare_session(&prepare(session_id, language()), &mut MockRng, &clock, &repo)
            .await
            .unwrap();

        // Act
        let result = handle_finalize_session(
            &FinalizeSession {
                correlation_id: Uuid::new_v4(),
                session_id,
            },
            &clock,
            &repo,
        )
        .await;

        // Assert
        assert!(matches!(
            result,
            Err(DomainError::SessionState(SessionStateError::InvalidPhase {
                expected: "scoring",
                actual: "setup"
            }))
        ));
        assert_eq!(repo.appended_events().len(), 1);
    }

    #[tokio::test]
    async fn test_handle_check_deadline_appends_nothing_without_limit() {
        // Arrange
        let session_id = Uuid::new_v4();
        let clock = FixedClock(fixed_now());
        let repo = RecordingEventRepository::default();
        let correlation_id = Uuid::new_v4();
        handle_prepare_session(&prepare(session_id, language()), &mut MockRng, &clock, &repo)
            .await
            .unwrap();
        handle_start_session(
            &StartSession {
                correlation_id,
                session_id,
            },
            &clock,
            &repo,
        )
        .await
        .unwrap();

        // Act
        let result = handle_check_deadline(
            &CheckDeadline {
                correlation_id,
                session_id,
            },
            &clock,
            &repo,
        )
        .await
        .unwrap();

        // Assert
        assert!(result.stored_events.is_empty());
        assert_eq!(result.phase, SessionPhase::Active);
        assert_eq!(repo.appended_events().len(), 2);
    }

    #[tokio::test]
    async fn test_handle_abandon_session_closes_session_without_outcome() {
        // Arrange
        let session_id = Uuid::new_v4();
        let clock = FixedClock(fixed_now());
        let repo = MemoryEventRepository::new();
        handle_prepare_session(&prepare(session_id, language()), &mut MockRng, &clock, &repo)
            .await
            .unwrap();

        // Act
        let result = handle_abandon_session(
            &AbandonSession {
                correlation_id: Uuid::new_v4(),
                session_id,
            },
            &clock,
            &repo,
        )
        .await
        .unwrap();

        // Assert
        assert_eq!(result.phase, SessionPhase::Abandoned);
        assert!(result.outcome.is_none());
        assert_eq!(repo.event_count().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_preparing_same_session_twice_conflicts() {
        // Arrange
        let session_id = Uuid::new_v4();
        let clock = FixedClock(fixed_now());
        let repo = MemoryEventRepository::new();
        handle_prepare_session(&prepare(session_id, language()), &mut MockRng, &clock, &repo)
            .await
            .unwrap();

        // Act
        let result =
            handle_prepare_session(&prepare(session_id, language()), &mut MockRng, &clock, &repo)
                .await;

        // Assert
        assert!(matches!(
            result,
            Err(DomainError::ConcurrencyConflict { .. })
        ));
    }

    #[tokio::test]
    async fn test_replay_reproduces_outcome_without_rng() {
        // Arrange
        let session_id = Uuid::new_v4();
        let clock = FixedClock(fixed_now());
        let repo = MemoryEventRepository::new();
        let correlation_id = Uuid::new_v4();
        let content = validate(&json!({
            "type": "mental_arithmetic",
            "operandRange": [2, 12],
            "operators": ["x", "/"]
        }))
        .unwrap();
        let command = PrepareSession {
            correlation_id,
            session_id,
            content,
            settings: SessionSettings::new(3, None).unwrap(),
        };
        let mut rng = SeededRng::from_seed(11);
        handle_prepare_session(&command, &mut rng, &clock, &repo)
            .await
            .unwrap();
        handle_start_session(
            &StartSession {
                correlation_id,
                session_id,
            },
            &clock,
            &repo,
        )
        .await
        .unwrap();
        for value in [24, 3, 100] {
            handle_record_input(
                &RecordInput {
                    correlation_id,
                    session_id,
                    input: SessionInput::Answer { value },
                },
                &clock,
                &repo,
            )
            .await
            .unwrap();
        }
        let live = handle_finalize_session(
            &FinalizeSession {
                correlation_id,
                session_id,
            },
            &clock,
            &repo,
        )
        .await
        .unwrap();

        // Act
        let journal = repo.load_events(session_id).await.unwrap();
        let replayed = reconstitute(session_id, &journal).unwrap();

        // Assert
        assert_eq!(replayed.phase(), SessionPhase::Complete);
        assert_eq!(replayed.outcome(), live.outcome);
        assert_eq!(replayed.version(), 7);
    }

    #[tokio::test]
    async fn test_handle_prepare_session_propagates_repository_failure() {
        let clock = FixedClock(fixed_now());

        let result = handle_prepare_session(
            &prepare(Uuid::new_v4(), language()),
            &mut MockRng,
            &clock,
            &FailingEventRepository,
        )
        .await;

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }

    #[tokio::test]
    async fn test_handle_prepare_session_rejects_unplayable_content_without_appending() {
        // Arrange
        let content = validate(&json!({
            "type": "mental_arithmetic",
            "operandRange": [i64::MAX - 1, i64::MAX],
            "operators": ["+"]
        }))
        .unwrap();
        let clock = FixedClock(fixed_now());
        let repo = RecordingEventRepository::default();

        // Act
        let result =
            handle_prepare_session(&prepare(Uuid::new_v4(), content), &mut MockRng, &clock, &repo)
                .await;

        // Assert
        assert!(matches!(
            result,
            Err(DomainError::SessionState(SessionStateError::UnplayableContent(_)))
        ));
        assert!(repo.appended_events().is_empty());
    }
}

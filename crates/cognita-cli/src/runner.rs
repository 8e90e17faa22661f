//! Flow replay.
//!
//! Walks a flow document from its first step to a terminal phase the way a
//! host app would: content goes through the catalog loader, copy through
//! the translation resolver, and every game step runs a full session
//! through the session command handlers.

use std::sync::Arc;

use cognita_content::ContentVariant;
use cognita_content::application::catalog::{ContentCatalog, RejectedRecord, load_catalog};
use cognita_core::clock::Clock;
use cognita_core::error::{DomainError, SessionStateError};
use cognita_core::ports::TranslationRequest;
use cognita_core::rng::{DeterministicRng, SeededRng};
use cognita_event_store::MemoryEventRepository;
use cognita_flow::domain::policy::tolerate;
use cognita_flow::{
    Advance, FlowController, FlowPhase, StepContent, StepDefinition, StepSequencer, StepStatus,
};
use cognita_i18n::{load_translations, localizable_fields};
use cognita_session::application::command_handlers::{
    handle_abandon_session, handle_check_deadline, handle_finalize_session,
    handle_prepare_session, handle_record_input, handle_start_session,
};
use cognita_session::application::query_handlers::get_session_by_id;
use cognita_session::domain::commands::{
    AbandonSession, CheckDeadline, FinalizeSession, PrepareSession, RecordInput, StartSession,
};
use cognita_session::{Outcome, SessionInput, SessionPhase, SessionPlan, SessionSettings};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::flow_file::{FlowDocument, PlayScript};
use crate::sources::{CompletionRecord, DocumentBackend, ReportCompletionStore};

/// Step copy fields requested from the translation backend.
const COPY_FIELDS: [&str; 3] = ["headline", "subtext", "cta"];

/// Knobs for one replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayOptions {
    /// Locale to localize into.
    pub locale: String,
    /// Seed for session plans.
    pub seed: u64,
    /// Settings applied to every session.
    pub settings: SessionSettings,
}

impl From<&AppConfig> for ReplayOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            locale: config.locale.clone(),
            seed: config.seed,
            settings: config.settings,
        }
    }
}

/// How one game session ended.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    /// The session identifier.
    pub session_id: Uuid,
    /// Content discriminant.
    pub game: &'static str,
    /// Fingerprint of the content played.
    pub content_fingerprint: Option<String>,
    /// Terminal phase.
    pub phase: String,
    /// Inputs the session accepted.
    pub inputs_recorded: usize,
    /// Reasons for every input the session refused.
    pub rejected_inputs: Vec<String>,
    /// Score, when the session completed.
    pub outcome: Option<Outcome>,
    /// Events in the session's journal.
    pub events: i64,
}

/// What the replay saw on one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    /// Position of the step.
    pub index: usize,
    /// Rendering handler selector.
    pub kind: String,
    /// Localized heading.
    pub headline: String,
    /// Localized secondary text.
    pub subtext: String,
    /// Localized call-to-action label.
    pub cta: String,
    /// Content as shown, after localization.
    pub content: StepContent,
    /// The session played on this step, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionReport>,
}

/// The printed result of a replay.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    /// The flow instance.
    pub flow_id: Uuid,
    /// Locale the copy was resolved in.
    pub locale: String,
    /// Terminal phase of the flow.
    pub phase: FlowPhase,
    /// Final per-step status.
    pub statuses: Vec<StepStatus>,
    /// Steps visited, in order.
    pub steps: Vec<StepReport>,
    /// Whether the completion store accepted the flow's completion.
    pub completion_persisted: bool,
    /// Completions the store received.
    pub completions: Vec<CompletionRecord>,
    /// Hash over the accepted content.
    pub catalog_version: String,
    /// Content records that failed validation.
    pub rejected_content: Vec<RejectedRecord>,
    /// Content references that resolved to no accepted record.
    pub missing_content: Vec<String>,
    /// Flow event types, in order.
    pub events: Vec<String>,
}

/// Replays `document`.
///
/// # Errors
///
/// Returns `AppError::Domain` if the document has no steps, a port fails,
/// or a session handler fails for a reason other than a rejected input.
#[instrument(skip_all, fields(locale = %options.locale, steps = document.steps.len()))]
pub async fn replay(
    document: &FlowDocument,
    options: &ReplayOptions,
    clock: Arc<dyn Clock>,
) -> Result<ReplayReport, AppError> {
    let backend = DocumentBackend::new(document);
    let catalog = load_catalog(&backend, &document.category).await?;
    let (steps, missing_content) = build_steps(document, &catalog);
    let request = translation_request(document, &steps, &options.locale);
    let translations = load_translations(&backend, &request).await?;

    let flow_id = document.flow_id.unwrap_or_else(Uuid::new_v4);
    let sequencer =
        StepSequencer::new(flow_id, steps, Arc::clone(&clock)).map_err(DomainError::from)?;
    let store = Arc::new(ReportCompletionStore::default());
    let mut controller = FlowController::new(sequencer, store.clone());
    let mut rng = SeededRng::from_seed(options.seed);
    let mut step_reports = Vec::with_capacity(document.steps.len());

    loop {
        let index = controller.sequencer().current_index();
        let view = controller.sequencer().current_view(&translations);
        let interactive = controller.sequencer().current_step().is_interactive();
        let script = &document.steps[index].script;

        let session = match &view.content {
            StepContent::Variant(variant) => Some(
                play_session(variant, script, options.settings, &mut rng, clock.as_ref()).await?,
            ),
            StepContent::None | StepContent::Config(_) => None,
        };
        // An abandon script leaves the flow even when the game had nothing
        // to play and scored itself.
        let walk_away = *script == PlayScript::Abandon
            || session
                .as_ref()
                .is_some_and(|report| report.phase != SessionPhase::Complete.name());

        let sequencer = controller.sequencer_mut();
        let proceed = if walk_away {
            tolerate(sequencer.abandon());
            false
        } else {
            if interactive {
                tolerate(sequencer.set_readiness(index, true));
            }
            match tolerate(sequencer.advance()) {
                Some(Advance::Moved(_)) => true,
                Some(Advance::Finished) => false,
                None => {
                    warn!(index, "flow stalled on a step that is not ready");
                    false
                }
            }
        };

        step_reports.push(StepReport {
            index,
            kind: view.kind,
            headline: view.headline,
            subtext: view.subtext,
            cta: view.cta,
            content: view.content,
            session,
        });
        controller.commit().await?;
        if !proceed {
            break;
        }
    }

    let sequencer = controller.sequencer();
    let report = ReplayReport {
        flow_id,
        locale: options.locale.clone(),
        phase: sequencer.phase(),
        statuses: sequencer.statuses().to_vec(),
        steps: step_reports,
        completion_persisted: controller.completion_persisted(),
        completions: store.records()?,
        catalog_version: catalog.version_hash,
        rejected_content: catalog.rejected,
        missing_content,
        events: controller
            .journal()
            .iter()
            .map(|event| event.metadata.event_type.clone())
            .collect(),
    };
    info!(
        %flow_id,
        phase = ?report.phase,
        visited = report.steps.len(),
        completion_persisted = report.completion_persisted,
        "replay finished"
    );
    Ok(report)
}

/// Builds step definitions, falling back to no content for references the
/// catalog does not hold.
fn build_steps(
    document: &FlowDocument,
    catalog: &ContentCatalog,
) -> (Vec<StepDefinition>, Vec<String>) {
    let mut missing = Vec::new();
    let steps = document
        .steps
        .iter()
        .map(|doc| {
            let mut step = match doc.content_ref.as_deref() {
                Some(entity_id) => match catalog.get(entity_id) {
                    Some(variant) => StepDefinition::game(&doc.kind, variant.clone()),
                    None => {
                        warn!(
                            entity_id,
                            kind = %doc.kind,
                            "content unavailable, showing step without it"
                        );
                        missing.push(entity_id.to_owned());
                        StepDefinition::presentational(&doc.kind)
                    }
                },
                None => StepDefinition::presentational(&doc.kind),
            }
            .with_copy(doc.copy.clone());
            if let Some(entity_id) = &doc.entity_id {
                step = step.with_entity_id(entity_id);
            }
            if let (Some(config), None) = (&doc.config, step.variant()) {
                step = step.with_config(config.clone());
            }
            if doc.validation_required {
                step = step.requiring_validation();
            }
            step
        })
        .collect();
    (steps, missing)
}

fn translation_request(
    document: &FlowDocument,
    steps: &[StepDefinition],
    locale: &str,
) -> TranslationRequest {
    let mut entity_ids: Vec<String> = Vec::new();
    let mut fields: Vec<String> = COPY_FIELDS.iter().map(|f| (*f).to_owned()).collect();
    for step in steps {
        if let Some(entity_id) = &step.entity_id {
            if !entity_ids.contains(entity_id) {
                entity_ids.push(entity_id.clone());
            }
        }
        for field in step.variant().map(localizable_fields).unwrap_or_default() {
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
    }
    TranslationRequest {
        entity_type: document.entity_type.clone(),
        entity_ids,
        fields,
        locale: locale.to_owned(),
    }
}

/// Runs one session for `variant` to a terminal phase.
#[instrument(skip_all, fields(game = variant.tag()))]
async fn play_session(
    variant: &ContentVariant,
    script: &PlayScript,
    settings: SessionSettings,
    rng: &mut dyn DeterministicRng,
    clock: &dyn Clock,
) -> Result<SessionReport, AppError> {
    let repo = MemoryEventRepository::new();
    let session_id = Uuid::new_v4();
    let correlation_id = Uuid::new_v4();

    let prepare = PrepareSession {
        correlation_id,
        session_id,
        content: variant.clone(),
        settings,
    };
    handle_prepare_session(&prepare, rng, clock, &repo).await?;
    let start = StartSession {
        correlation_id,
        session_id,
    };
    let mut phase = handle_start_session(&start, clock, &repo).await?.phase;

    let mut rejected_inputs = Vec::new();
    if *script == PlayScript::Abandon && phase == SessionPhase::Active {
        phase = abandon(session_id, correlation_id, clock, &repo).await?;
    } else {
        let inputs = match script {
            PlayScript::Inputs { inputs } => inputs.clone(),
            PlayScript::Perfect | PlayScript::Abandon => {
                let view = get_session_by_id(session_id, &repo).await?;
                view.plan.as_ref().map(perfect_inputs).unwrap_or_default()
            }
        };
        for input in inputs {
            if phase != SessionPhase::Active {
                break;
            }
            let command = RecordInput {
                correlation_id,
                session_id,
                input,
            };
            match handle_record_input(&command, clock, &repo).await {
                Ok(result) => phase = result.phase,
                Err(DomainError::SessionState(SessionStateError::InputRejected(reason))) => {
                    warn!(%session_id, %reason, "input rejected");
                    rejected_inputs.push(reason);
                }
                Err(e) => return Err(e.into()),
            }
        }
        if phase == SessionPhase::Active {
            let check = CheckDeadline {
                correlation_id,
                session_id,
            };
            phase = handle_check_deadline(&check, clock, &repo).await?.phase;
        }
        if phase == SessionPhase::Active {
            warn!(%session_id, "script ran out of inputs, abandoning session");
            phase = abandon(session_id, correlation_id, clock, &repo).await?;
        }
        if phase == SessionPhase::Scoring {
            let finalize = FinalizeSession {
                correlation_id,
                session_id,
            };
            handle_finalize_session(&finalize, clock, &repo).await?;
        }
    }

    let view = get_session_by_id(session_id, &repo).await?;
    Ok(SessionReport {
        session_id,
        game: variant.tag(),
        content_fingerprint: view.content_fingerprint,
        phase: view.phase,
        inputs_recorded: view.inputs_recorded,
        rejected_inputs,
        outcome: view.outcome,
        events: view.version,
    })
}

async fn abandon(
    session_id: Uuid,
    correlation_id: Uuid,
    clock: &dyn Clock,
    repo: &MemoryEventRepository,
) -> Result<SessionPhase, AppError> {
    let command = AbandonSession {
        correlation_id,
        session_id,
    };
    Ok(handle_abandon_session(&command, clock, repo).await?.phase)
}

/// The inputs that answer every part of `plan` correctly.
#[must_use]
pub fn perfect_inputs(plan: &SessionPlan) -> Vec<SessionInput> {
    match plan {
        SessionPlan::Arithmetic { problems } => problems
            .iter()
            .map(|problem| SessionInput::Answer {
                value: problem.answer,
            })
            .collect(),
        SessionPlan::Matrix { targets, .. } => targets
            .iter()
            .map(|cell| SessionInput::Cell {
                row: cell.row,
                col: cell.col,
            })
            .collect(),
        SessionPlan::Language { answer_index, .. } => vec![SessionInput::Choice {
            index: *answer_index,
        }],
    }
}

//! Flow documents.
//!
//! A flow document bundles everything a replay needs: the raw content
//! records the backend would serve, the ordered steps, translation rows per
//! locale and a play script for each step.

use std::collections::BTreeMap;
use std::path::Path;

use cognita_core::ports::{RawContentRecord, TranslationRow};
use cognita_flow::StepCopy;
use cognita_session::SessionInput;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;

/// Content category fetched when the document names none.
pub const DEFAULT_CATEGORY: &str = "onboarding";

/// Translation entity type requested when the document names none.
pub const DEFAULT_ENTITY_TYPE: &str = "onboarding_step";

/// Serialization format of a flow document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowFormat {
    /// `.yaml` or `.yml`.
    Yaml,
    /// `.json`.
    Json,
}

impl FlowFormat {
    /// Picks the format from the file extension.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` for any other extension.
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            _ => Err(AppError::Config(format!(
                "flow file must end in .yaml, .yml or .json: {}",
                path.display()
            ))),
        }
    }
}

/// How the replay plays a step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case", tag = "play")]
pub enum PlayScript {
    /// Ready presentational steps; answer games perfectly.
    #[default]
    Perfect,
    /// Walk away from the step, abandoning the flow.
    Abandon,
    /// Submit these inputs in order.
    Inputs {
        /// The inputs.
        inputs: Vec<SessionInput>,
    },
}

/// One step as written in the document.
#[derive(Debug, Clone, Deserialize)]
pub struct StepDocument {
    /// Rendering handler selector.
    pub kind: String,
    /// Translation entity key.
    #[serde(default)]
    pub entity_id: Option<String>,
    /// Base copy.
    #[serde(default)]
    pub copy: StepCopy,
    /// Entity ID of a content record to play on this step.
    #[serde(default)]
    pub content_ref: Option<String>,
    /// Free-form renderer configuration.
    #[serde(default)]
    pub config: Option<serde_json::Value>,
    /// Whether the step gates on readiness.
    #[serde(default)]
    pub validation_required: bool,
    /// How the replay plays the step.
    #[serde(default)]
    pub script: PlayScript,
}

/// A parsed flow document.
#[derive(Debug, Clone, Deserialize)]
pub struct FlowDocument {
    /// Flow instance ID; generated when absent.
    #[serde(default)]
    pub flow_id: Option<Uuid>,
    /// Content category the records belong to.
    #[serde(default = "default_category")]
    pub category: String,
    /// Entity type used for translation lookups.
    #[serde(default = "default_entity_type")]
    pub entity_type: String,
    /// Raw, unvalidated content records.
    #[serde(default)]
    pub content: Vec<RawContentRecord>,
    /// The steps, in order.
    pub steps: Vec<StepDocument>,
    /// Translation rows keyed by locale.
    #[serde(default)]
    pub translations: BTreeMap<String, Vec<TranslationRow>>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_owned()
}

fn default_entity_type() -> String {
    DEFAULT_ENTITY_TYPE.to_owned()
}

impl FlowDocument {
    /// Parses `text` in `format`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Parse` if the text does not describe a flow.
    pub fn parse(text: &str, format: FlowFormat) -> Result<Self, AppError> {
        let parsed = match format {
            FlowFormat::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
            FlowFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
        };
        parsed.map_err(AppError::Parse)
    }

    /// Reads and parses the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` for an unsupported extension,
    /// `AppError::Io` if the file cannot be read, or `AppError::Parse`.
    pub async fn load(path: &Path) -> Result<Self, AppError> {
        let format = FlowFormat::from_path(path)?;
        let text = tokio::fs::read_to_string(path).await?;
        Self::parse(&text, format)
    }
}

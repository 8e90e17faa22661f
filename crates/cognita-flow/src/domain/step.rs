//! Step definitions.

use cognita_content::ContentVariant;
use serde::{Deserialize, Serialize};

/// Base, untranslated copy shown on a step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepCopy {
    /// Primary heading.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    /// Secondary text under the heading.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtext: Option<String>,
    /// Label of the call-to-action button.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cta: Option<String>,
}

/// What a step carries besides its copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum StepContent {
    /// Nothing beyond the copy.
    #[default]
    None,
    /// Free-form configuration handed to the step's renderer.
    Config(serde_json::Value),
    /// A validated game.
    Variant(ContentVariant),
}

/// One step of a flow.
///
/// Identity is position in the flow; definitions are immutable once a
/// sequencer owns them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepDefinition {
    /// Selects the rendering handler, e.g. `welcome` or `paywall`.
    pub kind: String,
    /// Translation entity key for this step's copy and content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    /// Untranslated copy.
    pub copy: StepCopy,
    /// Attached content.
    pub content: StepContent,
    /// Whether the step must report readiness before the flow moves on.
    pub validation_required: bool,
}

impl StepDefinition {
    /// A step with no content and no gating.
    #[must_use]
    pub fn presentational(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            entity_id: None,
            copy: StepCopy::default(),
            content: StepContent::None,
            validation_required: false,
        }
    }

    /// A step that plays `variant`.
    #[must_use]
    pub fn game(kind: impl Into<String>, variant: ContentVariant) -> Self {
        Self {
            content: StepContent::Variant(variant),
            ..Self::presentational(kind)
        }
    }

    /// Sets the translation entity key.
    #[must_use]
    pub fn with_entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Sets the base copy.
    #[must_use]
    pub fn with_copy(mut self, copy: StepCopy) -> Self {
        self.copy = copy;
        self
    }

    /// Attaches renderer configuration.
    #[must_use]
    pub fn with_config(mut self, config: serde_json::Value) -> Self {
        self.content = StepContent::Config(config);
        self
    }

    /// Marks the step as gated on readiness.
    #[must_use]
    pub fn requiring_validation(mut self) -> Self {
        self.validation_required = true;
        self
    }

    /// The game attached to this step, if any.
    #[must_use]
    pub fn variant(&self) -> Option<&ContentVariant> {
        match &self.content {
            StepContent::Variant(variant) => Some(variant),
            StepContent::None | StepContent::Config(_) => None,
        }
    }

    /// Interactive steps gate progress; they start out not ready.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.validation_required || self.variant().is_some()
    }
}

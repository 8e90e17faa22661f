//! Ports to the external collaborators the core calls but never implements.
//!
//! Fetching content, fetching translations and recording flow completion
//! all happen behind these traits. Implementations own transport, retries
//! and storage; the core only sees the data they hand back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// One unvalidated content record as delivered by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawContentRecord {
    /// Identifier of the content entity; also the translation entity key.
    pub entity_id: String,
    /// The untrusted payload, validated before any use.
    pub payload: serde_json::Value,
}

/// One localized string for one field of one content entity.
///
/// Rows handed to the core are already filtered to a single locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRow {
    /// The entity the text belongs to.
    pub entity_id: String,
    /// The field of that entity being translated.
    pub field: String,
    /// The localized text. May be empty.
    pub text: String,
}

/// Parameters of a translation lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    /// Kind of entity being translated, e.g. `onboarding_step` or `game`.
    pub entity_type: String,
    /// Entities whose text is wanted.
    pub entity_ids: Vec<String>,
    /// Fields whose text is wanted.
    pub fields: Vec<String>,
    /// Target locale, e.g. `es`.
    pub locale: String,
}

/// Fetches raw content records for a category.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Returns every raw record in `category`, in backend order.
    async fn fetch_content(&self, category: &str) -> Result<Vec<RawContentRecord>, DomainError>;
}

/// Fetches translation rows for exactly one locale.
#[async_trait]
pub trait TranslationSource: Send + Sync {
    /// Returns the rows matching `request`. Missing rows are not an error.
    async fn fetch_translations(
        &self,
        request: &TranslationRequest,
    ) -> Result<Vec<TranslationRow>, DomainError>;
}

/// Durable record that a flow was completed.
#[async_trait]
pub trait CompletionStore: Send + Sync {
    /// Marks `flow_id` complete. Called once per finished flow.
    async fn mark_complete(
        &self,
        flow_id: Uuid,
        completed_at: DateTime<Utc>,
    ) -> Result<(), DomainError>;
}

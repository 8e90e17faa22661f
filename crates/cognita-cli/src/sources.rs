//! Port implementations backed by a loaded flow document.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cognita_core::error::DomainError;
use cognita_core::ports::{
    CompletionStore, ContentSource, RawContentRecord, TranslationRequest, TranslationRow,
    TranslationSource,
};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::flow_file::FlowDocument;

/// Serves a document's content records and translation rows as the backend
/// would.
#[derive(Debug)]
pub struct DocumentBackend<'a> {
    document: &'a FlowDocument,
}

impl<'a> DocumentBackend<'a> {
    /// Wraps `document`.
    #[must_use]
    pub fn new(document: &'a FlowDocument) -> Self {
        Self { document }
    }
}

#[async_trait]
impl ContentSource for DocumentBackend<'_> {
    async fn fetch_content(&self, category: &str) -> Result<Vec<RawContentRecord>, DomainError> {
        if category != self.document.category {
            debug!(category, "no content for category");
            return Ok(Vec::new());
        }
        Ok(self.document.content.clone())
    }
}

#[async_trait]
impl TranslationSource for DocumentBackend<'_> {
    async fn fetch_translations(
        &self,
        request: &TranslationRequest,
    ) -> Result<Vec<TranslationRow>, DomainError> {
        if request.entity_type != self.document.entity_type {
            return Ok(Vec::new());
        }
        let Some(rows) = self.document.translations.get(&request.locale) else {
            debug!(locale = %request.locale, "no translations for locale");
            return Ok(Vec::new());
        };
        Ok(rows
            .iter()
            .filter(|row| request.entity_ids.contains(&row.entity_id))
            .filter(|row| request.fields.contains(&row.field))
            .cloned()
            .collect())
    }
}

/// A completion recorded by [`ReportCompletionStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionRecord {
    /// The finished flow.
    pub flow_id: Uuid,
    /// When it finished.
    pub completed_at: DateTime<Utc>,
}

/// Keeps completions in memory so they can be printed in the report.
#[derive(Debug, Default)]
pub struct ReportCompletionStore {
    records: Mutex<Vec<CompletionRecord>>,
}

impl ReportCompletionStore {
    /// Returns the completions recorded so far.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the lock is poisoned.
    pub fn records(&self) -> Result<Vec<CompletionRecord>, DomainError> {
        self.records
            .lock()
            .map(|records| records.clone())
            .map_err(|e| DomainError::Infrastructure(format!("lock poisoned: {e}")))
    }
}

#[async_trait]
impl CompletionStore for ReportCompletionStore {
    async fn mark_complete(
        &self,
        flow_id: Uuid,
        completed_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let mut records = self
            .records
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("lock poisoned: {e}")))?;
        records.push(CompletionRecord {
            flow_id,
            completed_at,
        });
        Ok(())
    }
}

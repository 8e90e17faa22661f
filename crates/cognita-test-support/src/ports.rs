//! Fake external collaborators for the content, translation and completion
//! ports.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cognita_core::error::DomainError;
use cognita_core::ports::{
    CompletionStore, ContentSource, RawContentRecord, TranslationRequest, TranslationRow,
    TranslationSource,
};
use uuid::Uuid;

/// Serves the same records for every category.
#[derive(Debug, Default)]
pub struct StaticContentSource {
    records: Vec<RawContentRecord>,
}

impl StaticContentSource {
    /// Builds a source from `(entity_id, payload)` pairs.
    #[must_use]
    pub fn new(records: Vec<(&str, serde_json::Value)>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|(entity_id, payload)| RawContentRecord {
                    entity_id: entity_id.to_owned(),
                    payload,
                })
                .collect(),
        }
    }
}

#[async_trait]
impl ContentSource for StaticContentSource {
    async fn fetch_content(&self, _category: &str) -> Result<Vec<RawContentRecord>, DomainError> {
        Ok(self.records.clone())
    }
}

/// Serves fixed rows and remembers every request it was given.
#[derive(Debug, Default)]
pub struct StaticTranslationSource {
    rows: Vec<TranslationRow>,
    requests: Mutex<Vec<TranslationRequest>>,
}

impl StaticTranslationSource {
    /// Builds a source from `(entity_id, field, text)` triples.
    #[must_use]
    pub fn new(rows: &[(&str, &str, &str)]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|(entity_id, field, text)| TranslationRow {
                    entity_id: (*entity_id).to_owned(),
                    field: (*field).to_owned(),
                    text: (*text).to_owned(),
                })
                .collect(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Returns the requests received so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn requests(&self) -> Vec<TranslationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranslationSource for StaticTranslationSource {
    async fn fetch_translations(
        &self,
        request: &TranslationRequest,
    ) -> Result<Vec<TranslationRow>, DomainError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.rows.clone())
    }
}

/// Records every completion it is asked to persist.
#[derive(Debug, Default)]
pub struct RecordingCompletionStore {
    completions: Mutex<Vec<(Uuid, DateTime<Utc>)>>,
}

impl RecordingCompletionStore {
    /// Returns the completions recorded so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn completions(&self) -> Vec<(Uuid, DateTime<Utc>)> {
        self.completions.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionStore for RecordingCompletionStore {
    async fn mark_complete(
        &self,
        flow_id: Uuid,
        completed_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.completions
            .lock()
            .unwrap()
            .push((flow_id, completed_at));
        Ok(())
    }
}

/// A backend that is down: every port call fails with an infrastructure
/// error.
#[derive(Debug)]
pub struct UnavailableBackend;

fn unavailable() -> DomainError {
    DomainError::Infrastructure("backend unavailable".into())
}

#[async_trait]
impl ContentSource for UnavailableBackend {
    async fn fetch_content(&self, _category: &str) -> Result<Vec<RawContentRecord>, DomainError> {
        Err(unavailable())
    }
}

#[async_trait]
impl TranslationSource for UnavailableBackend {
    async fn fetch_translations(
        &self,
        _request: &TranslationRequest,
    ) -> Result<Vec<TranslationRow>, DomainError> {
        Err(unavailable())
    }
}

#[async_trait]
impl CompletionStore for UnavailableBackend {
    async fn mark_complete(
        &self,
        _flow_id: Uuid,
        _completed_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        Err(unavailable())
    }
}

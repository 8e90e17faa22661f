//! Content catalog loading.
//!
//! Fetches raw records from the backend, validates each one and keeps the
//! ones that pass. A rejected record never fails the load; it is logged and
//! reported alongside the accepted entries so callers can fall back to a
//! default or empty state for it.

use cognita_core::error::{DomainError, ValidationError};
use cognita_core::ports::{ContentSource, RawContentRecord};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{info, instrument, warn};

use crate::domain::validation::validate;
use crate::domain::variant::ContentVariant;

/// A validated content record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentEntry {
    /// Identifier of the content entity.
    pub entity_id: String,
    /// The validated content.
    pub variant: ContentVariant,
}

/// A record that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRecord {
    /// Identifier of the content entity.
    pub entity_id: String,
    /// Why it was rejected.
    #[serde(serialize_with = "serialize_error")]
    pub error: ValidationError,
}

fn serialize_error<S: serde::Serializer>(
    error: &ValidationError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// The validated content of one category.
#[derive(Debug, Clone, Serialize)]
pub struct ContentCatalog {
    /// The category the records were fetched for.
    pub category: String,
    /// Accepted records, in backend order.
    pub entries: Vec<ContentEntry>,
    /// Rejected records, in backend order.
    pub rejected: Vec<RejectedRecord>,
    /// Hex SHA-256 over the accepted entries.
    pub version_hash: String,
}

impl ContentCatalog {
    /// Validates `records` into a catalog.
    #[must_use]
    pub fn from_records(category: &str, records: &[RawContentRecord]) -> Self {
        let mut entries = Vec::with_capacity(records.len());
        let mut rejected = Vec::new();
        let mut hasher = Sha256::new();

        for record in records {
            match validate(&record.payload) {
                Ok(variant) => {
                    hasher.update(record.entity_id.as_bytes());
                    hasher.update([0]);
                    hasher.update(variant.fingerprint().as_bytes());
                    entries.push(ContentEntry {
                        entity_id: record.entity_id.clone(),
                        variant,
                    });
                }
                Err(error) => {
                    warn!(
                        entity_id = %record.entity_id,
                        field = error.field().unwrap_or("type"),
                        %error,
                        "rejecting invalid content record"
                    );
                    rejected.push(RejectedRecord {
                        entity_id: record.entity_id.clone(),
                        error,
                    });
                }
            }
        }

        Self {
            category: category.to_owned(),
            entries,
            rejected,
            version_hash: format!("{:x}", hasher.finalize()),
        }
    }

    /// Looks up an accepted entry by entity ID.
    #[must_use]
    pub fn get(&self, entity_id: &str) -> Option<&ContentVariant> {
        self.entries
            .iter()
            .find(|entry| entry.entity_id == entity_id)
            .map(|entry| &entry.variant)
    }
}

/// Fetches and validates every record in `category`.
///
/// # Errors
///
/// Returns the source's `DomainError` if the fetch fails. Validation
/// failures are never errors here.
#[instrument(skip(source))]
pub async fn load_catalog(
    source: &dyn ContentSource,
    category: &str,
) -> Result<ContentCatalog, DomainError> {
    let records = source.fetch_content(category).await?;
    let catalog = ContentCatalog::from_records(category, &records);

    info!(
        accepted = catalog.entries.len(),
        rejected = catalog.rejected.len(),
        version_hash = %catalog.version_hash,
        "content catalog loaded"
    );

    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cognita_test_support::{StaticContentSource, UnavailableBackend};
    use serde_json::json;

    fn matrix(target_count: u32) -> serde_json::Value {
        json!({
            "type": "memory_matrix",
            "gridSize": { "rows": 2, "cols": 2 },
            "targetCount": target_count,
            "displayTimeMs": 1500
        })
    }

    #[tokio::test]
    async fn test_load_catalog_keeps_valid_and_sets_aside_invalid_records() {
        // Arrange
        let source = StaticContentSource::new(vec![
            ("game-1", matrix(3)),
            ("game-2", matrix(9)),
            ("game-3", json!({ "type": "mental_arithmetic" })),
        ]);

        // Act
        let catalog = load_catalog(&source, "daily").await.unwrap();

        // Assert
        assert_eq!(catalog.category, "daily");
        let ids: Vec<&str> = catalog.entries.iter().map(|e| e.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["game-1", "game-3"]);
        assert_eq!(catalog.rejected.len(), 1);
        assert_eq!(catalog.rejected[0].entity_id, "game-2");
        assert_eq!(catalog.rejected[0].error.field(), Some("targetCount"));
        assert!(catalog.get("game-2").is_none());
        assert!(catalog.get("game-3").is_some());
    }

    #[tokio::test]
    async fn test_load_catalog_propagates_source_failure() {
        let result = load_catalog(&UnavailableBackend, "daily").await;

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }

    #[test]
    fn test_version_hash_ignores_rejected_records_but_tracks_accepted_ones() {
        let base = [RawContentRecord {
            entity_id: "game-1".to_owned(),
            payload: matrix(1),
        }];
        let with_rejected = [
            base[0].clone(),
            RawContentRecord {
                entity_id: "bad".to_owned(),
                payload: json!({ "type": "nope" }),
            },
        ];
        let changed = [RawContentRecord {
            entity_id: "game-1".to_owned(),
            payload: matrix(2),
        }];

        let a = ContentCatalog::from_records("c", &base);
        let b = ContentCatalog::from_records("c", &with_rejected);
        let c = ContentCatalog::from_records("c", &changed);

        assert_eq!(a.version_hash, b.version_hash);
        assert_ne!(a.version_hash, c.version_hash);
    }

    #[test]
    fn test_rejected_record_serializes_error_message() {
        let catalog = ContentCatalog::from_records(
            "c",
            &[RawContentRecord {
                entity_id: "bad".to_owned(),
                payload: json!({}),
            }],
        );

        let json = serde_json::to_value(&catalog).unwrap();

        assert_eq!(
            json["rejected"][0]["error"],
            "unknown content variant: <missing>"
        );
    }
}

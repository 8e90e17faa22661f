//! In-memory implementation of the `EventRepository` trait.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use cognita_core::error::DomainError;
use cognita_core::repository::{EventRepository, StoredEvent};

/// Event repository that keeps every stream in a process-local map.
///
/// Appends are checked against the stream length, so two writers that
/// loaded the same version cannot both succeed.
#[derive(Debug, Default)]
pub struct MemoryEventRepository {
    streams: RwLock<HashMap<Uuid, Vec<StoredEvent>>>,
}

impl MemoryEventRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of events across all streams.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the lock is poisoned.
    pub fn event_count(&self) -> Result<usize, DomainError> {
        let streams = self.streams.read().map_err(poisoned)?;
        Ok(streams.values().map(Vec::len).sum())
    }
}

fn poisoned<T>(_: T) -> DomainError {
    DomainError::Infrastructure("event store lock poisoned".to_owned())
}

#[async_trait]
impl EventRepository for MemoryEventRepository {
    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        let streams = self.streams.read().map_err(poisoned)?;
        Ok(streams.get(&aggregate_id).cloned().unwrap_or_default())
    }

    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        let mut streams = self.streams.write().map_err(poisoned)?;
        let stream = streams.entry(aggregate_id).or_default();

        let actual = i64::try_from(stream.len())
            .map_err(|e| DomainError::Infrastructure(format!("stream too long: {e}")))?;
        if actual != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                aggregate_id,
                expected: expected_version,
                actual,
            });
        }

        let mut expected_sequence = actual;
        for event in events {
            expected_sequence += 1;
            if event.aggregate_id != aggregate_id || event.sequence_number != expected_sequence {
                return Err(DomainError::Infrastructure(format!(
                    "event {} does not continue stream {aggregate_id} at sequence {expected_sequence}",
                    event.event_id
                )));
            }
        }

        stream.extend_from_slice(events);
        debug!(%aggregate_id, appended = events.len(), version = stream.len(), "events appended");
        Ok(())
    }
}

//! Cognita event store.
//!
//! Provides the `EventRepository` implementation used by the replay tool
//! and by embedders that keep session journals in process.

pub mod memory_event_repository;

pub use memory_event_repository::MemoryEventRepository;

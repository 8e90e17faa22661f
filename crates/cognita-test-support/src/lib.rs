//! Shared test mocks and utilities for the Cognita engine.

mod clock;
mod ports;
mod repository;
mod rng;

pub use clock::{FixedClock, ManualClock, fixed_now};
pub use ports::{
    RecordingCompletionStore, StaticContentSource, StaticTranslationSource, UnavailableBackend,
};
pub use repository::{EmptyEventRepository, FailingEventRepository, RecordingEventRepository};
pub use rng::{MockRng, SequenceRng};

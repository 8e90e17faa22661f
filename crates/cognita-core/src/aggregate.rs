//! Aggregate root abstraction.

use uuid::Uuid;

use crate::event::DomainEvent;

/// Trait for state machines whose history is a stream of domain events.
///
/// Implementors raise events through their own command methods, apply each
/// event to themselves immediately, and buffer it until the owner drains
/// the buffer. Reconstitution replays stored events through [`apply`].
///
/// [`apply`]: AggregateRoot::apply
pub trait AggregateRoot: Send + Sync {
    /// The event type this aggregate produces and consumes.
    type Event: DomainEvent;

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Returns the current version (number of events applied).
    fn version(&self) -> i64;

    /// Apply an event to mutate internal state.
    fn apply(&mut self, event: &Self::Event);

    /// Returns events raised since the last drain.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Removes and returns the events raised since the last drain.
    fn take_uncommitted_events(&mut self) -> Vec<Self::Event>;

    /// Version the event store holds before the uncommitted events land.
    #[allow(clippy::cast_possible_wrap)]
    fn committed_version(&self) -> i64 {
        self.version() - self.uncommitted_events().len() as i64
    }
}

//! Domain layer for the flow context.

pub mod events;
pub mod policy;
pub mod sequencer;
pub mod step;

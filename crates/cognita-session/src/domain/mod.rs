//! Domain layer for the session context.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod input;
pub mod plan;
pub mod scoring;
pub mod settings;

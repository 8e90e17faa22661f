//! Cognita Core — shared domain abstractions.
//!
//! This crate defines the traits and types that the content, translation,
//! flow and session contexts all depend on: the error taxonomy, the
//! determinism seams (clock and RNG), the event-sourcing primitives and the
//! ports through which the core reaches external collaborators. It contains
//! no infrastructure code.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod ports;
pub mod repository;
pub mod rng;

//! Application layer for the translation context.

pub mod loader;

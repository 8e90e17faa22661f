//! Domain layer for the translation context.

pub mod overlay;
pub mod translation;

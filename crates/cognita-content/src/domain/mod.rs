//! Domain layer for the content context.

pub mod validation;
pub mod variant;

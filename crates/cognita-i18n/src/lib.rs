//! Cognita — Translation Resolver.
//!
//! Folds locale-filtered translation rows into a lookup map and resolves
//! displayable text against it with a fixed three-tier fallback: the
//! translated text, then the caller's fallback, then the empty string.

pub mod application;
pub mod domain;

pub use cognita_core::ports::TranslationRow;
pub use domain::translation::{TranslationMap, build_map, resolve};
pub use domain::overlay::{localizable_fields, localize_variant};
pub use application::loader::load_translations;

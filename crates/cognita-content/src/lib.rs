//! Cognita — Content Schema & Validator.
//!
//! Turns untrusted content records into a closed set of typed game
//! variants and assembles validated records into versioned catalogs.

pub mod application;
pub mod domain;

pub use domain::validation::validate;
pub use domain::variant::ContentVariant;

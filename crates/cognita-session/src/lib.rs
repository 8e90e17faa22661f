//! Cognita — Session Engine.
//!
//! Drives one validated game through `Setup → Active → Scoring` to a
//! terminal `Complete` or `Abandoned` phase. The session plan is derived
//! once from the content and a seeded RNG and recorded in the journal, so
//! replaying a session's events reproduces its outcome exactly.

pub mod application;
pub mod domain;

pub use domain::aggregates::{GameSession, SessionPhase};
pub use domain::input::SessionInput;
pub use domain::plan::SessionPlan;
pub use domain::scoring::Outcome;
pub use domain::settings::SessionSettings;

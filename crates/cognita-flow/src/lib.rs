//! Cognita — Step Sequencer.
//!
//! Owns an ordered list of step definitions for one flow instance, gates
//! forward progress on the current step's readiness, and reports every
//! transition as a flow event. The [`FlowController`] turns the terminal
//! `FlowFinished` event into exactly one durable completion record.
//!
//! [`FlowController`]: application::controller::FlowController

pub mod application;
pub mod domain;

pub use application::controller::FlowController;
pub use domain::sequencer::{Advance, FlowPhase, StepSequencer, StepStatus, StepView};
pub use domain::step::{StepContent, StepCopy, StepDefinition};

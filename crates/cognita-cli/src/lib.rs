//! Cognita replay tool.
//!
//! Loads a flow document, validates and localizes its content, dry-runs the
//! flow and every game on it, and reports what a learner would have seen.

pub mod config;
pub mod error;
pub mod flow_file;
pub mod runner;
pub mod sources;

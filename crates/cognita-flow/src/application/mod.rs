//! Application layer for the flow context.

pub mod controller;

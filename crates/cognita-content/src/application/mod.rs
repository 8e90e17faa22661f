//! Application layer for the content context.

pub mod catalog;

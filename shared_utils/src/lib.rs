//! Small utilities shared across the workspace crates.

pub mod config;
pub mod env;

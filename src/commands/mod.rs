//! Commands module - CLI command implementations.

pub mod jobs;
pub mod serve;

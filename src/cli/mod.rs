//! CLI module - Command-line interface for the application.
//!
//! - `serve` - Start the HTTP server
//! - `jobs` - Email queue worker and maintenance

pub mod args;

pub use args::{Cli, Commands};

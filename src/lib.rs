//! Uplin API - business-services backend.
//!
//! Users buy plans that grant credit buckets and consultancy-hour pools. Searches spend
//! credits when finalized and consultations spend hours when booked; eliminating either
//! returns what it took. Every balance movement commits together with the request that
//! caused it.
//!
//! # Architecture Layers
//!
//! - **cli** / **commands**: command-line entry points (`serve`, `jobs`)
//! - **config**: environment configuration and constants
//! - **domain**: entities and the pure ledger rules
//! - **services**: use cases; `services::ledger` walks balances inside a transaction
//! - **infra**: SeaORM persistence, unit of work, Redis
//! - **jobs**: apalis email queue
//! - **api**: axum handlers, middleware, routes and OpenAPI
//! - **types**: response envelope and pagination
//! - **errors**: centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Apply migrations and start the server
//! uplin-api serve --port 3000
//!
//! # Drain the email queue
//! uplin-api jobs work
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod jobs;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Actor, Password, User, UserRole};
pub use errors::{AppError, AppResult};
pub use infra::{Cache, Database};

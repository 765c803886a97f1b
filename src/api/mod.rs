//! API layer - HTTP handlers and middleware
//!
//! Routes live under `/api`; sessions come from the `token` cookie or a bearer header,
//! and every JSON body is validated before it reaches a service.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;

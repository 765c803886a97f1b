//! HTTP request handlers.

pub mod auth_handler;
pub mod company_handler;
pub mod consultation_handler;
pub mod credit_handler;
pub mod hour_handler;
pub mod plan_handler;
pub mod search_handler;
pub mod user_handler;

pub use company_handler::company_routes;
pub use consultation_handler::consultation_routes;
pub use credit_handler::{credit_purchase_routes, credit_routes};
pub use hour_handler::hour_pool_routes;
pub use plan_handler::{plan_purchase_routes, plan_routes};
pub use search_handler::search_routes;
pub use user_handler::user_routes;

//! SeaORM entity definitions
//!
//! Database rows, kept separate from the domain types they convert into.
//! Nested views are assembled in the repositories, so no relations are declared here.

pub mod company;
pub mod consultation;
pub mod credit_bucket;
pub mod credit_purchase;
pub mod hour_pool;
pub mod password_reset;
pub mod plan;
pub mod plan_purchase;
pub mod search;
pub mod user;

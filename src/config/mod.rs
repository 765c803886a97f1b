//! Configuration: environment-driven settings plus the constants shared across layers
//! (roles, ledger kinds and states, rate limits, cookie and job names).

mod constants;
mod settings;

pub use constants::*;
pub use settings::Config;

//! Credit and hour ledger: debits, reversals and the request lifecycle that drives them.

pub mod lifecycle;
pub mod reconciler;
mod store;

pub use reconciler::{debit_credits, debit_hours, reverse_credits, reverse_hours, Refund};
pub use store::{LedgerStore, UsageStore};

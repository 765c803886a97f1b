//! Storage seams for the ledger.
//!
//! Implementations are expected to run inside one transaction: reads return rows locked
//! for update, and the conditional writes only apply when the row still holds the value
//! read, reporting `false` otherwise.

use async_trait::async_trait;

use crate::domain::{
    Consultation, CreditBucket, HourPool, NewConsultation, NewCreditBucket, NewSearch, Search,
};
use crate::errors::AppResult;

#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Usable buckets of the user in storage order: expired ones excluded and only the
    /// newest plan bucket kept.
    async fn list_usable_buckets(&self, user_id: i32) -> AppResult<Vec<CreditBucket>>;

    async fn find_bucket(&self, id: i32) -> AppResult<Option<CreditBucket>>;

    /// Set `quantity` if the bucket still holds `expected`.
    async fn update_bucket_quantity(&self, id: i32, expected: i32, quantity: i32)
        -> AppResult<bool>;

    async fn create_bucket(&self, bucket: NewCreditBucket) -> AppResult<CreditBucket>;

    async fn find_pool(&self, id: i32) -> AppResult<Option<HourPool>>;

    /// Set `remaining` if the pool still holds `expected`.
    async fn update_pool_remaining(&self, id: i32, expected: i32, remaining: i32)
        -> AppResult<bool>;
}

#[async_trait]
pub trait UsageStore: Send + Sync {
    async fn find_search(&self, id: i32) -> AppResult<Option<Search>>;

    async fn insert_search(&self, search: NewSearch) -> AppResult<Search>;

    /// Persist every mutable field and bump the modification time.
    async fn save_search(&self, search: &Search) -> AppResult<Search>;

    async fn find_consultation(&self, id: i32) -> AppResult<Option<Consultation>>;

    async fn insert_consultation(&self, consultation: NewConsultation)
        -> AppResult<Consultation>;

    /// Persist every mutable field and bump the modification time.
    async fn save_consultation(&self, consultation: &Consultation) -> AppResult<Consultation>;
}

//! In-memory ledger storage shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use uplin_api::domain::{
    ledger, Actor, Consultation, CreditBucket, CreditKind, HourPool, NewConsultation,
    NewCreditBucket, NewSearch, RequestState, Search, UserRole,
};
use uplin_api::errors::{AppError, AppResult};
use uplin_api::services::ledger::{LedgerStore, UsageStore};

#[derive(Default)]
struct State {
    next_id: i32,
    buckets: Vec<CreditBucket>,
    pools: Vec<HourPool>,
    searches: Vec<Search>,
    consultations: Vec<Consultation>,
    /// Conditional writes on these buckets report a concurrent change
    stale_buckets: HashSet<i32>,
    writes: usize,
}

impl State {
    fn id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Rows behind a mutex, with the same conditional-write contract as the database store.
#[derive(Default)]
pub struct MemoryLedger {
    state: Mutex<State>,
}

pub fn user(user_id: i32) -> Actor {
    Actor {
        user_id,
        role: UserRole::User,
    }
}

pub fn admin() -> Actor {
    Actor {
        user_id: 999,
        role: UserRole::Admin,
    }
}

pub fn days(n: i64) -> Option<DateTime<Utc>> {
    Some(Utc::now() + Duration::days(n))
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a bucket. Later inserts get later creation times.
    pub fn add_bucket(
        &self,
        user_id: i32,
        kind: CreditKind,
        quantity: i32,
        expires_at: Option<DateTime<Utc>>,
    ) -> i32 {
        let mut state = self.state.lock().unwrap();
        let id = state.id();
        state.buckets.push(CreditBucket {
            id,
            user_id,
            kind,
            quantity,
            expires_at,
            created_at: Utc::now() - Duration::days(30) + Duration::seconds(i64::from(id)),
        });
        id
    }

    pub fn add_pool(
        &self,
        user_id: i32,
        total_hours: i32,
        remaining_hours: i32,
        expires_at: DateTime<Utc>,
    ) -> i32 {
        let mut state = self.state.lock().unwrap();
        let id = state.id();
        state.pools.push(HourPool {
            id,
            user_id,
            total_hours,
            remaining_hours,
            expires_at,
            created_at: Utc::now(),
        });
        id
    }

    /// Overwrite a pool balance, as an administrative correction would.
    pub fn set_remaining_hours(&self, pool_id: i32, remaining_hours: i32) {
        let mut state = self.state.lock().unwrap();
        let pool = state
            .pools
            .iter_mut()
            .find(|p| p.id == pool_id)
            .expect("pool exists");
        pool.remaining_hours = remaining_hours;
    }

    pub fn mark_stale(&self, bucket_id: i32) {
        self.state.lock().unwrap().stale_buckets.insert(bucket_id);
    }

    pub fn bucket(&self, id: i32) -> CreditBucket {
        self.state
            .lock()
            .unwrap()
            .buckets
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .expect("bucket exists")
    }

    pub fn quantity(&self, id: i32) -> i32 {
        self.bucket(id).quantity
    }

    pub fn buckets_of(&self, user_id: i32) -> Vec<CreditBucket> {
        self.state
            .lock()
            .unwrap()
            .buckets
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Sum over every bucket of the user, usable or not.
    pub fn total_credits(&self, user_id: i32) -> i32 {
        self.buckets_of(user_id).iter().map(|b| b.quantity).sum()
    }

    pub fn remaining_hours(&self, pool_id: i32) -> i32 {
        self.state
            .lock()
            .unwrap()
            .pools
            .iter()
            .find(|p| p.id == pool_id)
            .map(|p| p.remaining_hours)
            .expect("pool exists")
    }

    pub fn consultation_count(&self) -> usize {
        self.state.lock().unwrap().consultations.len()
    }

    /// Successful conditional writes so far.
    pub fn writes(&self) -> usize {
        self.state.lock().unwrap().writes
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn list_usable_buckets(&self, user_id: i32) -> AppResult<Vec<CreditBucket>> {
        Ok(ledger::usable_buckets(self.buckets_of(user_id), Utc::now()))
    }

    async fn find_bucket(&self, id: i32) -> AppResult<Option<CreditBucket>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .buckets
            .iter()
            .find(|b| b.id == id)
            .cloned())
    }

    async fn update_bucket_quantity(
        &self,
        id: i32,
        expected: i32,
        quantity: i32,
    ) -> AppResult<bool> {
        let mut state = self.state.lock().unwrap();
        if state.stale_buckets.contains(&id) {
            return Ok(false);
        }
        let Some(bucket) = state.buckets.iter_mut().find(|b| b.id == id) else {
            return Ok(false);
        };
        if bucket.quantity != expected {
            return Ok(false);
        }
        bucket.quantity = quantity;
        state.writes += 1;
        Ok(true)
    }

    async fn create_bucket(&self, bucket: NewCreditBucket) -> AppResult<CreditBucket> {
        let mut state = self.state.lock().unwrap();
        let created = CreditBucket {
            id: state.id(),
            user_id: bucket.user_id,
            kind: bucket.kind,
            quantity: bucket.quantity,
            expires_at: bucket.expires_at,
            created_at: Utc::now(),
        };
        state.buckets.push(created.clone());
        state.writes += 1;
        Ok(created)
    }

    async fn find_pool(&self, id: i32) -> AppResult<Option<HourPool>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .pools
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn update_pool_remaining(
        &self,
        id: i32,
        expected: i32,
        remaining: i32,
    ) -> AppResult<bool> {
        let mut state = self.state.lock().unwrap();
        let Some(pool) = state.pools.iter_mut().find(|p| p.id == id) else {
            return Ok(false);
        };
        if pool.remaining_hours != expected {
            return Ok(false);
        }
        pool.remaining_hours = remaining;
        state.writes += 1;
        Ok(true)
    }
}

#[async_trait]
impl UsageStore for MemoryLedger {
    async fn find_search(&self, id: i32) -> AppResult<Option<Search>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .searches
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn insert_search(&self, search: NewSearch) -> AppResult<Search> {
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();
        let created = Search {
            id: state.id(),
            info: search.info,
            credits_used: None,
            notes: None,
            state: RequestState::Pending,
            bucket_id: Some(search.bucket_id),
            user_id: search.user_id,
            created_at: now,
            updated_at: now,
        };
        state.searches.push(created.clone());
        Ok(created)
    }

    async fn save_search(&self, search: &Search) -> AppResult<Search> {
        let mut state = self.state.lock().unwrap();
        let row = state
            .searches
            .iter_mut()
            .find(|s| s.id == search.id)
            .ok_or(AppError::NotFound)?;
        *row = Search {
            updated_at: Utc::now(),
            ..search.clone()
        };
        Ok(row.clone())
    }

    async fn find_consultation(&self, id: i32) -> AppResult<Option<Consultation>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .consultations
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn insert_consultation(&self, consultation: NewConsultation) -> AppResult<Consultation> {
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();
        let created = Consultation {
            id: state.id(),
            hours: consultation.hours,
            comments: consultation.comments,
            notes: None,
            state: RequestState::Pending,
            pool_id: consultation.pool_id,
            user_id: consultation.user_id,
            created_at: now,
            updated_at: now,
        };
        state.consultations.push(created.clone());
        Ok(created)
    }

    async fn save_consultation(&self, consultation: &Consultation) -> AppResult<Consultation> {
        let mut state = self.state.lock().unwrap();
        let row = state
            .consultations
            .iter_mut()
            .find(|c| c.id == consultation.id)
            .ok_or(AppError::NotFound)?;
        *row = Consultation {
            updated_at: Utc::now(),
            ..consultation.clone()
        };
        Ok(row.clone())
    }
}

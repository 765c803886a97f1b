//! Unit of Work: repository access and transaction lifecycle.
//!
//! Plain reads and administrative edits go through the shared repositories. Anything
//! that moves credits or hours runs inside [`UnitOfWork::transaction`], where
//! [`TransactionContext`] hands out repositories bound to the open transaction.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    AccessMode, ActiveModelTrait, ActiveValue::Unchanged, ColumnTrait, Condition,
    DatabaseConnection, DatabaseTransaction, EntityTrait, IsolationLevel, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::repositories::entities::{
    consultation, credit_bucket, credit_purchase, hour_pool, password_reset, search, user,
};
use super::repositories::{
    CompanyRepository, CompanyStore, ConsultationRepository, ConsultationStore,
    CreditPurchaseRepository, CreditPurchaseStore, CreditRepository, CreditStore,
    HourPoolRepository, HourPoolStore, PasswordResetRepository, PasswordResetStore,
    PlanPurchaseRepository, PlanPurchaseStore, PlanRepository, PlanStore, SearchRepository,
    SearchStore, UserRepository, UserStore,
};
use crate::domain::{
    ledger, Consultation, CreateCreditPurchase, CreditBucket, CreditPurchase, HourPool,
    NewConsultation, NewCreditBucket, NewHourPool, NewSearch, PasswordReset, RequestState,
    Search, User,
};
use crate::errors::{AppError, AppResult};
use crate::services::ledger::{LedgerStore, UsageStore};

/// Closure run inside a transaction.
pub type TxFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// Unit of Work trait for dependency injection.
///
/// Not mockable directly because of the generic `transaction`; tests implement it by hand.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;
    fn plans(&self) -> Arc<dyn PlanRepository>;
    fn plan_purchases(&self) -> Arc<dyn PlanPurchaseRepository>;
    fn credits(&self) -> Arc<dyn CreditRepository>;
    fn credit_purchases(&self) -> Arc<dyn CreditPurchaseRepository>;
    fn hour_pools(&self) -> Arc<dyn HourPoolRepository>;
    fn searches(&self) -> Arc<dyn SearchRepository>;
    fn consultations(&self) -> Arc<dyn ConsultationRepository>;
    fn companies(&self) -> Arc<dyn CompanyRepository>;
    fn password_resets(&self) -> Arc<dyn PasswordResetRepository>;

    /// Run `f` in a read-committed transaction: commit on `Ok`, roll back on `Err`.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send;
}

/// Repositories bound to one open transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    /// Credit buckets, hour pools and the requests drawing on them.
    pub fn ledger(&self) -> TxLedger<'a> {
        TxLedger { txn: self.txn }
    }

    pub fn users(&self) -> TxUsers<'a> {
        TxUsers { txn: self.txn }
    }

    pub fn purchases(&self) -> TxPurchases<'a> {
        TxPurchases { txn: self.txn }
    }

    pub fn password_resets(&self) -> TxPasswordResets<'a> {
        TxPasswordResets { txn: self.txn }
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    users: Arc<UserStore>,
    plans: Arc<PlanStore>,
    plan_purchases: Arc<PlanPurchaseStore>,
    credits: Arc<CreditStore>,
    credit_purchases: Arc<CreditPurchaseStore>,
    hour_pools: Arc<HourPoolStore>,
    searches: Arc<SearchStore>,
    consultations: Arc<ConsultationStore>,
    companies: Arc<CompanyStore>,
    password_resets: Arc<PasswordResetStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            users: Arc::new(UserStore::new(db.clone())),
            plans: Arc::new(PlanStore::new(db.clone())),
            plan_purchases: Arc::new(PlanPurchaseStore::new(db.clone())),
            credits: Arc::new(CreditStore::new(db.clone())),
            credit_purchases: Arc::new(CreditPurchaseStore::new(db.clone())),
            hour_pools: Arc::new(HourPoolStore::new(db.clone())),
            searches: Arc::new(SearchStore::new(db.clone())),
            consultations: Arc::new(ConsultationStore::new(db.clone())),
            companies: Arc::new(CompanyStore::new(db.clone())),
            password_resets: Arc::new(PasswordResetStore::new(db.clone())),
            db,
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn plans(&self) -> Arc<dyn PlanRepository> {
        self.plans.clone()
    }

    fn plan_purchases(&self) -> Arc<dyn PlanPurchaseRepository> {
        self.plan_purchases.clone()
    }

    fn credits(&self) -> Arc<dyn CreditRepository> {
        self.credits.clone()
    }

    fn credit_purchases(&self) -> Arc<dyn CreditPurchaseRepository> {
        self.credit_purchases.clone()
    }

    fn hour_pools(&self) -> Arc<dyn HourPoolRepository> {
        self.hour_pools.clone()
    }

    fn searches(&self) -> Arc<dyn SearchRepository> {
        self.searches.clone()
    }

    fn consultations(&self) -> Arc<dyn ConsultationRepository> {
        self.consultations.clone()
    }

    fn companies(&self) -> Arc<dyn CompanyRepository> {
        self.companies.clone()
    }

    fn password_resets(&self) -> Arc<dyn PasswordResetRepository> {
        self.password_resets.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(
                Some(IsolationLevel::ReadCommitted),
                Some(AccessMode::ReadWrite),
            )
            .await?;

        match f(TransactionContext::new(&txn)).await {
            Ok(result) => {
                txn.commit().await?;
                Ok(result)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Rolling back transaction");
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

/// Ledger rows within a transaction. Reads lock the rows they return (`FOR UPDATE`).
pub struct TxLedger<'a> {
    txn: &'a DatabaseTransaction,
}

impl TxLedger<'_> {
    /// Insert a pool with every hour still available.
    pub async fn create_pool(&self, pool: NewHourPool) -> AppResult<HourPool> {
        let model = hour_pool::ActiveModel {
            user_id: Set(pool.user_id),
            total_hours: Set(pool.total_hours),
            remaining_hours: Set(pool.total_hours),
            expires_at: Set(pool.expires_at),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.txn)
        .await?;

        Ok(HourPool::from(model))
    }
}

#[async_trait]
impl LedgerStore for TxLedger<'_> {
    async fn list_usable_buckets(&self, user_id: i32) -> AppResult<Vec<CreditBucket>> {
        let now = Utc::now();
        let buckets = credit_bucket::Entity::find()
            .filter(credit_bucket::Column::UserId.eq(user_id))
            .filter(
                Condition::any()
                    .add(credit_bucket::Column::ExpiresAt.is_null())
                    .add(credit_bucket::Column::ExpiresAt.gte(now)),
            )
            .order_by_asc(credit_bucket::Column::Id)
            .lock_exclusive()
            .all(self.txn)
            .await?
            .into_iter()
            .map(CreditBucket::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(ledger::usable_buckets(buckets, now))
    }

    async fn find_bucket(&self, id: i32) -> AppResult<Option<CreditBucket>> {
        credit_bucket::Entity::find_by_id(id)
            .lock_exclusive()
            .one(self.txn)
            .await?
            .map(CreditBucket::try_from)
            .transpose()
    }

    async fn update_bucket_quantity(
        &self,
        id: i32,
        expected: i32,
        quantity: i32,
    ) -> AppResult<bool> {
        let result = credit_bucket::Entity::update_many()
            .col_expr(credit_bucket::Column::Quantity, Expr::value(quantity))
            .filter(credit_bucket::Column::Id.eq(id))
            .filter(credit_bucket::Column::Quantity.eq(expected))
            .exec(self.txn)
            .await?;
        Ok(result.rows_affected == 1)
    }

    async fn create_bucket(&self, bucket: NewCreditBucket) -> AppResult<CreditBucket> {
        let model = credit_bucket::ActiveModel {
            user_id: Set(bucket.user_id),
            kind: Set(bucket.kind.as_str().to_string()),
            quantity: Set(bucket.quantity),
            expires_at: Set(bucket.expires_at),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.txn)
        .await?;

        CreditBucket::try_from(model)
    }

    async fn find_pool(&self, id: i32) -> AppResult<Option<HourPool>> {
        Ok(hour_pool::Entity::find_by_id(id)
            .lock_exclusive()
            .one(self.txn)
            .await?
            .map(HourPool::from))
    }

    async fn update_pool_remaining(
        &self,
        id: i32,
        expected: i32,
        remaining: i32,
    ) -> AppResult<bool> {
        let result = hour_pool::Entity::update_many()
            .col_expr(hour_pool::Column::RemainingHours, Expr::value(remaining))
            .filter(hour_pool::Column::Id.eq(id))
            .filter(hour_pool::Column::RemainingHours.eq(expected))
            .exec(self.txn)
            .await?;
        Ok(result.rows_affected == 1)
    }
}

#[async_trait]
impl UsageStore for TxLedger<'_> {
    async fn find_search(&self, id: i32) -> AppResult<Option<Search>> {
        search::Entity::find_by_id(id)
            .lock_exclusive()
            .one(self.txn)
            .await?
            .map(Search::try_from)
            .transpose()
    }

    async fn insert_search(&self, new_search: NewSearch) -> AppResult<Search> {
        let now = Utc::now();
        let model = search::ActiveModel {
            info: Set(new_search.info),
            credits_used: Set(None),
            notes: Set(None),
            state: Set(RequestState::Pending.as_str().to_string()),
            bucket_id: Set(Some(new_search.bucket_id)),
            user_id: Set(new_search.user_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.txn)
        .await?;

        Search::try_from(model)
    }

    async fn save_search(&self, current: &Search) -> AppResult<Search> {
        let model = search::ActiveModel {
            id: Unchanged(current.id),
            info: Set(current.info.clone()),
            credits_used: Set(current.credits_used),
            notes: Set(current.notes.clone()),
            state: Set(current.state.as_str().to_string()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(self.txn)
        .await?;

        Search::try_from(model)
    }

    async fn find_consultation(&self, id: i32) -> AppResult<Option<Consultation>> {
        consultation::Entity::find_by_id(id)
            .lock_exclusive()
            .one(self.txn)
            .await?
            .map(Consultation::try_from)
            .transpose()
    }

    async fn insert_consultation(&self, new: NewConsultation) -> AppResult<Consultation> {
        let now = Utc::now();
        let model = consultation::ActiveModel {
            hours: Set(new.hours),
            comments: Set(new.comments),
            notes: Set(None),
            state: Set(RequestState::Pending.as_str().to_string()),
            pool_id: Set(new.pool_id),
            user_id: Set(new.user_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.txn)
        .await?;

        Consultation::try_from(model)
    }

    async fn save_consultation(&self, current: &Consultation) -> AppResult<Consultation> {
        let model = consultation::ActiveModel {
            id: Unchanged(current.id),
            comments: Set(current.comments.clone()),
            notes: Set(current.notes.clone()),
            state: Set(current.state.as_str().to_string()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(self.txn)
        .await?;

        Consultation::try_from(model)
    }
}

/// User rows within a transaction.
pub struct TxUsers<'a> {
    txn: &'a DatabaseTransaction,
}

impl TxUsers<'_> {
    /// Find and lock a user.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        Ok(user::Entity::find_by_id(id)
            .lock_exclusive()
            .one(self.txn)
            .await?
            .map(User::from))
    }

    pub async fn set_plan(&self, user_id: i32, plan_id: i32) -> AppResult<User> {
        let model = user::ActiveModel {
            id: Unchanged(user_id),
            plan_id: Set(Some(plan_id)),
            ..Default::default()
        }
        .update(self.txn)
        .await?;
        Ok(User::from(model))
    }

    pub async fn set_password_hash(&self, user_id: i32, password_hash: String) -> AppResult<()> {
        user::ActiveModel {
            id: Unchanged(user_id),
            password_hash: Set(password_hash),
            ..Default::default()
        }
        .update(self.txn)
        .await?;
        Ok(())
    }
}

/// Purchase rows within a transaction.
pub struct TxPurchases<'a> {
    txn: &'a DatabaseTransaction,
}

impl TxPurchases<'_> {
    /// Record the purchase that funded `bucket_id`.
    pub async fn create_credit_purchase(
        &self,
        bucket_id: i32,
        input: &CreateCreditPurchase,
    ) -> AppResult<CreditPurchase> {
        let model = credit_purchase::ActiveModel {
            payment_method: Set(input.payment_method.clone()),
            cost: Set(input.cost),
            notes: Set(input.notes.clone()),
            bucket_id: Set(bucket_id),
            purchased_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.txn)
        .await?;
        Ok(CreditPurchase::from(model))
    }
}

/// Reset tokens within a transaction.
pub struct TxPasswordResets<'a> {
    txn: &'a DatabaseTransaction,
}

impl TxPasswordResets<'_> {
    /// Find and lock a token so it can be redeemed once.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<PasswordReset>> {
        Ok(password_reset::Entity::find()
            .filter(password_reset::Column::Token.eq(token))
            .lock_exclusive()
            .one(self.txn)
            .await?
            .map(PasswordReset::from))
    }

    pub async fn mark_used(&self, id: i32) -> AppResult<()> {
        let result = password_reset::Entity::update_many()
            .col_expr(password_reset::Column::Used, Expr::value(true))
            .filter(password_reset::Column::Id.eq(id))
            .filter(password_reset::Column::Used.eq(false))
            .exec(self.txn)
            .await?;
        if result.rows_affected != 1 {
            return Err(AppError::validation("This reset link was already used"));
        }
        Ok(())
    }
}

/// Run a block inside a transaction: `with_transaction!(uow, |ctx| { ... })`.
#[macro_export]
macro_rules! with_transaction {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.transaction(|$ctx| Box::pin(async move { $body })).await
    };
}

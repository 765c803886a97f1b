//! Credit buckets and the purchases that fund them.

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::ledger::LedgerStore;
use crate::domain::{
    ledger, CreateCreditBucket, CreateCreditPurchase, CreditBucket, CreditBucketDetail,
    CreditBucketPatch, CreditKind, CreditPurchase, CreditPurchasePatch, NewCreditBucket,
};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};
use crate::with_transaction;

/// A recorded credit purchase and the bucket it opened
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreditPurchaseReceipt {
    pub purchase: CreditPurchase,
    pub bucket: CreditBucket,
}

#[async_trait]
pub trait CreditService: Send + Sync {
    /// The caller's usable buckets.
    async fn own_buckets(&self, user_id: i32) -> AppResult<Vec<CreditBucket>>;

    /// List buckets with their searches and purchases
    async fn list_buckets(&self, params: PaginationParams)
        -> AppResult<Paginated<CreditBucketDetail>>;

    /// Get bucket by ID, with details
    async fn get_bucket(&self, id: i32) -> AppResult<CreditBucketDetail>;

    /// Create a bucket by hand
    async fn create_bucket(&self, input: CreateCreditBucket) -> AppResult<CreditBucket>;

    /// Administrative correction of a bucket
    async fn update_bucket(&self, id: i32, patch: CreditBucketPatch) -> AppResult<CreditBucket>;

    /// Permanently delete a bucket
    async fn delete_bucket(&self, id: i32) -> AppResult<()>;

    /// Open an `adicional` bucket and record its purchase together.
    async fn purchase(&self, input: CreateCreditPurchase) -> AppResult<CreditPurchaseReceipt>;

    /// Credit purchases made by the caller
    async fn own_purchases(&self, user_id: i32) -> AppResult<Vec<CreditPurchase>>;

    /// List all credit purchases
    async fn list_purchases(&self, params: PaginationParams)
        -> AppResult<Paginated<CreditPurchase>>;

    /// Get purchase by ID
    async fn get_purchase(&self, id: i32) -> AppResult<CreditPurchase>;

    /// Edit payment details of a purchase
    async fn update_purchase(&self, id: i32, patch: CreditPurchasePatch)
        -> AppResult<CreditPurchase>;

    /// Delete a purchase record. Its bucket stays.
    async fn delete_purchase(&self, id: i32) -> AppResult<()>;
}

pub struct CreditManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CreditManager<U> {
    /// Create new credit service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn ensure_user(&self, user_id: i32) -> AppResult<()> {
        self.uow
            .users()
            .find_by_id(user_id)
            .await?
            .map(|_| ())
            .ok_or(AppError::NotFound)
    }
}

#[async_trait]
impl<U: UnitOfWork> CreditService for CreditManager<U> {
    async fn own_buckets(&self, user_id: i32) -> AppResult<Vec<CreditBucket>> {
        let buckets = self.uow.credits().list_for_user(user_id).await?;
        Ok(ledger::usable_buckets(buckets, Utc::now()))
    }

    async fn list_buckets(
        &self,
        params: PaginationParams,
    ) -> AppResult<Paginated<CreditBucketDetail>> {
        let (details, total) = self.uow.credits().list_details(params).await?;
        Ok(Paginated::new(details, &params, total))
    }

    async fn get_bucket(&self, id: i32) -> AppResult<CreditBucketDetail> {
        self.uow
            .credits()
            .find_detail(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn create_bucket(&self, input: CreateCreditBucket) -> AppResult<CreditBucket> {
        self.ensure_user(input.user_id).await?;
        let bucket = self.uow.credits().create(input.into()).await?;
        tracing::info!(
            bucket_id = bucket.id,
            user_id = bucket.user_id,
            kind = %bucket.kind,
            quantity = bucket.quantity,
            "Credit bucket created"
        );
        Ok(bucket)
    }

    async fn update_bucket(&self, id: i32, patch: CreditBucketPatch) -> AppResult<CreditBucket> {
        if patch.is_empty() {
            return Err(AppError::validation("No fields to update"));
        }
        let bucket = self.uow.credits().update(id, patch).await?;
        tracing::info!(bucket_id = id, quantity = bucket.quantity, "Credit bucket corrected");
        Ok(bucket)
    }

    async fn delete_bucket(&self, id: i32) -> AppResult<()> {
        self.uow.credits().delete(id).await?;
        tracing::info!(bucket_id = id, "Credit bucket deleted");
        Ok(())
    }

    async fn purchase(&self, input: CreateCreditPurchase) -> AppResult<CreditPurchaseReceipt> {
        if input.quantity <= 0 {
            return Err(AppError::validation("Quantity must be positive"));
        }
        self.ensure_user(input.user_id).await?;

        let receipt = with_transaction!(self.uow, |ctx| {
            let bucket = ctx
                .ledger()
                .create_bucket(NewCreditBucket {
                    user_id: input.user_id,
                    kind: CreditKind::Additional,
                    quantity: input.quantity,
                    expires_at: None,
                })
                .await?;
            let purchase = ctx
                .purchases()
                .create_credit_purchase(bucket.id, &input)
                .await?;
            Ok(CreditPurchaseReceipt { purchase, bucket })
        })?;

        tracing::info!(
            purchase_id = receipt.purchase.id,
            bucket_id = receipt.bucket.id,
            quantity = receipt.bucket.quantity,
            "Credits purchased"
        );
        Ok(receipt)
    }

    async fn own_purchases(&self, user_id: i32) -> AppResult<Vec<CreditPurchase>> {
        self.uow.credit_purchases().list_for_user(user_id).await
    }

    async fn list_purchases(
        &self,
        params: PaginationParams,
    ) -> AppResult<Paginated<CreditPurchase>> {
        let (purchases, total) = self.uow.credit_purchases().list(params).await?;
        Ok(Paginated::new(purchases, &params, total))
    }

    async fn get_purchase(&self, id: i32) -> AppResult<CreditPurchase> {
        self.uow
            .credit_purchases()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn update_purchase(
        &self,
        id: i32,
        patch: CreditPurchasePatch,
    ) -> AppResult<CreditPurchase> {
        if patch.is_empty() {
            return Err(AppError::validation("No fields to update"));
        }
        self.uow.credit_purchases().update(id, patch).await
    }

    async fn delete_purchase(&self, id: i32) -> AppResult<()> {
        self.uow.credit_purchases().delete(id).await?;
        tracing::info!(purchase_id = id, "Credit purchase deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::repositories::{MockCreditRepository, MockUserRepository};
    use crate::services::testing::TestUnitOfWork;
    use chrono::Duration;

    #[tokio::test]
    async fn own_buckets_keep_only_the_newest_plan() {
        let mut credits = MockCreditRepository::new();
        credits.expect_list_for_user().returning(|user_id| {
            let old = Utc::now() - Duration::days(30);
            Ok(vec![
                CreditBucket {
                    id: 1,
                    user_id,
                    kind: CreditKind::Plan,
                    quantity: 4,
                    expires_at: Some(Utc::now() + Duration::days(10)),
                    created_at: old,
                },
                CreditBucket {
                    id: 2,
                    user_id,
                    kind: CreditKind::Plan,
                    quantity: 10,
                    expires_at: Some(Utc::now() + Duration::days(60)),
                    created_at: Utc::now(),
                },
            ])
        });

        let service = CreditManager::new(Arc::new(TestUnitOfWork::default().with_credits(credits)));
        let buckets = service.own_buckets(1).await.unwrap();

        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].id, 2);
    }

    #[tokio::test]
    async fn purchase_for_unknown_user_is_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));

        let service = CreditManager::new(Arc::new(TestUnitOfWork::default().with_users(users)));
        let result = service
            .purchase(CreateCreditPurchase {
                user_id: 77,
                quantity: 5,
                payment_method: "tarjeta".into(),
                cost: 50.0,
                notes: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn empty_bucket_patch_is_rejected() {
        let service = CreditManager::new(Arc::new(TestUnitOfWork::default()));
        let result = service.update_bucket(1, CreditBucketPatch::default()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}

//! Credit bucket and credit purchase persistence.
//!
//! Balance-changing writes made by the ledger go through [`crate::infra::TxLedger`]; the
//! operations here are reads and administrative corrections.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::future::try_join;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use super::entities::credit_bucket::{self, Entity as BucketEntity};
use super::entities::credit_purchase::{self, Entity as PurchaseEntity};
use super::entities::search::{self, Entity as SearchEntity};
use super::query::fetch_page;
use crate::domain::{
    CreditBucket, CreditBucketDetail, CreditBucketPatch, CreditPurchase, CreditPurchasePatch,
    NewCreditBucket, Search,
};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CreditRepository: Send + Sync {
    /// Every bucket of the user in storage order, expired ones included.
    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<CreditBucket>>;

    /// Find bucket by ID
    async fn find_by_id(&self, id: i32) -> AppResult<Option<CreditBucket>>;

    /// Bucket with the searches charged to it and the purchases that funded it.
    async fn find_detail(&self, id: i32) -> AppResult<Option<CreditBucketDetail>>;

    /// List one page of bucket details with the total count
    async fn list_details(
        &self,
        params: PaginationParams,
    ) -> AppResult<(Vec<CreditBucketDetail>, u64)>;

    /// Insert a bucket
    async fn create(&self, bucket: NewCreditBucket) -> AppResult<CreditBucket>;

    async fn update(&self, id: i32, patch: CreditBucketPatch) -> AppResult<CreditBucket>;

    /// Hard delete. Searches charged to the bucket keep their owner and lose the link.
    async fn delete(&self, id: i32) -> AppResult<()>;
}

pub struct CreditStore {
    db: DatabaseConnection,
}

impl CreditStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Attach searches and purchases to each bucket, one query per child table run concurrently.
    async fn assemble(&self, buckets: Vec<CreditBucket>) -> AppResult<Vec<CreditBucketDetail>> {
        let ids: Vec<i32> = buckets.iter().map(|b| b.id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let (search_models, purchase_models) = try_join(
            SearchEntity::find()
                .filter(search::Column::BucketId.is_in(ids.clone()))
                .order_by_asc(search::Column::Id)
                .all(&self.db),
            PurchaseEntity::find()
                .filter(credit_purchase::Column::BucketId.is_in(ids))
                .order_by_asc(credit_purchase::Column::Id)
                .all(&self.db),
        )
        .await?;

        let mut searches: HashMap<i32, Vec<Search>> = HashMap::new();
        for model in search_models {
            let search = Search::try_from(model)?;
            if let Some(bucket_id) = search.bucket_id {
                searches.entry(bucket_id).or_default().push(search);
            }
        }

        let mut purchases: HashMap<i32, Vec<CreditPurchase>> = HashMap::new();
        for purchase in purchase_models.into_iter().map(CreditPurchase::from) {
            purchases.entry(purchase.bucket_id).or_default().push(purchase);
        }

        Ok(buckets
            .into_iter()
            .map(|bucket| CreditBucketDetail {
                searches: searches.remove(&bucket.id).unwrap_or_default(),
                purchases: purchases.remove(&bucket.id).unwrap_or_default(),
                bucket,
            })
            .collect())
    }

    async fn find_model(&self, id: i32) -> AppResult<credit_bucket::Model> {
        BucketEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }
}

#[async_trait]
impl CreditRepository for CreditStore {
    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<CreditBucket>> {
        BucketEntity::find()
            .filter(credit_bucket::Column::UserId.eq(user_id))
            .order_by_asc(credit_bucket::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(CreditBucket::try_from)
            .collect()
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<CreditBucket>> {
        BucketEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(CreditBucket::try_from)
            .transpose()
    }

    async fn find_detail(&self, id: i32) -> AppResult<Option<CreditBucketDetail>> {
        let Some(bucket) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        Ok(self.assemble(vec![bucket]).await?.pop())
    }

    async fn list_details(
        &self,
        params: PaginationParams,
    ) -> AppResult<(Vec<CreditBucketDetail>, u64)> {
        let select = BucketEntity::find().order_by_asc(credit_bucket::Column::Id);
        let (models, total) = fetch_page(select, &self.db, &params).await?;
        let buckets = models
            .into_iter()
            .map(CreditBucket::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        Ok((self.assemble(buckets).await?, total))
    }

    async fn create(&self, bucket: NewCreditBucket) -> AppResult<CreditBucket> {
        let model = credit_bucket::ActiveModel {
            user_id: Set(bucket.user_id),
            kind: Set(bucket.kind.as_str().to_string()),
            quantity: Set(bucket.quantity),
            expires_at: Set(bucket.expires_at),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        CreditBucket::try_from(model)
    }

    async fn update(&self, id: i32, patch: CreditBucketPatch) -> AppResult<CreditBucket> {
        let mut active: credit_bucket::ActiveModel = self.find_model(id).await?.into();

        if let Some(kind) = patch.kind {
            active.kind = Set(kind.as_str().to_string());
        }
        if let Some(quantity) = patch.quantity {
            active.quantity = Set(quantity);
        }
        if let Some(expires_at) = patch.expires_at {
            active.expires_at = Set(Some(expires_at));
        }

        CreditBucket::try_from(active.update(&self.db).await?)
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = BucketEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        tracing::info!(bucket_id = id, "Credit bucket deleted");
        Ok(())
    }
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CreditPurchaseRepository: Send + Sync {
    /// Find purchase by ID
    async fn find_by_id(&self, id: i32) -> AppResult<Option<CreditPurchase>>;

    async fn list(&self, params: PaginationParams) -> AppResult<(Vec<CreditPurchase>, u64)>;

    /// Purchases funding any bucket owned by the user, newest first.
    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<CreditPurchase>>;

    async fn update(&self, id: i32, patch: CreditPurchasePatch) -> AppResult<CreditPurchase>;

    /// Removes the purchase record only; the bucket it funded stays.
    async fn delete(&self, id: i32) -> AppResult<()>;
}

pub struct CreditPurchaseStore {
    db: DatabaseConnection,
}

impl CreditPurchaseStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CreditPurchaseRepository for CreditPurchaseStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<CreditPurchase>> {
        Ok(PurchaseEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(CreditPurchase::from))
    }

    async fn list(&self, params: PaginationParams) -> AppResult<(Vec<CreditPurchase>, u64)> {
        let select = PurchaseEntity::find().order_by_desc(credit_purchase::Column::PurchasedAt);
        let (models, total) = fetch_page(select, &self.db, &params).await?;
        Ok((models.into_iter().map(CreditPurchase::from).collect(), total))
    }

    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<CreditPurchase>> {
        let bucket_ids: Vec<i32> = BucketEntity::find()
            .filter(credit_bucket::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|b| b.id)
            .collect();

        if bucket_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = PurchaseEntity::find()
            .filter(credit_purchase::Column::BucketId.is_in(bucket_ids))
            .order_by_desc(credit_purchase::Column::PurchasedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(CreditPurchase::from).collect())
    }

    async fn update(&self, id: i32, patch: CreditPurchasePatch) -> AppResult<CreditPurchase> {
        let model = PurchaseEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;
        let mut active: credit_purchase::ActiveModel = model.into();

        if let Some(method) = patch.payment_method {
            active.payment_method = Set(method);
        }
        if let Some(cost) = patch.cost {
            active.cost = Set(cost);
        }
        if let Some(notes) = patch.notes {
            active.notes = Set(Some(notes));
        }

        Ok(CreditPurchase::from(active.update(&self.db).await?))
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = PurchaseEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

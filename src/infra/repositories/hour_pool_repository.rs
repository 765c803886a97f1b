//! Hour pool persistence.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use super::entities::consultation::{self, Entity as ConsultationEntity};
use super::entities::hour_pool::{self, Entity as PoolEntity};
use super::query::fetch_page;
use crate::domain::{Consultation, HourPool, HourPoolDetail, HourPoolPatch, NewHourPool};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait HourPoolRepository: Send + Sync {
    /// Find pool by ID
    async fn find_by_id(&self, id: i32) -> AppResult<Option<HourPool>>;

    /// Most recently created pool of the user that has not expired at `now`.
    async fn find_active_for_user(
        &self,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<Option<HourPool>>;

    /// Pool with the consultations charged against it
    async fn find_detail(&self, id: i32) -> AppResult<Option<HourPoolDetail>>;

    async fn list_details(&self, params: PaginationParams)
        -> AppResult<(Vec<HourPoolDetail>, u64)>;

    /// Insert a pool with every hour still available.
    async fn create(&self, pool: NewHourPool) -> AppResult<HourPool>;

    /// Patch a pool; the result must keep remaining hours within the total.
    async fn update(&self, id: i32, patch: HourPoolPatch) -> AppResult<HourPool>;

    /// Permanently delete a pool
    async fn delete(&self, id: i32) -> AppResult<()>;
}

pub struct HourPoolStore {
    db: DatabaseConnection,
}

impl HourPoolStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn assemble(&self, pools: Vec<HourPool>) -> AppResult<Vec<HourPoolDetail>> {
        let ids: Vec<i32> = pools.iter().map(|p| p.id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut by_pool: HashMap<i32, Vec<Consultation>> = HashMap::new();
        for model in ConsultationEntity::find()
            .filter(consultation::Column::PoolId.is_in(ids))
            .order_by_asc(consultation::Column::Id)
            .all(&self.db)
            .await?
        {
            let consultation = Consultation::try_from(model)?;
            by_pool
                .entry(consultation.pool_id)
                .or_default()
                .push(consultation);
        }

        Ok(pools
            .into_iter()
            .map(|pool| HourPoolDetail {
                consultations: by_pool.remove(&pool.id).unwrap_or_default(),
                pool,
            })
            .collect())
    }
}

#[async_trait]
impl HourPoolRepository for HourPoolStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<HourPool>> {
        Ok(PoolEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(HourPool::from))
    }

    async fn find_active_for_user(
        &self,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<Option<HourPool>> {
        let model = PoolEntity::find()
            .filter(hour_pool::Column::UserId.eq(user_id))
            .filter(hour_pool::Column::ExpiresAt.gte(now))
            .order_by_desc(hour_pool::Column::CreatedAt)
            .order_by_desc(hour_pool::Column::Id)
            .one(&self.db)
            .await?;
        Ok(model.map(HourPool::from))
    }

    async fn find_detail(&self, id: i32) -> AppResult<Option<HourPoolDetail>> {
        let Some(pool) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        Ok(self.assemble(vec![pool]).await?.pop())
    }

    async fn list_details(
        &self,
        params: PaginationParams,
    ) -> AppResult<(Vec<HourPoolDetail>, u64)> {
        let select = PoolEntity::find().order_by_asc(hour_pool::Column::Id);
        let (models, total) = fetch_page(select, &self.db, &params).await?;
        let pools = models.into_iter().map(HourPool::from).collect();
        Ok((self.assemble(pools).await?, total))
    }

    async fn create(&self, pool: NewHourPool) -> AppResult<HourPool> {
        let model = hour_pool::ActiveModel {
            user_id: Set(pool.user_id),
            total_hours: Set(pool.total_hours),
            remaining_hours: Set(pool.total_hours),
            expires_at: Set(pool.expires_at),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        Ok(HourPool::from(model))
    }

    async fn update(&self, id: i32, patch: HourPoolPatch) -> AppResult<HourPool> {
        let model = PoolEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;
        patch.check_against(&HourPool::from(model.clone()))?;

        let mut active: hour_pool::ActiveModel = model.into();
        if let Some(total) = patch.total_hours {
            active.total_hours = Set(total);
        }
        if let Some(remaining) = patch.remaining_hours {
            active.remaining_hours = Set(remaining);
        }
        if let Some(expires_at) = patch.expires_at {
            active.expires_at = Set(expires_at);
        }

        Ok(HourPool::from(active.update(&self.db).await?))
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = PoolEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        tracing::info!(pool_id = id, "Hour pool deleted");
        Ok(())
    }
}

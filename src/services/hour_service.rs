//! Consultancy hour pools.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use crate::domain::{CreateHourPool, HourPool, HourPoolDetail, HourPoolPatch};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

#[async_trait]
pub trait HourService: Send + Sync {
    /// The caller's unexpired pool with its consultations.
    async fn own_pool(&self, user_id: i32) -> AppResult<HourPoolDetail>;

    /// List pools with their consultations
    async fn list_pools(&self, params: PaginationParams) -> AppResult<Paginated<HourPoolDetail>>;

    async fn get_pool(&self, id: i32) -> AppResult<HourPoolDetail>;

    /// Create a pool with every hour remaining
    async fn create_pool(&self, input: CreateHourPool) -> AppResult<HourPool>;

    /// Administrative correction of a pool
    ///
    /// # Errors
    /// Returns `Validation` if the result would leave more remaining hours than total hours.
    async fn update_pool(&self, id: i32, patch: HourPoolPatch) -> AppResult<HourPool>;

    async fn delete_pool(&self, id: i32) -> AppResult<()>;
}

pub struct HourManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> HourManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> HourService for HourManager<U> {
    async fn own_pool(&self, user_id: i32) -> AppResult<HourPoolDetail> {
        let pool = self
            .uow
            .hour_pools()
            .find_active_for_user(user_id, Utc::now())
            .await?
            .ok_or(AppError::NotFound)?;
        self.get_pool(pool.id).await
    }

    async fn list_pools(&self, params: PaginationParams) -> AppResult<Paginated<HourPoolDetail>> {
        let (pools, total) = self.uow.hour_pools().list_details(params).await?;
        Ok(Paginated::new(pools, &params, total))
    }

    async fn get_pool(&self, id: i32) -> AppResult<HourPoolDetail> {
        self.uow
            .hour_pools()
            .find_detail(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn create_pool(&self, input: CreateHourPool) -> AppResult<HourPool> {
        self.uow
            .users()
            .find_by_id(input.user_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let pool = self.uow.hour_pools().create(input.into()).await?;
        tracing::info!(
            pool_id = pool.id,
            user_id = pool.user_id,
            total = pool.total_hours,
            "Hour pool created"
        );
        Ok(pool)
    }

    async fn update_pool(&self, id: i32, patch: HourPoolPatch) -> AppResult<HourPool> {
        if patch.is_empty() {
            return Err(AppError::validation("No fields to update"));
        }
        let pool = self.uow.hour_pools().update(id, patch).await?;
        tracing::info!(
            pool_id = id,
            total = pool.total_hours,
            remaining = pool.remaining_hours,
            "Hour pool corrected"
        );
        Ok(pool)
    }

    async fn delete_pool(&self, id: i32) -> AppResult<()> {
        self.uow.hour_pools().delete(id).await?;
        tracing::info!(pool_id = id, "Hour pool deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::repositories::MockHourPoolRepository;
    use crate::services::testing::TestUnitOfWork;

    #[tokio::test]
    async fn own_pool_is_not_found_without_active_pool() {
        let mut pools = MockHourPoolRepository::new();
        pools.expect_find_active_for_user().returning(|_, _| Ok(None));

        let service = HourManager::new(Arc::new(TestUnitOfWork::default().with_hour_pools(pools)));
        assert!(matches!(service.own_pool(3).await, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn empty_pool_patch_is_rejected() {
        let service = HourManager::new(Arc::new(TestUnitOfWork::default()));
        let result = service.update_pool(1, HourPoolPatch::default()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}

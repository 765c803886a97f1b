//! Read access to searches and consultations. State changes go through the ledger
//! transaction, see [`crate::services::ledger`].

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use super::entities::consultation::{self, Entity as ConsultationEntity};
use super::entities::search::{self, Entity as SearchEntity};
use super::query::fetch_page;
use crate::domain::{Consultation, Search};
use crate::errors::AppResult;
use crate::types::PaginationParams;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SearchRepository: Send + Sync {
    /// Find search by ID
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Search>>;

    async fn list(&self, params: PaginationParams) -> AppResult<(Vec<Search>, u64)>;

    /// Newest first
    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<Search>>;
}

pub struct SearchStore {
    db: DatabaseConnection,
}

impl SearchStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SearchRepository for SearchStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Search>> {
        SearchEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Search::try_from)
            .transpose()
    }

    async fn list(&self, params: PaginationParams) -> AppResult<(Vec<Search>, u64)> {
        let select = SearchEntity::find().order_by_desc(search::Column::CreatedAt);
        let (models, total) = fetch_page(select, &self.db, &params).await?;
        let searches = models
            .into_iter()
            .map(Search::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        Ok((searches, total))
    }

    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<Search>> {
        SearchEntity::find()
            .filter(search::Column::UserId.eq(user_id))
            .order_by_desc(search::Column::CreatedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Search::try_from)
            .collect()
    }
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ConsultationRepository: Send + Sync {
    /// Find consultation by ID
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Consultation>>;

    async fn list(&self, params: PaginationParams) -> AppResult<(Vec<Consultation>, u64)>;

    /// Newest first
    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<Consultation>>;
}

pub struct ConsultationStore {
    db: DatabaseConnection,
}

impl ConsultationStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ConsultationRepository for ConsultationStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Consultation>> {
        ConsultationEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Consultation::try_from)
            .transpose()
    }

    async fn list(&self, params: PaginationParams) -> AppResult<(Vec<Consultation>, u64)> {
        let select = ConsultationEntity::find().order_by_desc(consultation::Column::CreatedAt);
        let (models, total) = fetch_page(select, &self.db, &params).await?;
        let consultations = models
            .into_iter()
            .map(Consultation::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        Ok((consultations, total))
    }

    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<Consultation>> {
        ConsultationEntity::find()
            .filter(consultation::Column::UserId.eq(user_id))
            .order_by_desc(consultation::Column::CreatedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Consultation::try_from)
            .collect()
    }
}

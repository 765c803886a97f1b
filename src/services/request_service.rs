//! Searches and consultations.
//!
//! Every state change runs the matching lifecycle step inside one transaction, so the
//! request row and the balance it moves commit or roll back together. Notifications go out
//! only after commit.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use super::ledger::lifecycle;
use super::notifier::{Notification, Notifications};
use crate::domain::{
    Actor, Consultation, ConsultationPatch, CreateConsultation, CreateSearch, RequestState,
    Search, SearchPatch,
};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};
use crate::with_transaction;

#[async_trait]
pub trait SearchService: Send + Sync {
    /// Open a pending search against one of the caller's buckets
    ///
    /// # Errors
    /// Returns `Forbidden` when the bucket belongs to someone else and the caller is not an admin.
    async fn create(&self, actor: Actor, input: CreateSearch) -> AppResult<Search>;

    /// Searches opened by the caller
    async fn own(&self, user_id: i32) -> AppResult<Vec<Search>>;

    /// List all searches
    async fn list(&self, params: PaginationParams) -> AppResult<Paginated<Search>>;

    async fn get(&self, id: i32) -> AppResult<Search>;

    /// Administrative edit; finalizing debits the credits.
    async fn update(&self, id: i32, patch: SearchPatch) -> AppResult<Search>;

    /// Eliminate, refunding a finalized search.
    async fn delete(&self, actor: Actor, id: i32) -> AppResult<Search>;
}

#[async_trait]
pub trait ConsultationService: Send + Sync {
    /// Open a consultation, debiting its hours.
    async fn create(&self, actor: Actor, input: CreateConsultation) -> AppResult<Consultation>;

    /// Consultations opened by the caller
    async fn own(&self, user_id: i32) -> AppResult<Vec<Consultation>>;

    async fn list(&self, params: PaginationParams) -> AppResult<Paginated<Consultation>>;

    async fn get(&self, id: i32) -> AppResult<Consultation>;

    /// Administrative edit. Hours were already taken at creation.
    async fn update(&self, id: i32, patch: ConsultationPatch) -> AppResult<Consultation>;

    /// Eliminate, returning the hours to the pool.
    async fn delete(&self, actor: Actor, id: i32) -> AppResult<Consultation>;
}

pub struct SearchManager<U: UnitOfWork> {
    uow: Arc<U>,
    notifications: Notifications,
}

impl<U: UnitOfWork> SearchManager<U> {
    /// Create new search service; notifications go out after commit
    pub fn new(uow: Arc<U>, notifications: Notifications) -> Self {
        Self { uow, notifications }
    }
}

#[async_trait]
impl<U: UnitOfWork> SearchService for SearchManager<U> {
    async fn create(&self, actor: Actor, input: CreateSearch) -> AppResult<Search> {
        let search = with_transaction!(self.uow, |ctx| {
            let ledger = ctx.ledger();
            lifecycle::create_search(&ledger, actor, input).await
        })?;

        self.notifications.emit(Notification::SearchCreated {
            search_id: search.id,
            user_id: search.user_id,
            info: search.info.clone(),
        });
        Ok(search)
    }

    async fn own(&self, user_id: i32) -> AppResult<Vec<Search>> {
        self.uow.searches().list_for_user(user_id).await
    }

    async fn list(&self, params: PaginationParams) -> AppResult<Paginated<Search>> {
        let (searches, total) = self.uow.searches().list(params).await?;
        Ok(Paginated::new(searches, &params, total))
    }

    async fn get(&self, id: i32) -> AppResult<Search> {
        self.uow
            .searches()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn update(&self, id: i32, patch: SearchPatch) -> AppResult<Search> {
        let search = with_transaction!(self.uow, |ctx| {
            let ledger = ctx.ledger();
            lifecycle::update_search(&ledger, id, patch).await
        })?;

        if let (RequestState::Finalized, Some(credits_used)) = (search.state, search.credits_used)
        {
            self.notifications.emit(Notification::SearchFinalized {
                search_id: search.id,
                user_id: search.user_id,
                credits_used,
            });
        }
        Ok(search)
    }

    async fn delete(&self, actor: Actor, id: i32) -> AppResult<Search> {
        with_transaction!(self.uow, |ctx| {
            let ledger = ctx.ledger();
            lifecycle::delete_search(&ledger, actor, id).await
        })
    }
}

pub struct ConsultationManager<U: UnitOfWork> {
    uow: Arc<U>,
    notifications: Notifications,
}

impl<U: UnitOfWork> ConsultationManager<U> {
    pub fn new(uow: Arc<U>, notifications: Notifications) -> Self {
        Self { uow, notifications }
    }
}

#[async_trait]
impl<U: UnitOfWork> ConsultationService for ConsultationManager<U> {
    async fn create(&self, actor: Actor, input: CreateConsultation) -> AppResult<Consultation> {
        if input.hours <= 0 {
            return Err(AppError::validation("Hours must be positive"));
        }

        let consultation = with_transaction!(self.uow, |ctx| {
            let ledger = ctx.ledger();
            lifecycle::create_consultation(&ledger, actor, input, Utc::now()).await
        })?;

        self.notifications.emit(Notification::ConsultationCreated {
            consultation_id: consultation.id,
            user_id: consultation.user_id,
            hours: consultation.hours,
        });
        Ok(consultation)
    }

    async fn own(&self, user_id: i32) -> AppResult<Vec<Consultation>> {
        self.uow.consultations().list_for_user(user_id).await
    }

    async fn list(&self, params: PaginationParams) -> AppResult<Paginated<Consultation>> {
        let (consultations, total) = self.uow.consultations().list(params).await?;
        Ok(Paginated::new(consultations, &params, total))
    }

    async fn get(&self, id: i32) -> AppResult<Consultation> {
        self.uow
            .consultations()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn update(&self, id: i32, patch: ConsultationPatch) -> AppResult<Consultation> {
        let consultation = with_transaction!(self.uow, |ctx| {
            let ledger = ctx.ledger();
            lifecycle::update_consultation(&ledger, id, patch).await
        })?;

        if consultation.state == RequestState::Finalized {
            self.notifications.emit(Notification::ConsultationFinalized {
                consultation_id: consultation.id,
                user_id: consultation.user_id,
            });
        }
        Ok(consultation)
    }

    async fn delete(&self, actor: Actor, id: i32) -> AppResult<Consultation> {
        with_transaction!(self.uow, |ctx| {
            let ledger = ctx.ledger();
            lifecycle::delete_consultation(&ledger, actor, id).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::infra::repositories::MockSearchRepository;
    use crate::services::testing::{quiet_notifications, TestUnitOfWork};

    #[tokio::test]
    async fn missing_search_is_not_found() {
        let mut searches = MockSearchRepository::new();
        searches.expect_find_by_id().returning(|_| Ok(None));

        let service = SearchManager::new(
            Arc::new(TestUnitOfWork::default().with_searches(searches)),
            quiet_notifications(),
        );
        assert!(matches!(service.get(4).await, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn transaction_failure_surfaces_from_create() {
        let service = SearchManager::new(Arc::new(TestUnitOfWork::default()), quiet_notifications());
        let actor = Actor {
            user_id: 1,
            role: UserRole::User,
        };
        let result = service
            .create(
                actor,
                CreateSearch {
                    info: "Rust developer".into(),
                    bucket_id: 1,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn consultation_hours_must_be_positive() {
        let service =
            ConsultationManager::new(Arc::new(TestUnitOfWork::default()), quiet_notifications());
        let actor = Actor {
            user_id: 1,
            role: UserRole::User,
        };
        let result = service
            .create(
                actor,
                CreateConsultation {
                    pool_id: 1,
                    hours: 0,
                    comments: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}

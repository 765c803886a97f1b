//! User service - Profiles and account administration.

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::container::parallel;
use super::plan_service::assign_plan;
use crate::domain::{
    ledger, Company, CreditBucket, HourPool, Plan, ProfilePatch, User, UserPatch, UserResponse,
};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

/// Everything the account page shows
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserProfile {
    pub user: UserResponse,
    pub plan: Option<Plan>,
    /// Usable buckets in storage order
    pub credits: Vec<CreditBucket>,
    /// Sum of the usable buckets
    #[schema(example = 25)]
    pub available_credits: i32,
    /// Current unexpired hour pool
    pub hour_pool: Option<HourPool>,
    pub company: Option<Company>,
}

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Caller's profile with plan, usable buckets, active pool and company
    async fn profile(&self, user_id: i32) -> AppResult<UserProfile>;

    /// Edit the caller's own name and contact fields
    async fn update_own(&self, user_id: i32, patch: ProfilePatch) -> AppResult<User>;

    /// List users, one page at a time
    async fn list_users(&self, params: PaginationParams) -> AppResult<Paginated<UserResponse>>;

    /// Get user by ID
    async fn get_user(&self, id: i32) -> AppResult<User>;

    /// Administrative edit. A `plan_id` assigns that plan and grants its entitlements.
    async fn update_user(&self, id: i32, patch: UserPatch) -> AppResult<User>;

    /// Enable or disable an account
    async fn set_active(&self, id: i32, active: bool) -> AppResult<User>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn profile(&self, user_id: i32) -> AppResult<UserProfile> {
        let now = Utc::now();
        let user = self.get_user(user_id).await?;

        let plans = self.uow.plans();
        let credits = self.uow.credits();
        let hour_pools = self.uow.hour_pools();
        let companies = self.uow.companies();

        let (plan, buckets, hour_pool, company) = parallel::join4(
            async {
                match user.plan_id {
                    Some(plan_id) => plans.find_by_id(plan_id).await,
                    None => Ok(None),
                }
            },
            credits.list_for_user(user_id),
            hour_pools.find_active_for_user(user_id, now),
            companies.find_by_user(user_id),
        )
        .await?;

        let credits = ledger::usable_buckets(buckets, now);
        let available_credits = credits.iter().map(|b| b.quantity).sum();

        Ok(UserProfile {
            user: UserResponse::from(user),
            plan,
            credits,
            available_credits,
            hour_pool,
            company,
        })
    }

    async fn update_own(&self, user_id: i32, patch: ProfilePatch) -> AppResult<User> {
        let patch = UserPatch::from(patch);
        if patch.is_empty() {
            return Err(AppError::validation("No fields to update"));
        }
        self.uow.users().update(user_id, patch).await
    }

    async fn list_users(&self, params: PaginationParams) -> AppResult<Paginated<UserResponse>> {
        let (users, total) = self.uow.users().list(params).await?;
        Ok(Paginated::new(users, &params, total).map(UserResponse::from))
    }

    async fn get_user(&self, id: i32) -> AppResult<User> {
        self.uow
            .users()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn update_user(&self, id: i32, patch: UserPatch) -> AppResult<User> {
        if patch.is_empty() {
            return Err(AppError::validation("No fields to update"));
        }

        let plan_id = patch.plan_id;
        let fields = UserPatch {
            plan_id: None,
            ..patch
        };

        let mut user = if fields.is_empty() {
            self.get_user(id).await?
        } else {
            self.uow.users().update(id, fields).await?
        };

        if let Some(plan_id) = plan_id {
            let assignment = assign_plan(self.uow.as_ref(), id, plan_id).await?;
            user.plan_id = assignment.user.plan_id;
        }

        tracing::info!(user_id = id, "User updated");
        Ok(user)
    }

    async fn set_active(&self, id: i32, active: bool) -> AppResult<User> {
        let user = self.uow.users().set_active(id, active).await?;
        tracing::info!(user_id = id, active, "User status changed");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CreditKind, UserRole};
    use crate::infra::repositories::{
        MockCompanyRepository, MockCreditRepository, MockHourPoolRepository, MockUserRepository,
    };
    use crate::services::testing::TestUnitOfWork;
    use chrono::Duration;

    fn user(id: i32) -> User {
        User {
            id,
            first_name: "Ana".into(),
            last_name: "García".into(),
            email: "ana@example.com".into(),
            password_hash: String::new(),
            role: UserRole::User,
            phone: None,
            active: true,
            plan_id: None,
            created_at: Utc::now(),
        }
    }

    fn bucket(id: i32, kind: CreditKind, quantity: i32, expires_in_days: Option<i64>) -> CreditBucket {
        CreditBucket {
            id,
            user_id: 1,
            kind,
            quantity,
            expires_at: expires_in_days.map(|d| Utc::now() + Duration::days(d)),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn profile_only_counts_usable_credits() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| Ok(Some(user(id))));

        let mut credits = MockCreditRepository::new();
        credits.expect_list_for_user().returning(|_| {
            Ok(vec![
                bucket(1, CreditKind::Plan, 10, Some(-1)),
                bucket(2, CreditKind::Additional, 5, None),
                bucket(3, CreditKind::Refunded, 2, None),
            ])
        });

        let mut pools = MockHourPoolRepository::new();
        pools.expect_find_active_for_user().returning(|_, _| Ok(None));

        let mut companies = MockCompanyRepository::new();
        companies.expect_find_by_user().returning(|_| Ok(None));

        let uow = TestUnitOfWork::default()
            .with_users(users)
            .with_credits(credits)
            .with_hour_pools(pools)
            .with_companies(companies);

        let profile = UserManager::new(Arc::new(uow)).profile(1).await.unwrap();

        assert_eq!(profile.available_credits, 7);
        assert_eq!(profile.credits.len(), 2);
        assert!(profile.plan.is_none());
    }

    #[tokio::test]
    async fn update_own_rejects_empty_patch() {
        let service = UserManager::new(Arc::new(TestUnitOfWork::default()));
        let result = service.update_own(1, ProfilePatch::default()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn update_user_applies_profile_fields() {
        let mut users = MockUserRepository::new();
        users
            .expect_update()
            .withf(|id, patch| *id == 3 && patch.active == Some(false) && patch.plan_id.is_none())
            .times(1)
            .returning(|id, _| {
                let mut u = user(id);
                u.active = false;
                Ok(u)
            });

        let service = UserManager::new(Arc::new(TestUnitOfWork::default().with_users(users)));
        let updated = service
            .update_user(
                3,
                UserPatch {
                    active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(!updated.active);
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));

        let service = UserManager::new(Arc::new(TestUnitOfWork::default().with_users(users)));
        assert!(matches!(service.get_user(8).await, Err(AppError::NotFound)));
    }
}

//! User persistence.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use super::query::{conflict_on_unique, fetch_page};
use crate::config::ROLE_USER;
use crate::domain::{NewUser, User, UserPatch};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>>;

    /// Find user by email
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Insert an active user with the default role.
    async fn create(&self, user: NewUser) -> AppResult<User>;

    /// Apply profile, role and status changes. Plan assignment is a ledger operation and
    /// goes through a transaction instead, so `patch.plan_id` is ignored here.
    async fn update(&self, id: i32, patch: UserPatch) -> AppResult<User>;

    /// Enable or disable an account
    ///
    /// # Errors
    /// Returns `NotFound` if no user has this ID.
    async fn set_active(&self, id: i32, active: bool) -> AppResult<User>;

    /// List one page of users
    ///
    /// # Returns
    /// * `(Vec<User>, u64)` - The page and the total row count
    async fn list(&self, params: PaginationParams) -> AppResult<(Vec<User>, u64)>;
}

pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: i32) -> AppResult<user::Model> {
        UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        let model = UserEntity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let model = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(model.map(User::from))
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let model = ActiveModel {
            first_name: Set(new_user.first_name),
            last_name: Set(new_user.last_name),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            role: Set(ROLE_USER.to_string()),
            phone: Set(new_user.phone),
            active: Set(true),
            plan_id: Set(None),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(conflict_on_unique("User"))?;

        Ok(User::from(model))
    }

    async fn update(&self, id: i32, patch: UserPatch) -> AppResult<User> {
        let mut active: ActiveModel = self.find_model(id).await?.into();

        if let Some(first_name) = patch.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = patch.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(phone) = patch.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(role) = patch.role {
            active.role = Set(role.to_string());
        }
        if let Some(is_active) = patch.active {
            active.active = Set(is_active);
        }

        let model = active.update(&self.db).await?;
        Ok(User::from(model))
    }

    async fn set_active(&self, id: i32, is_active: bool) -> AppResult<User> {
        let mut active: ActiveModel = self.find_model(id).await?.into();
        active.active = Set(is_active);
        let model = active.update(&self.db).await?;
        Ok(User::from(model))
    }

    async fn list(&self, params: PaginationParams) -> AppResult<(Vec<User>, u64)> {
        let select = UserEntity::find().order_by_asc(user::Column::Id);
        let (models, total) = fetch_page(select, &self.db, &params).await?;
        Ok((models.into_iter().map(User::from).collect(), total))
    }
}

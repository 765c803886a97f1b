//! Password reset token persistence.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use super::entities::password_reset::{self, Entity as ResetEntity};
use crate::domain::{NewPasswordReset, PasswordReset};
use crate::errors::AppResult;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PasswordResetRepository: Send + Sync {
    /// Find a reset by its token, used or not
    async fn find_by_token(&self, token: &str) -> AppResult<Option<PasswordReset>>;

    /// Store a freshly issued reset token
    async fn create(&self, reset: NewPasswordReset) -> AppResult<PasswordReset>;
}

pub struct PasswordResetStore {
    db: DatabaseConnection,
}

impl PasswordResetStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PasswordResetRepository for PasswordResetStore {
    async fn find_by_token(&self, token: &str) -> AppResult<Option<PasswordReset>> {
        Ok(ResetEntity::find()
            .filter(password_reset::Column::Token.eq(token))
            .one(&self.db)
            .await?
            .map(PasswordReset::from))
    }

    async fn create(&self, reset: NewPasswordReset) -> AppResult<PasswordReset> {
        let model = password_reset::ActiveModel {
            token: Set(reset.token),
            email: Set(reset.email),
            expires_at: Set(reset.expires_at),
            user_id: Set(reset.user_id),
            used: Set(false),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        Ok(PasswordReset::from(model))
    }
}

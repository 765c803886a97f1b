//! Authentication service - Accounts, sessions and password recovery.
//!
//! Password hashing lives in the domain `Password` value object; token redemption and the
//! password write share one transaction.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use super::notifier::{Notification, Notifications};
use crate::config::{Config, TOKEN_TYPE_BEARER};
use crate::domain::{Actor, NewPasswordReset, NewUser, Password, User, UserResponse};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::with_transaction;

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Returned after a successful login
#[derive(Debug, Serialize, ToSchema)]
pub struct Session {
    /// JWT access token, also set as the `token` cookie
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Seconds until the token expires
    #[schema(example = 3600)]
    pub expires_in: i64,
    pub user: UserResponse,
}

/// New account data
#[derive(Debug, Clone)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user
    ///
    /// # Errors
    /// Returns `Conflict` if the email is taken and `Validation` for a short password.
    async fn register(&self, registration: Registration) -> AppResult<User>;

    /// Login and return a JWT together with the user
    ///
    /// # Errors
    /// Returns `InvalidCredentials` for an unknown email or a wrong password, and
    /// `UserInactive` for a disabled account.
    async fn login(&self, email: String, password: String) -> AppResult<Session>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    /// Resolve a token to an active user.
    async fn authenticate(&self, token: &str) -> AppResult<User>;

    /// Set a new password for `user_id`. Only the user or an admin may do so.
    ///
    /// # Arguments
    /// * `actor` - Caller performing the change
    /// * `user_id` - Account whose password changes
    /// * `password` - New plain-text password
    async fn change_password(&self, actor: Actor, user_id: i32, password: String)
        -> AppResult<()>;

    /// Issue a reset token and email the link.
    async fn request_password_reset(&self, email: String) -> AppResult<()>;

    /// Check a reset token exists, is unused and has not expired
    async fn validate_reset_token(&self, token: &str) -> AppResult<()>;

    /// Redeem a reset token, setting the new password in the same transaction
    async fn reset_password(&self, token: String, password: String) -> AppResult<()>;
}

fn generate_token(user: &User, config: &Config) -> AppResult<String> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role.to_string(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?)
}

fn verify_token_internal(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
    notifications: Notifications,
}

impl<U: UnitOfWork> Authenticator<U> {
    /// Create new auth service instance with Unit of Work
    pub fn new(uow: Arc<U>, config: Config, notifications: Notifications) -> Self {
        Self {
            uow,
            config,
            notifications,
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, registration: Registration) -> AppResult<User> {
        let email = normalize_email(&registration.email);
        if self.uow.users().find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("User"));
        }

        let password_hash = Password::new(&registration.password)?.into_string();
        let user = self
            .uow
            .users()
            .create(NewUser {
                first_name: registration.first_name,
                last_name: registration.last_name,
                email,
                password_hash,
                phone: registration.phone,
            })
            .await?;

        tracing::info!(user_id = user.id, "User registered");
        self.notifications.emit(Notification::UserRegistered {
            name: user.full_name(),
            email: user.email.clone(),
        });

        Ok(user)
    }

    async fn login(&self, email: String, password: String) -> AppResult<Session> {
        let email = normalize_email(&email);

        let Some(user) = self.uow.users().find_by_email(&email).await? else {
            Password::verify_dummy(&password);
            return Err(AppError::InvalidCredentials);
        };

        if !Password::from_hash(user.password_hash.clone()).verify(&password) {
            tracing::debug!(user_id = user.id, "Rejected login with wrong password");
            return Err(AppError::InvalidCredentials);
        }
        if !user.active {
            return Err(AppError::UserInactive);
        }

        let access_token = generate_token(&user, &self.config)?;
        tracing::info!(user_id = user.id, "User logged in");

        Ok(Session {
            access_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.config.jwt_expiration_seconds(),
            user: UserResponse::from(user),
        })
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        verify_token_internal(token, &self.config)
    }

    async fn authenticate(&self, token: &str) -> AppResult<User> {
        let claims = self.verify_token(token)?;
        let user = self
            .uow
            .users()
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !user.active {
            return Err(AppError::UserInactive);
        }
        Ok(user)
    }

    async fn change_password(
        &self,
        actor: Actor,
        user_id: i32,
        password: String,
    ) -> AppResult<()> {
        actor.ensure_owns(user_id)?;
        let password_hash = Password::new(&password)?.into_string();

        with_transaction!(self.uow, |ctx| {
            let users = ctx.users();
            users.find_by_id(user_id).await?.ok_or(AppError::NotFound)?;
            users.set_password_hash(user_id, password_hash).await
        })?;

        tracing::info!(user_id, changed_by = actor.user_id, "Password changed");
        Ok(())
    }

    async fn request_password_reset(&self, email: String) -> AppResult<()> {
        let user = self
            .uow
            .users()
            .find_by_email(&normalize_email(&email))
            .await?
            .ok_or(AppError::NotFound)?;
        if !user.active {
            return Err(AppError::disabled("User account"));
        }

        let reset = self
            .uow
            .password_resets()
            .create(NewPasswordReset::issue(user.id, user.email.as_str(), Utc::now()))
            .await?;

        tracing::info!(user_id = user.id, "Password reset requested");
        self.notifications.emit(Notification::PasswordResetRequested {
            name: user.full_name(),
            email: user.email,
            link: self.config.password_reset_link(&reset.token),
        });

        Ok(())
    }

    async fn validate_reset_token(&self, token: &str) -> AppResult<()> {
        self.uow
            .password_resets()
            .find_by_token(token)
            .await?
            .ok_or(AppError::NotFound)?
            .ensure_redeemable(Utc::now())
    }

    async fn reset_password(&self, token: String, password: String) -> AppResult<()> {
        let password_hash = Password::new(&password)?.into_string();

        let user_id = with_transaction!(self.uow, |ctx| {
            let resets = ctx.password_resets();
            let reset = resets
                .find_by_token(&token)
                .await?
                .ok_or(AppError::NotFound)?;
            reset.ensure_redeemable(Utc::now())?;

            ctx.users()
                .set_password_hash(reset.user_id, password_hash)
                .await?;
            resets.mark_used(reset.id).await?;
            Ok(reset.user_id)
        })?;

        tracing::info!(user_id, "Password reset completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PasswordReset, UserRole};
    use crate::infra::repositories::{MockPasswordResetRepository, MockUserRepository};
    use crate::services::testing::{quiet_notifications, test_config, TestUnitOfWork};

    fn user(id: i32, password: &str, active: bool) -> User {
        User {
            id,
            first_name: "Ana".into(),
            last_name: "García".into(),
            email: "ana@example.com".into(),
            password_hash: Password::new(password).unwrap().into_string(),
            role: UserRole::User,
            phone: None,
            active,
            plan_id: None,
            created_at: Utc::now(),
        }
    }

    fn service(uow: TestUnitOfWork) -> Authenticator<TestUnitOfWork> {
        Authenticator::new(Arc::new(uow), test_config(), quiet_notifications())
    }

    #[tokio::test]
    async fn register_rejects_taken_email() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .withf(|email| email == "ana@example.com")
            .returning(|_| Ok(Some(user(1, "password123", true))));

        let result = service(TestUnitOfWork::default().with_users(users))
            .register(Registration {
                first_name: "Ana".into(),
                last_name: "García".into(),
                email: "  Ana@Example.com ".into(),
                password: "password123".into(),
                phone: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn login_returns_session_for_valid_credentials() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(|_| Ok(Some(user(4, "password123", true))));

        let auth = service(TestUnitOfWork::default().with_users(users));
        let session = auth
            .login("ana@example.com".into(), "password123".into())
            .await
            .unwrap();

        assert_eq!(session.token_type, "Bearer");
        assert_eq!(session.user.id, 4);
        assert_eq!(auth.verify_token(&session.access_token).unwrap().sub, 4);
    }

    #[tokio::test]
    async fn login_rejects_wrong_password_and_unknown_email() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .withf(|email| email == "ana@example.com")
            .returning(|_| Ok(Some(user(4, "password123", true))));
        users
            .expect_find_by_email()
            .withf(|email| email != "ana@example.com")
            .returning(|_| Ok(None));

        let auth = service(TestUnitOfWork::default().with_users(users));

        let wrong = auth.login("ana@example.com".into(), "nope-nope".into()).await;
        assert!(matches!(wrong, Err(AppError::InvalidCredentials)));

        let unknown = auth.login("who@example.com".into(), "password123".into()).await;
        assert!(matches!(unknown, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn login_rejects_inactive_user() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(|_| Ok(Some(user(4, "password123", false))));

        let result = service(TestUnitOfWork::default().with_users(users))
            .login("ana@example.com".into(), "password123".into())
            .await;

        assert!(matches!(result, Err(AppError::UserInactive)));
    }

    #[tokio::test]
    async fn authenticate_rejects_disabled_account() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(|_| Ok(Some(user(4, "password123", true))));
        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(user(id, "password123", false))));

        let auth = service(TestUnitOfWork::default().with_users(users));
        let session = auth
            .login("ana@example.com".into(), "password123".into())
            .await
            .unwrap();

        let result = auth.authenticate(&session.access_token).await;
        assert!(matches!(result, Err(AppError::UserInactive)));
    }

    #[tokio::test]
    async fn change_password_is_limited_to_self() {
        let actor = Actor {
            user_id: 2,
            role: UserRole::User,
        };
        let result = service(TestUnitOfWork::default())
            .change_password(actor, 3, "password123".into())
            .await;

        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn reset_request_for_disabled_account_conflicts() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(|_| Ok(Some(user(4, "password123", false))));

        let result = service(TestUnitOfWork::default().with_users(users))
            .request_password_reset("ana@example.com".into())
            .await;

        assert!(matches!(result, Err(AppError::Disabled(_))));
    }

    #[tokio::test]
    async fn reset_request_issues_a_token() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(|_| Ok(Some(user(4, "password123", true))));
        let mut resets = MockPasswordResetRepository::new();
        resets.expect_create().times(1).returning(|new| {
            Ok(PasswordReset {
                id: 1,
                token: new.token,
                email: new.email,
                expires_at: new.expires_at,
                user_id: new.user_id,
                used: false,
            })
        });

        let uow = TestUnitOfWork::default()
            .with_users(users)
            .with_password_resets(resets);
        assert!(service(uow)
            .request_password_reset("ana@example.com".into())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn used_reset_token_does_not_validate() {
        let mut resets = MockPasswordResetRepository::new();
        resets.expect_find_by_token().returning(|token| {
            Ok(Some(PasswordReset {
                id: 1,
                token: token.to_string(),
                email: "ana@example.com".into(),
                expires_at: Utc::now() + Duration::minutes(30),
                user_id: 4,
                used: true,
            }))
        });

        let result = service(TestUnitOfWork::default().with_password_resets(resets))
            .validate_reset_token("abc")
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}

//! Single-use password reset tokens.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::config::PASSWORD_RESET_TTL_MINUTES;
use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq)]
pub struct PasswordReset {
    pub id: i32,
    pub token: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
    pub user_id: i32,
    pub used: bool,
}

impl PasswordReset {
    /// A token can be redeemed once, before it expires.
    pub fn ensure_redeemable(&self, now: DateTime<Utc>) -> AppResult<()> {
        if self.used {
            return Err(AppError::validation("This reset link was already used"));
        }
        if self.expires_at <= now {
            return Err(AppError::validation("This reset link has expired"));
        }
        Ok(())
    }
}

/// Data needed to issue a token
#[derive(Debug, Clone)]
pub struct NewPasswordReset {
    pub token: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
    pub user_id: i32,
}

impl NewPasswordReset {
    /// Fresh 64-hex-character token for `user_id`, valid from `now`.
    pub fn issue(user_id: i32, email: impl Into<String>, now: DateTime<Utc>) -> Self {
        let token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        Self {
            token,
            email: email.into(),
            expires_at: now + Duration::minutes(PASSWORD_RESET_TTL_MINUTES),
            user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_are_long_and_unique() {
        let now = Utc::now();
        let a = NewPasswordReset::issue(1, "a@example.com", now);
        let b = NewPasswordReset::issue(1, "a@example.com", now);
        assert_eq!(a.token.len(), 64);
        assert_ne!(a.token, b.token);
        assert_eq!(a.expires_at, now + Duration::hours(1));
    }

    #[test]
    fn used_or_expired_tokens_are_rejected() {
        let now = Utc::now();
        let mut reset = PasswordReset {
            id: 1,
            token: "t".into(),
            email: "a@example.com".into(),
            expires_at: now + Duration::minutes(5),
            user_id: 1,
            used: false,
        };
        assert!(reset.ensure_redeemable(now).is_ok());

        reset.used = true;
        assert!(reset.ensure_redeemable(now).is_err());

        reset.used = false;
        assert!(reset.ensure_redeemable(now + Duration::minutes(6)).is_err());
    }
}

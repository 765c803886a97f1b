//! Credit buckets: typed quantities of credits owned by a user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::config::{CREDIT_KIND_ADDITIONAL, CREDIT_KIND_PLAN, CREDIT_KIND_REFUNDED};
use crate::errors::{AppError, AppResult};

use super::purchase::CreditPurchase;
use super::usage::Search;

/// Origin of a bucket's credits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum CreditKind {
    /// Granted by the user's plan; only the newest one is usable
    #[serde(rename = "plan")]
    Plan,
    /// Bought on top of the plan
    #[serde(rename = "adicional")]
    Additional,
    /// Returned after a finalized search was cancelled
    #[serde(rename = "devuelto")]
    Refunded,
}

impl CreditKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CreditKind::Plan => CREDIT_KIND_PLAN,
            CreditKind::Additional => CREDIT_KIND_ADDITIONAL,
            CreditKind::Refunded => CREDIT_KIND_REFUNDED,
        }
    }

    /// Debit priority, lowest first.
    pub fn priority(&self) -> u8 {
        match self {
            CreditKind::Refunded => 0,
            CreditKind::Plan => 1,
            CreditKind::Additional => 2,
        }
    }
}

impl std::str::FromStr for CreditKind {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s {
            CREDIT_KIND_PLAN => Ok(CreditKind::Plan),
            CREDIT_KIND_ADDITIONAL => Ok(CreditKind::Additional),
            CREDIT_KIND_REFUNDED => Ok(CreditKind::Refunded),
            other => Err(AppError::validation(format!("Unknown credit kind '{}'", other))),
        }
    }
}

impl std::fmt::Display for CreditKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of credits of a single kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreditBucket {
    #[schema(example = 12)]
    pub id: i32,
    #[schema(example = 42)]
    pub user_id: i32,
    pub kind: CreditKind,
    #[schema(example = 30)]
    pub quantity: i32,
    /// `None` never expires
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl CreditBucket {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(false, |at| at < now)
    }
}

/// Data needed to insert a bucket
#[derive(Debug, Clone, PartialEq)]
pub struct NewCreditBucket {
    pub user_id: i32,
    pub kind: CreditKind,
    pub quantity: i32,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewCreditBucket {
    /// Bucket holding credits returned by a reversal with nowhere else to go.
    pub fn refund(user_id: i32, quantity: i32) -> Self {
        Self {
            user_id,
            kind: CreditKind::Refunded,
            quantity,
            expires_at: None,
        }
    }
}

/// Administrative bucket creation
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCreditBucket {
    #[schema(example = 42)]
    pub user_id: i32,
    pub kind: CreditKind,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    #[schema(example = 10)]
    pub quantity: i32,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<CreateCreditBucket> for NewCreditBucket {
    fn from(input: CreateCreditBucket) -> Self {
        Self {
            user_id: input.user_id,
            kind: input.kind,
            quantity: input.quantity,
            expires_at: input.expires_at,
        }
    }
}

/// Administrative correction of a bucket
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreditBucketPatch {
    pub kind: Option<CreditKind>,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: Option<i32>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl CreditBucketPatch {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.quantity.is_none() && self.expires_at.is_none()
    }
}

/// A bucket together with the searches drawn from it and the purchases that funded it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreditBucketDetail {
    #[serde(flatten)]
    pub bucket: CreditBucket,
    pub searches: Vec<Search>,
    pub purchases: Vec<CreditPurchase>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn kind_round_trips_through_storage_names() {
        for kind in [CreditKind::Plan, CreditKind::Additional, CreditKind::Refunded] {
            assert_eq!(kind.as_str().parse::<CreditKind>().unwrap(), kind);
        }
        assert!("bonus".parse::<CreditKind>().is_err());
    }

    #[test]
    fn refunded_credits_are_spent_first() {
        assert!(CreditKind::Refunded.priority() < CreditKind::Plan.priority());
        assert!(CreditKind::Plan.priority() < CreditKind::Additional.priority());
    }

    #[test]
    fn bucket_without_expiry_never_expires() {
        let now = Utc::now();
        let mut bucket = CreditBucket {
            id: 1,
            user_id: 1,
            kind: CreditKind::Additional,
            quantity: 5,
            expires_at: None,
            created_at: now,
        };
        assert!(!bucket.is_expired(now + Duration::days(3650)));

        bucket.expires_at = Some(now - Duration::seconds(1));
        assert!(bucket.is_expired(now));
    }
}

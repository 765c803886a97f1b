//! Consultancy hour pools.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::errors::{AppError, AppResult};

use super::usage::Consultation;

/// Hour balance of a user for one plan cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HourPool {
    #[schema(example = 3)]
    pub id: i32,
    #[schema(example = 42)]
    pub user_id: i32,
    #[schema(example = 10)]
    pub total_hours: i32,
    #[schema(example = 4)]
    pub remaining_hours: i32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl HourPool {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    /// Remaining hours after consuming `hours`.
    pub fn debited(&self, hours: i32) -> AppResult<i32> {
        if hours <= 0 {
            return Err(AppError::validation("Hours to debit must be positive"));
        }
        if self.remaining_hours < hours {
            return Err(AppError::InsufficientHours {
                requested: hours,
                remaining: self.remaining_hours,
            });
        }
        Ok(self.remaining_hours - hours)
    }

    /// Remaining hours after giving `hours` back. Not capped by the total.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::LedgerWrite`] when the balance would overflow.
    pub fn credited(&self, hours: i32) -> AppResult<i32> {
        self.remaining_hours.checked_add(hours).ok_or_else(|| {
            AppError::LedgerWrite(format!("hour pool {} would overflow", self.id))
        })
    }
}

/// Data needed to insert a pool
#[derive(Debug, Clone, PartialEq)]
pub struct NewHourPool {
    pub user_id: i32,
    pub total_hours: i32,
    pub expires_at: DateTime<Utc>,
}

/// Administrative pool creation; remaining starts equal to total.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateHourPool {
    #[schema(example = 42)]
    pub user_id: i32,
    #[validate(range(min = 0, message = "Total hours cannot be negative"))]
    #[schema(example = 10)]
    pub total_hours: i32,
    pub expires_at: DateTime<Utc>,
}

impl From<CreateHourPool> for NewHourPool {
    fn from(input: CreateHourPool) -> Self {
        Self {
            user_id: input.user_id,
            total_hours: input.total_hours,
            expires_at: input.expires_at,
        }
    }
}

/// Administrative correction of a pool
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct HourPoolPatch {
    #[validate(range(min = 0, message = "Total hours cannot be negative"))]
    pub total_hours: Option<i32>,
    #[validate(range(min = 0, message = "Remaining hours cannot be negative"))]
    pub remaining_hours: Option<i32>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl HourPoolPatch {
    pub fn is_empty(&self) -> bool {
        self.total_hours.is_none() && self.remaining_hours.is_none() && self.expires_at.is_none()
    }

    /// Check the pool this patch would produce keeps `remaining <= total`.
    pub fn check_against(&self, pool: &HourPool) -> AppResult<()> {
        let total = self.total_hours.unwrap_or(pool.total_hours);
        let remaining = self.remaining_hours.unwrap_or(pool.remaining_hours);
        if remaining > total {
            return Err(AppError::validation(
                "Remaining hours cannot exceed total hours",
            ));
        }
        Ok(())
    }
}

/// A pool together with the consultations charged against it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HourPoolDetail {
    #[serde(flatten)]
    pub pool: HourPool,
    pub consultations: Vec<Consultation>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn pool(remaining: i32) -> HourPool {
        let now = Utc::now();
        HourPool {
            id: 1,
            user_id: 1,
            total_hours: 10,
            remaining_hours: remaining,
            expires_at: now + Duration::days(30),
            created_at: now,
        }
    }

    #[test]
    fn debiting_exactly_the_remainder_leaves_zero() {
        assert_eq!(pool(4).debited(4).unwrap(), 0);
    }

    #[test]
    fn debiting_past_the_remainder_fails() {
        let err = pool(4).debited(5).unwrap_err();
        assert!(matches!(
            err,
            AppError::InsufficientHours {
                requested: 5,
                remaining: 4
            }
        ));
    }

    #[test]
    fn zero_hours_is_rejected() {
        assert!(matches!(pool(4).debited(0), Err(AppError::Validation(_))));
    }

    #[test]
    fn crediting_past_the_integer_range_fails() {
        assert_eq!(pool(4).credited(3).unwrap(), 7);
        assert!(matches!(
            pool(i32::MAX - 1).credited(2),
            Err(AppError::LedgerWrite(_))
        ));
    }

    #[test]
    fn patch_cannot_push_remaining_over_total() {
        let patch = HourPoolPatch {
            remaining_hours: Some(11),
            ..Default::default()
        };
        assert!(patch.check_against(&pool(4)).is_err());

        let patch = HourPoolPatch {
            total_hours: Some(20),
            remaining_hours: Some(11),
            ..Default::default()
        };
        assert!(patch.check_against(&pool(4)).is_ok());
    }
}

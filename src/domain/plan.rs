//! Subscription plans and what assigning one grants.

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::config::HOUR_POOL_MONTHS;
use crate::errors::{AppError, AppResult};

use super::credit::{CreditKind, NewCreditBucket};
use super::hours::NewHourPool;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Plan {
    #[schema(example = 2)]
    pub id: i32,
    #[schema(example = "Pyme")]
    pub name: String,
    /// Credits granted per assignment
    #[schema(example = 30)]
    pub monthly_credits: i32,
    /// Months the granted credits stay valid
    #[schema(example = 3)]
    pub credit_months: i32,
    /// Consultancy hours granted per assignment
    #[schema(example = 10)]
    pub consulting_hours: i32,
    #[schema(example = 150000.0)]
    pub price: f64,
    /// Tailored to a single customer
    pub custom: bool,
    pub active: bool,
}

/// Buckets created when a plan is assigned or renewed.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanGrant {
    pub credits: NewCreditBucket,
    pub hours: NewHourPool,
}

impl Plan {
    /// Entitlements for `user_id` starting at `now`.
    pub fn grant(&self, user_id: i32, now: DateTime<Utc>) -> AppResult<PlanGrant> {
        if !self.active {
            return Err(AppError::validation(format!(
                "Plan '{}' is disabled and cannot be assigned",
                self.name
            )));
        }

        let credit_months = u32::try_from(self.credit_months)
            .map_err(|_| AppError::validation("Plan credit months cannot be negative"))?;
        let credits_expire_at = now
            .checked_add_months(Months::new(credit_months))
            .ok_or_else(|| AppError::validation("Plan credit months out of range"))?;
        let hours_expire_at = now
            .checked_add_months(Months::new(HOUR_POOL_MONTHS))
            .ok_or_else(|| AppError::internal("Hour pool expiry out of range"))?;

        Ok(PlanGrant {
            credits: NewCreditBucket {
                user_id,
                kind: CreditKind::Plan,
                quantity: self.monthly_credits,
                expires_at: Some(credits_expire_at),
            },
            hours: NewHourPool {
                user_id,
                total_hours: self.consulting_hours,
                expires_at: hours_expire_at,
            },
        })
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePlan {
    #[validate(length(min = 1, message = "Plan name is required"))]
    #[schema(example = "Pyme")]
    pub name: String,
    #[validate(range(min = 0, message = "Monthly credits cannot be negative"))]
    pub monthly_credits: i32,
    #[validate(range(min = 0, message = "Credit months cannot be negative"))]
    pub credit_months: i32,
    #[validate(range(min = 0, message = "Consulting hours cannot be negative"))]
    pub consulting_hours: i32,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
    #[serde(default)]
    pub custom: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct PlanPatch {
    #[validate(length(min = 1, message = "Plan name cannot be empty"))]
    pub name: Option<String>,
    #[validate(range(min = 0, message = "Monthly credits cannot be negative"))]
    pub monthly_credits: Option<i32>,
    #[validate(range(min = 0, message = "Credit months cannot be negative"))]
    pub credit_months: Option<i32>,
    #[validate(range(min = 0, message = "Consulting hours cannot be negative"))]
    pub consulting_hours: Option<i32>,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: Option<f64>,
    pub custom: Option<bool>,
}

impl PlanPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.monthly_credits.is_none()
            && self.credit_months.is_none()
            && self.consulting_hours.is_none()
            && self.price.is_none()
            && self.custom.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn plan() -> Plan {
        Plan {
            id: 1,
            name: "Pyme".into(),
            monthly_credits: 30,
            credit_months: 3,
            consulting_hours: 10,
            price: 1000.0,
            custom: false,
            active: true,
        }
    }

    #[test]
    fn grant_expires_credits_and_hours_on_their_own_schedules() {
        let now = Utc.with_ymd_and_hms(2025, 1, 31, 12, 0, 0).unwrap();
        let grant = plan().grant(9, now).unwrap();

        assert_eq!(grant.credits.kind, CreditKind::Plan);
        assert_eq!(grant.credits.quantity, 30);
        assert_eq!(
            grant.credits.expires_at,
            Some(Utc.with_ymd_and_hms(2025, 4, 30, 12, 0, 0).unwrap())
        );
        assert_eq!(grant.hours.total_hours, 10);
        // month arithmetic clamps to the last day of February
        assert_eq!(
            grant.hours.expires_at,
            Utc.with_ymd_and_hms(2025, 2, 28, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn disabled_plan_cannot_be_granted() {
        let mut disabled = plan();
        disabled.active = false;
        assert!(matches!(
            disabled.grant(1, Utc::now()),
            Err(AppError::Validation(_))
        ));
    }
}

//! Purchase records for plans and extra credits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PlanPurchase {
    pub id: i32,
    #[schema(example = "transferencia")]
    pub payment_method: String,
    pub notes: Option<String>,
    #[schema(example = 150000.0)]
    pub amount_paid: f64,
    pub plan_id: i32,
    pub user_id: i32,
    pub purchased_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePlanPurchase {
    #[validate(length(min = 1, message = "Payment method is required"))]
    pub payment_method: String,
    pub notes: Option<String>,
    #[validate(range(min = 0.0, message = "Amount paid cannot be negative"))]
    pub amount_paid: f64,
    pub plan_id: i32,
    pub user_id: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct PlanPurchasePatch {
    #[validate(length(min = 1, message = "Payment method cannot be empty"))]
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    #[validate(range(min = 0.0, message = "Amount paid cannot be negative"))]
    pub amount_paid: Option<f64>,
}

impl PlanPurchasePatch {
    pub fn is_empty(&self) -> bool {
        self.payment_method.is_none() && self.notes.is_none() && self.amount_paid.is_none()
    }
}

/// Purchase of extra credits; each one funds exactly one `adicional` bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreditPurchase {
    pub id: i32,
    #[schema(example = "tarjeta")]
    pub payment_method: String,
    #[schema(example = 25000.0)]
    pub cost: f64,
    pub notes: Option<String>,
    pub bucket_id: i32,
    pub purchased_at: DateTime<Utc>,
}

/// Buy `quantity` extra credits for a user.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCreditPurchase {
    pub user_id: i32,
    #[validate(range(min = 1, message = "Quantity must be positive"))]
    #[schema(example = 10)]
    pub quantity: i32,
    #[validate(length(min = 1, message = "Payment method is required"))]
    pub payment_method: String,
    #[validate(range(min = 0.0, message = "Cost cannot be negative"))]
    pub cost: f64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreditPurchasePatch {
    #[validate(length(min = 1, message = "Payment method cannot be empty"))]
    pub payment_method: Option<String>,
    #[validate(range(min = 0.0, message = "Cost cannot be negative"))]
    pub cost: Option<f64>,
    pub notes: Option<String>,
}

impl CreditPurchasePatch {
    pub fn is_empty(&self) -> bool {
        self.payment_method.is_none() && self.cost.is_none() && self.notes.is_none()
    }
}

//! Plan catalogue and plan purchase persistence.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use super::entities::plan::{self, Entity as PlanEntity};
use super::entities::plan_purchase::{self, Entity as PlanPurchaseEntity};
use super::query::fetch_page;
use crate::domain::{
    CreatePlan, CreatePlanPurchase, Plan, PlanPatch, PlanPurchase, PlanPurchasePatch,
};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// Find plan by ID
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Plan>>;

    /// Every plan, enabled or not, by id.
    async fn list(&self) -> AppResult<Vec<Plan>>;

    async fn create(&self, input: CreatePlan) -> AppResult<Plan>;

    async fn update(&self, id: i32, patch: PlanPatch) -> AppResult<Plan>;

    /// Enable or disable a plan
    async fn set_active(&self, id: i32, active: bool) -> AppResult<Plan>;
}

pub struct PlanStore {
    db: DatabaseConnection,
}

impl PlanStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: i32) -> AppResult<plan::Model> {
        PlanEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }
}

#[async_trait]
impl PlanRepository for PlanStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Plan>> {
        Ok(PlanEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Plan::from))
    }

    async fn list(&self) -> AppResult<Vec<Plan>> {
        let models = PlanEntity::find()
            .order_by_asc(plan::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Plan::from).collect())
    }

    async fn create(&self, input: CreatePlan) -> AppResult<Plan> {
        let model = plan::ActiveModel {
            name: Set(input.name),
            monthly_credits: Set(input.monthly_credits),
            credit_months: Set(input.credit_months),
            consulting_hours: Set(input.consulting_hours),
            price: Set(input.price),
            custom: Set(input.custom),
            active: Set(true),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        Ok(Plan::from(model))
    }

    async fn update(&self, id: i32, patch: PlanPatch) -> AppResult<Plan> {
        let mut active: plan::ActiveModel = self.find_model(id).await?.into();

        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(credits) = patch.monthly_credits {
            active.monthly_credits = Set(credits);
        }
        if let Some(months) = patch.credit_months {
            active.credit_months = Set(months);
        }
        if let Some(hours) = patch.consulting_hours {
            active.consulting_hours = Set(hours);
        }
        if let Some(price) = patch.price {
            active.price = Set(price);
        }
        if let Some(custom) = patch.custom {
            active.custom = Set(custom);
        }

        Ok(Plan::from(active.update(&self.db).await?))
    }

    async fn set_active(&self, id: i32, is_active: bool) -> AppResult<Plan> {
        let mut active: plan::ActiveModel = self.find_model(id).await?.into();
        active.active = Set(is_active);
        Ok(Plan::from(active.update(&self.db).await?))
    }
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PlanPurchaseRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<PlanPurchase>>;

    /// List one page of plan purchases with the total count
    async fn list(&self, params: PaginationParams) -> AppResult<(Vec<PlanPurchase>, u64)>;

    async fn create(&self, input: CreatePlanPurchase) -> AppResult<PlanPurchase>;

    async fn update(&self, id: i32, patch: PlanPurchasePatch) -> AppResult<PlanPurchase>;

    async fn delete(&self, id: i32) -> AppResult<()>;
}

pub struct PlanPurchaseStore {
    db: DatabaseConnection,
}

impl PlanPurchaseStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PlanPurchaseRepository for PlanPurchaseStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<PlanPurchase>> {
        Ok(PlanPurchaseEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(PlanPurchase::from))
    }

    async fn list(&self, params: PaginationParams) -> AppResult<(Vec<PlanPurchase>, u64)> {
        let select = PlanPurchaseEntity::find().order_by_desc(plan_purchase::Column::PurchasedAt);
        let (models, total) = fetch_page(select, &self.db, &params).await?;
        Ok((models.into_iter().map(PlanPurchase::from).collect(), total))
    }

    async fn create(&self, input: CreatePlanPurchase) -> AppResult<PlanPurchase> {
        let model = plan_purchase::ActiveModel {
            payment_method: Set(input.payment_method),
            notes: Set(input.notes),
            amount_paid: Set(input.amount_paid),
            plan_id: Set(input.plan_id),
            user_id: Set(input.user_id),
            purchased_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        Ok(PlanPurchase::from(model))
    }

    async fn update(&self, id: i32, patch: PlanPurchasePatch) -> AppResult<PlanPurchase> {
        let model = PlanPurchaseEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;
        let mut active: plan_purchase::ActiveModel = model.into();

        if let Some(method) = patch.payment_method {
            active.payment_method = Set(method);
        }
        if let Some(notes) = patch.notes {
            active.notes = Set(Some(notes));
        }
        if let Some(amount) = patch.amount_paid {
            active.amount_paid = Set(amount);
        }

        Ok(PlanPurchase::from(active.update(&self.db).await?))
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = PlanPurchaseEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

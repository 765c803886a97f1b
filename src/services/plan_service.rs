//! Plan catalogue, plan purchases and plan assignment.
//!
//! Assigning or renewing a plan is a ledger operation: the user's plan, the new `plan`
//! credit bucket and the new hour pool are written in one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::ledger::LedgerStore;
use crate::domain::{
    CreatePlan, CreatePlanPurchase, CreditBucket, HourPool, Plan, PlanPatch, PlanPurchase,
    PlanPurchasePatch, UserResponse,
};
use crate::errors::{AppError, AppResult};
use crate::infra::{TransactionContext, UnitOfWork};
use crate::types::{Paginated, PaginationParams};
use crate::with_transaction;

/// Result of assigning or renewing a plan
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlanAssignment {
    pub user: UserResponse,
    pub plan: Plan,
    /// Newly created `plan` bucket
    pub credits: CreditBucket,
    /// Newly created hour pool
    pub hour_pool: HourPool,
}

/// Grant `plan` to `user_id` inside an open transaction.
pub(crate) async fn grant_plan(
    ctx: &TransactionContext<'_>,
    user_id: i32,
    plan: Plan,
    now: DateTime<Utc>,
) -> AppResult<PlanAssignment> {
    let grant = plan.grant(user_id, now)?;

    let users = ctx.users();
    users
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let ledger = ctx.ledger();
    let credits = ledger.create_bucket(grant.credits).await?;
    let hour_pool = ledger.create_pool(grant.hours).await?;
    let user = users.set_plan(user_id, plan.id).await?;

    tracing::info!(
        user_id,
        plan_id = plan.id,
        bucket_id = credits.id,
        pool_id = hour_pool.id,
        "Plan granted"
    );

    Ok(PlanAssignment {
        user: UserResponse::from(user),
        plan,
        credits,
        hour_pool,
    })
}

/// Look the plan up, then grant it in a transaction.
pub(crate) async fn assign_plan<U: UnitOfWork>(
    uow: &U,
    user_id: i32,
    plan_id: i32,
) -> AppResult<PlanAssignment> {
    let plan = uow
        .plans()
        .find_by_id(plan_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if !plan.active {
        return Err(AppError::validation(format!(
            "Plan '{}' is disabled and cannot be assigned",
            plan.name
        )));
    }

    with_transaction!(uow, |ctx| { grant_plan(&ctx, user_id, plan, Utc::now()).await })
}

#[async_trait]
pub trait PlanService: Send + Sync {
    /// List every plan, active or not
    async fn list_plans(&self) -> AppResult<Vec<Plan>>;

    /// Get plan by ID
    async fn get_plan(&self, id: i32) -> AppResult<Plan>;

    /// Create a plan
    async fn create_plan(&self, input: CreatePlan) -> AppResult<Plan>;

    async fn update_plan(&self, id: i32, patch: PlanPatch) -> AppResult<Plan>;

    /// Enable or disable a plan. Disabled plans cannot be assigned.
    async fn set_plan_active(&self, id: i32, active: bool) -> AppResult<Plan>;

    /// Grant the user's current plan again.
    async fn renew(&self, user_id: i32) -> AppResult<PlanAssignment>;

    /// List plan purchases
    async fn list_purchases(&self, params: PaginationParams)
        -> AppResult<Paginated<PlanPurchase>>;

    async fn get_purchase(&self, id: i32) -> AppResult<PlanPurchase>;

    /// Record a plan purchase for a user
    async fn create_purchase(&self, input: CreatePlanPurchase) -> AppResult<PlanPurchase>;

    async fn update_purchase(&self, id: i32, patch: PlanPurchasePatch)
        -> AppResult<PlanPurchase>;

    async fn delete_purchase(&self, id: i32) -> AppResult<()>;
}

pub struct PlanManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> PlanManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> PlanService for PlanManager<U> {
    async fn list_plans(&self) -> AppResult<Vec<Plan>> {
        self.uow.plans().list().await
    }

    async fn get_plan(&self, id: i32) -> AppResult<Plan> {
        self.uow
            .plans()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn create_plan(&self, input: CreatePlan) -> AppResult<Plan> {
        let plan = self.uow.plans().create(input).await?;
        tracing::info!(plan_id = plan.id, name = %plan.name, "Plan created");
        Ok(plan)
    }

    async fn update_plan(&self, id: i32, patch: PlanPatch) -> AppResult<Plan> {
        if patch.is_empty() {
            return Err(AppError::validation("No fields to update"));
        }
        self.uow.plans().update(id, patch).await
    }

    async fn set_plan_active(&self, id: i32, active: bool) -> AppResult<Plan> {
        let plan = self.uow.plans().set_active(id, active).await?;
        tracing::info!(plan_id = id, active, "Plan status changed");
        Ok(plan)
    }

    async fn renew(&self, user_id: i32) -> AppResult<PlanAssignment> {
        let user = self
            .uow
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let plan_id = user
            .plan_id
            .ok_or_else(|| AppError::validation("The user has no plan to renew"))?;

        assign_plan(self.uow.as_ref(), user_id, plan_id).await
    }

    async fn list_purchases(
        &self,
        params: PaginationParams,
    ) -> AppResult<Paginated<PlanPurchase>> {
        let (purchases, total) = self.uow.plan_purchases().list(params).await?;
        Ok(Paginated::new(purchases, &params, total))
    }

    async fn get_purchase(&self, id: i32) -> AppResult<PlanPurchase> {
        self.uow
            .plan_purchases()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn create_purchase(&self, input: CreatePlanPurchase) -> AppResult<PlanPurchase> {
        self.uow
            .plans()
            .find_by_id(input.plan_id)
            .await?
            .ok_or(AppError::NotFound)?;
        self.uow
            .users()
            .find_by_id(input.user_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let purchase = self.uow.plan_purchases().create(input).await?;
        tracing::info!(
            purchase_id = purchase.id,
            plan_id = purchase.plan_id,
            user_id = purchase.user_id,
            "Plan purchase recorded"
        );
        Ok(purchase)
    }

    async fn update_purchase(
        &self,
        id: i32,
        patch: PlanPurchasePatch,
    ) -> AppResult<PlanPurchase> {
        if patch.is_empty() {
            return Err(AppError::validation("No fields to update"));
        }
        self.uow.plan_purchases().update(id, patch).await
    }

    async fn delete_purchase(&self, id: i32) -> AppResult<()> {
        self.uow.plan_purchases().delete(id).await?;
        tracing::info!(purchase_id = id, "Plan purchase deleted");
        Ok(())
    }
}

//! Plan catalogue, plan renewals and plan purchase records.

use axum::{
    extract::{Query, State},
    routing::{get, patch, post},
    Extension, Router,
};

use crate::api::extractors::{PathId, ValidatedJson};
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{
    CreatePlan, CreatePlanPurchase, Plan, PlanPatch, PlanPurchase, PlanPurchasePatch,
};
use crate::errors::AppResult;
use crate::services::PlanAssignment;
use crate::types::{ApiResponse, Created, NoContent, Paginated, PaginationParams};

/// Mounted at `/planes`
pub fn plan_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_plans).post(create_plan))
        .route("/:id", get(get_plan).put(update_plan).delete(disable_plan))
        .route("/:id/enable", patch(enable_plan))
        .route("/renew/:user_id", post(renew_plan))
}

/// Mounted at `/compra-planes`
pub fn plan_purchase_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_plan_purchases).post(create_plan_purchase))
        .route(
            "/:id",
            get(get_plan_purchase)
                .put(update_plan_purchase)
                .delete(delete_plan_purchase),
        )
}

#[utoipa::path(
    get,
    path = "/api/planes",
    tag = "Plans",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All plans", body = [Plan]))
)]
pub async fn list_plans(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<Plan>>> {
    let plans = state.plan_service.list_plans().await?;
    Ok(ApiResponse::success(plans))
}

#[utoipa::path(
    get,
    path = "/api/planes/{id}",
    tag = "Plans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Plan ID")),
    responses(
        (status = 200, description = "Plan found", body = Plan),
        (status = 404, description = "Plan not found")
    )
)]
pub async fn get_plan(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<ApiResponse<Plan>> {
    let plan = state.plan_service.get_plan(id).await?;
    Ok(ApiResponse::success(plan))
}

/// Create a plan (admin only)
#[utoipa::path(
    post,
    path = "/api/planes",
    tag = "Plans",
    security(("bearer_auth" = [])),
    request_body = CreatePlan,
    responses(
        (status = 201, description = "Plan created", body = Plan),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn create_plan(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreatePlan>,
) -> AppResult<Created<Plan>> {
    require_admin(&current_user)?;
    let plan = state.plan_service.create_plan(payload).await?;
    Ok(Created(plan))
}

/// Edit a plan (admin only)
#[utoipa::path(
    put,
    path = "/api/planes/{id}",
    tag = "Plans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Plan ID")),
    request_body = PlanPatch,
    responses(
        (status = 200, description = "Plan updated", body = Plan),
        (status = 404, description = "Plan not found")
    )
)]
pub async fn update_plan(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    PathId(id): PathId,
    ValidatedJson(payload): ValidatedJson<PlanPatch>,
) -> AppResult<ApiResponse<Plan>> {
    require_admin(&current_user)?;
    let plan = state.plan_service.update_plan(id, payload).await?;
    Ok(ApiResponse::success(plan))
}

/// Disable a plan so it can no longer be assigned (admin only)
#[utoipa::path(
    delete,
    path = "/api/planes/{id}",
    tag = "Plans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Plan ID")),
    responses((status = 200, description = "Plan disabled", body = Plan))
)]
pub async fn disable_plan(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    PathId(id): PathId,
) -> AppResult<ApiResponse<Plan>> {
    require_admin(&current_user)?;
    let plan = state.plan_service.set_plan_active(id, false).await?;
    Ok(ApiResponse::with_message(plan, "Plan disabled"))
}

#[utoipa::path(
    patch,
    path = "/api/planes/{id}/enable",
    tag = "Plans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Plan ID")),
    responses((status = 200, description = "Plan enabled", body = Plan))
)]
pub async fn enable_plan(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    PathId(id): PathId,
) -> AppResult<ApiResponse<Plan>> {
    require_admin(&current_user)?;
    let plan = state.plan_service.set_plan_active(id, true).await?;
    Ok(ApiResponse::with_message(plan, "Plan enabled"))
}

/// Grant the user's current plan again: fresh credits and a fresh hour pool
#[utoipa::path(
    post,
    path = "/api/planes/renew/{user_id}",
    tag = "Plans",
    security(("bearer_auth" = [])),
    params(("user_id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Plan renewed", body = PlanAssignment),
        (status = 400, description = "User has no active plan"),
        (status = 404, description = "User not found")
    )
)]
pub async fn renew_plan(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    PathId(user_id): PathId,
) -> AppResult<ApiResponse<PlanAssignment>> {
    require_admin(&current_user)?;
    let assignment = state.plan_service.renew(user_id).await?;
    Ok(ApiResponse::with_message(assignment, "Plan renewed"))
}

#[utoipa::path(
    get,
    path = "/api/compra-planes",
    tag = "Plan purchases",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses((status = 200, description = "Page of plan purchases", body = [PlanPurchase]))
)]
pub async fn list_plan_purchases(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(params): Query<PaginationParams>,
) -> AppResult<ApiResponse<Paginated<PlanPurchase>>> {
    require_admin(&current_user)?;
    let purchases = state.plan_service.list_purchases(params).await?;
    Ok(ApiResponse::success(purchases))
}

#[utoipa::path(
    get,
    path = "/api/compra-planes/{id}",
    tag = "Plan purchases",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Purchase ID")),
    responses(
        (status = 200, description = "Purchase found", body = PlanPurchase),
        (status = 404, description = "Purchase not found")
    )
)]
pub async fn get_plan_purchase(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    PathId(id): PathId,
) -> AppResult<ApiResponse<PlanPurchase>> {
    require_admin(&current_user)?;
    let purchase = state.plan_service.get_purchase(id).await?;
    Ok(ApiResponse::success(purchase))
}

#[utoipa::path(
    post,
    path = "/api/compra-planes",
    tag = "Plan purchases",
    security(("bearer_auth" = [])),
    request_body = CreatePlanPurchase,
    responses(
        (status = 201, description = "Purchase recorded", body = PlanPurchase),
        (status = 404, description = "Plan or user not found")
    )
)]
pub async fn create_plan_purchase(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreatePlanPurchase>,
) -> AppResult<Created<PlanPurchase>> {
    require_admin(&current_user)?;
    let purchase = state.plan_service.create_purchase(payload).await?;
    Ok(Created(purchase))
}

#[utoipa::path(
    put,
    path = "/api/compra-planes/{id}",
    tag = "Plan purchases",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Purchase ID")),
    request_body = PlanPurchasePatch,
    responses((status = 200, description = "Purchase updated", body = PlanPurchase))
)]
pub async fn update_plan_purchase(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    PathId(id): PathId,
    ValidatedJson(payload): ValidatedJson<PlanPurchasePatch>,
) -> AppResult<ApiResponse<PlanPurchase>> {
    require_admin(&current_user)?;
    let purchase = state.plan_service.update_purchase(id, payload).await?;
    Ok(ApiResponse::success(purchase))
}

#[utoipa::path(
    delete,
    path = "/api/compra-planes/{id}",
    tag = "Plan purchases",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Purchase ID")),
    responses(
        (status = 204, description = "Purchase deleted"),
        (status = 404, description = "Purchase not found")
    )
)]
pub async fn delete_plan_purchase(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    PathId(id): PathId,
) -> AppResult<NoContent> {
    require_admin(&current_user)?;
    state.plan_service.delete_purchase(id).await?;
    Ok(NoContent)
}

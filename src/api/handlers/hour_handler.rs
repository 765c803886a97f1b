//! Consultancy hour pools.

use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Router,
};

use crate::api::extractors::{PathId, ValidatedJson};
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{CreateHourPool, HourPool, HourPoolDetail, HourPoolPatch};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, NoContent, Paginated, PaginationParams};

/// Mounted at `/consultorias`
pub fn hour_pool_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_pools).post(create_pool))
        .route("/self", get(own_pool))
        .route("/:id", get(get_pool).put(update_pool).delete(delete_pool))
}

/// Caller's unexpired pool with its consultations
#[utoipa::path(
    get,
    path = "/api/consultorias/self",
    tag = "Hour pools",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active pool", body = HourPoolDetail),
        (status = 404, description = "No active pool")
    )
)]
pub async fn own_pool(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<ApiResponse<HourPoolDetail>> {
    let pool = state.hour_service.own_pool(current_user.id).await?;
    Ok(ApiResponse::success(pool))
}

#[utoipa::path(
    get,
    path = "/api/consultorias",
    tag = "Hour pools",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses((status = 200, description = "Page of pools", body = [HourPoolDetail]))
)]
pub async fn list_pools(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(params): Query<PaginationParams>,
) -> AppResult<ApiResponse<Paginated<HourPoolDetail>>> {
    require_admin(&current_user)?;
    let pools = state.hour_service.list_pools(params).await?;
    Ok(ApiResponse::success(pools))
}

#[utoipa::path(
    get,
    path = "/api/consultorias/{id}",
    tag = "Hour pools",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Pool ID")),
    responses(
        (status = 200, description = "Pool found", body = HourPoolDetail),
        (status = 404, description = "Pool not found")
    )
)]
pub async fn get_pool(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    PathId(id): PathId,
) -> AppResult<ApiResponse<HourPoolDetail>> {
    require_admin(&current_user)?;
    let pool = state.hour_service.get_pool(id).await?;
    Ok(ApiResponse::success(pool))
}

/// Open a pool; remaining starts at the total
#[utoipa::path(
    post,
    path = "/api/consultorias",
    tag = "Hour pools",
    security(("bearer_auth" = [])),
    request_body = CreateHourPool,
    responses(
        (status = 201, description = "Pool created", body = HourPool),
        (status = 404, description = "User not found")
    )
)]
pub async fn create_pool(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateHourPool>,
) -> AppResult<Created<HourPool>> {
    require_admin(&current_user)?;
    let pool = state.hour_service.create_pool(payload).await?;
    Ok(Created(pool))
}

#[utoipa::path(
    put,
    path = "/api/consultorias/{id}",
    tag = "Hour pools",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Pool ID")),
    request_body = HourPoolPatch,
    responses(
        (status = 200, description = "Pool updated", body = HourPool),
        (status = 400, description = "Remaining hours out of range")
    )
)]
pub async fn update_pool(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    PathId(id): PathId,
    ValidatedJson(payload): ValidatedJson<HourPoolPatch>,
) -> AppResult<ApiResponse<HourPool>> {
    require_admin(&current_user)?;
    let pool = state.hour_service.update_pool(id, payload).await?;
    Ok(ApiResponse::success(pool))
}

#[utoipa::path(
    delete,
    path = "/api/consultorias/{id}",
    tag = "Hour pools",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Pool ID")),
    responses((status = 204, description = "Pool deleted"))
)]
pub async fn delete_pool(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    PathId(id): PathId,
) -> AppResult<NoContent> {
    require_admin(&current_user)?;
    state.hour_service.delete_pool(id).await?;
    Ok(NoContent)
}

//! Candidate searches paid with credits.

use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Router,
};

use crate::api::extractors::{PathId, ValidatedJson};
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{CreateSearch, Search, SearchPatch};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, Paginated, PaginationParams};

/// Mounted at `/busquedas`
pub fn search_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_searches).post(create_search))
        .route("/self", get(own_searches))
        .route(
            "/:id",
            get(get_search).put(update_search).delete(delete_search),
        )
}

/// Open a search against one of the caller's buckets
#[utoipa::path(
    post,
    path = "/api/busquedas",
    tag = "Searches",
    security(("bearer_auth" = [])),
    request_body = CreateSearch,
    responses(
        (status = 201, description = "Search created", body = Search),
        (status = 403, description = "Bucket belongs to another user"),
        (status = 404, description = "Bucket not found")
    )
)]
pub async fn create_search(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateSearch>,
) -> AppResult<Created<Search>> {
    let search = state
        .search_service
        .create(current_user.actor(), payload)
        .await?;
    Ok(Created(search))
}

#[utoipa::path(
    get,
    path = "/api/busquedas/self",
    tag = "Searches",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Own searches", body = [Search]))
)]
pub async fn own_searches(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<ApiResponse<Vec<Search>>> {
    let searches = state.search_service.own(current_user.id).await?;
    Ok(ApiResponse::success(searches))
}

#[utoipa::path(
    get,
    path = "/api/busquedas",
    tag = "Searches",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses((status = 200, description = "Page of searches", body = [Search]))
)]
pub async fn list_searches(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(params): Query<PaginationParams>,
) -> AppResult<ApiResponse<Paginated<Search>>> {
    require_admin(&current_user)?;
    let searches = state.search_service.list(params).await?;
    Ok(ApiResponse::success(searches))
}

#[utoipa::path(
    get,
    path = "/api/busquedas/{id}",
    tag = "Searches",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Search ID")),
    responses(
        (status = 200, description = "Search found", body = Search),
        (status = 404, description = "Search not found")
    )
)]
pub async fn get_search(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    PathId(id): PathId,
) -> AppResult<ApiResponse<Search>> {
    require_admin(&current_user)?;
    let search = state.search_service.get(id).await?;
    Ok(ApiResponse::success(search))
}

/// Edit a search. Setting `Finalizado` with `credits_used` debits the owner's buckets.
#[utoipa::path(
    put,
    path = "/api/busquedas/{id}",
    tag = "Searches",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Search ID")),
    request_body = SearchPatch,
    responses(
        (status = 200, description = "Search updated", body = Search),
        (status = 400, description = "Insufficient credits or transition not allowed")
    )
)]
pub async fn update_search(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    PathId(id): PathId,
    ValidatedJson(payload): ValidatedJson<SearchPatch>,
) -> AppResult<ApiResponse<Search>> {
    require_admin(&current_user)?;
    let search = state.search_service.update(id, payload).await?;
    Ok(ApiResponse::success(search))
}

/// Eliminate a search, refunding the credits of a finalized one
#[utoipa::path(
    delete,
    path = "/api/busquedas/{id}",
    tag = "Searches",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Search ID")),
    responses(
        (status = 200, description = "Search eliminated", body = Search),
        (status = 400, description = "Already eliminated"),
        (status = 403, description = "Not your search")
    )
)]
pub async fn delete_search(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    PathId(id): PathId,
) -> AppResult<ApiResponse<Search>> {
    let search = state
        .search_service
        .delete(current_user.actor(), id)
        .await?;
    Ok(ApiResponse::with_message(search, "Search eliminated"))
}

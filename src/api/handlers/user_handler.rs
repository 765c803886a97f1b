//! User account handlers.

use axum::{
    extract::{Query, State},
    routing::{get, patch},
    Extension, Router,
};

use crate::api::extractors::{PathId, ValidatedJson};
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{ProfilePatch, UserPatch, UserResponse};
use crate::errors::AppResult;
use crate::services::UserProfile;
use crate::types::{ApiResponse, Paginated, PaginationParams};

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/self", get(get_profile).put(update_profile))
        .route("/:id", get(get_user).put(update_user).delete(disable_user))
        .route("/:id/enable", patch(enable_user))
}

/// Caller's profile with plan, balances and company
#[utoipa::path(
    get,
    path = "/api/usuarios/self",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = UserProfile),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<ApiResponse<UserProfile>> {
    let profile = state.user_service.profile(current_user.id).await?;
    Ok(ApiResponse::success(profile))
}

/// Edit own name and phone
#[utoipa::path(
    put,
    path = "/api/usuarios/self",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = ProfilePatch,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Validation error")
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<ProfilePatch>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state
        .user_service
        .update_own(current_user.id, payload)
        .await?;
    Ok(ApiResponse::success(UserResponse::from(user)))
}

/// List users (admin only)
#[utoipa::path(
    get,
    path = "/api/usuarios",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "Page of users", body = [UserResponse]),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(params): Query<PaginationParams>,
) -> AppResult<ApiResponse<Paginated<UserResponse>>> {
    require_admin(&current_user)?;
    let users = state.user_service.list_users(params).await?;
    Ok(ApiResponse::success(users))
}

/// Get user by ID (admin only)
#[utoipa::path(
    get,
    path = "/api/usuarios/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    PathId(id): PathId,
) -> AppResult<ApiResponse<UserResponse>> {
    require_admin(&current_user)?;
    let user = state.user_service.get_user(id).await?;
    Ok(ApiResponse::success(UserResponse::from(user)))
}

/// Edit a user; a `plan_id` assigns that plan (admin only)
#[utoipa::path(
    put,
    path = "/api/usuarios/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = UserPatch,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Validation error or disabled plan"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "User or plan not found")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    PathId(id): PathId,
    ValidatedJson(payload): ValidatedJson<UserPatch>,
) -> AppResult<ApiResponse<UserResponse>> {
    require_admin(&current_user)?;
    let user = state.user_service.update_user(id, payload).await?;
    Ok(ApiResponse::success(UserResponse::from(user)))
}

/// Re-enable a user (admin only)
#[utoipa::path(
    patch,
    path = "/api/usuarios/{id}/enable",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User enabled", body = UserResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn enable_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    PathId(id): PathId,
) -> AppResult<ApiResponse<UserResponse>> {
    require_admin(&current_user)?;
    let user = state.user_service.set_active(id, true).await?;
    Ok(ApiResponse::with_message(UserResponse::from(user), "User enabled"))
}

/// Disable a user (admin only)
#[utoipa::path(
    delete,
    path = "/api/usuarios/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User disabled", body = UserResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn disable_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    PathId(id): PathId,
) -> AppResult<ApiResponse<UserResponse>> {
    require_admin(&current_user)?;
    let user = state.user_service.set_active(id, false).await?;
    Ok(ApiResponse::with_message(UserResponse::from(user), "User disabled"))
}

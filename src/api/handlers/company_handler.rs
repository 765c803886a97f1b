//! Client companies.

use axum::{
    extract::{Query, State},
    routing::{get, patch},
    Extension, Router,
};

use crate::api::extractors::{PathId, ValidatedJson};
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{Company, CompanyPatch, CreateCompany};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, Paginated, PaginationParams};

/// Mounted at `/empresas`
pub fn company_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_companies).post(create_company))
        .route("/self", get(own_company).put(update_own_company))
        .route(
            "/:id",
            get(get_company).put(update_company).delete(disable_company),
        )
        .route("/:id/enable", patch(enable_company))
        .route("/:id/unlink", patch(unlink_company))
}

#[utoipa::path(
    get,
    path = "/api/empresas/self",
    tag = "Companies",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own company", body = Company),
        (status = 404, description = "No company linked")
    )
)]
pub async fn own_company(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<ApiResponse<Company>> {
    let company = state.company_service.own(current_user.id).await?;
    Ok(ApiResponse::success(company))
}

#[utoipa::path(
    put,
    path = "/api/empresas/self",
    tag = "Companies",
    security(("bearer_auth" = [])),
    request_body = CompanyPatch,
    responses(
        (status = 200, description = "Company updated", body = Company),
        (status = 409, description = "CUIT already registered")
    )
)]
pub async fn update_own_company(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CompanyPatch>,
) -> AppResult<ApiResponse<Company>> {
    let company = state
        .company_service
        .update_own(current_user.id, payload)
        .await?;
    Ok(ApiResponse::success(company))
}

#[utoipa::path(
    get,
    path = "/api/empresas",
    tag = "Companies",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses((status = 200, description = "Page of companies", body = [Company]))
)]
pub async fn list_companies(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(params): Query<PaginationParams>,
) -> AppResult<ApiResponse<Paginated<Company>>> {
    require_admin(&current_user)?;
    let companies = state.company_service.list(params).await?;
    Ok(ApiResponse::success(companies))
}

#[utoipa::path(
    get,
    path = "/api/empresas/{id}",
    tag = "Companies",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company found", body = Company),
        (status = 404, description = "Company not found")
    )
)]
pub async fn get_company(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    PathId(id): PathId,
) -> AppResult<ApiResponse<Company>> {
    require_admin(&current_user)?;
    let company = state.company_service.get(id).await?;
    Ok(ApiResponse::success(company))
}

#[utoipa::path(
    post,
    path = "/api/empresas",
    tag = "Companies",
    security(("bearer_auth" = [])),
    request_body = CreateCompany,
    responses(
        (status = 201, description = "Company created", body = Company),
        (status = 400, description = "Malformed CUIT"),
        (status = 409, description = "CUIT already registered")
    )
)]
pub async fn create_company(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateCompany>,
) -> AppResult<Created<Company>> {
    require_admin(&current_user)?;
    let company = state.company_service.create(payload).await?;
    Ok(Created(company))
}

#[utoipa::path(
    put,
    path = "/api/empresas/{id}",
    tag = "Companies",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Company ID")),
    request_body = CompanyPatch,
    responses((status = 200, description = "Company updated", body = Company))
)]
pub async fn update_company(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    PathId(id): PathId,
    ValidatedJson(payload): ValidatedJson<CompanyPatch>,
) -> AppResult<ApiResponse<Company>> {
    require_admin(&current_user)?;
    let company = state.company_service.update(id, payload).await?;
    Ok(ApiResponse::success(company))
}

#[utoipa::path(
    delete,
    path = "/api/empresas/{id}",
    tag = "Companies",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Company ID")),
    responses((status = 200, description = "Company disabled", body = Company))
)]
pub async fn disable_company(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    PathId(id): PathId,
) -> AppResult<ApiResponse<Company>> {
    require_admin(&current_user)?;
    let company = state.company_service.set_active(id, false).await?;
    Ok(ApiResponse::with_message(company, "Company disabled"))
}

#[utoipa::path(
    patch,
    path = "/api/empresas/{id}/enable",
    tag = "Companies",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Company ID")),
    responses((status = 200, description = "Company enabled", body = Company))
)]
pub async fn enable_company(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    PathId(id): PathId,
) -> AppResult<ApiResponse<Company>> {
    require_admin(&current_user)?;
    let company = state.company_service.set_active(id, true).await?;
    Ok(ApiResponse::with_message(company, "Company enabled"))
}

/// Detach the company from its user
#[utoipa::path(
    patch,
    path = "/api/empresas/{id}/unlink",
    tag = "Companies",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Company ID")),
    responses((status = 200, description = "Company unlinked", body = Company))
)]
pub async fn unlink_company(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    PathId(id): PathId,
) -> AppResult<ApiResponse<Company>> {
    require_admin(&current_user)?;
    let company = state.company_service.unlink(id).await?;
    Ok(ApiResponse::with_message(company, "Company unlinked"))
}

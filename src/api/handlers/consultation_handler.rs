//! Consultations against an hour pool.

use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Router,
};

use crate::api::extractors::{PathId, ValidatedJson};
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{Consultation, ConsultationPatch, CreateConsultation};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, Paginated, PaginationParams};

/// Mounted at `/consultas`
pub fn consultation_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_consultations).post(create_consultation))
        .route("/self", get(own_consultations))
        .route(
            "/:id",
            get(get_consultation)
                .put(update_consultation)
                .delete(delete_consultation),
        )
}

/// Book hours from a pool; the hours are debited immediately
#[utoipa::path(
    post,
    path = "/api/consultas",
    tag = "Consultations",
    security(("bearer_auth" = [])),
    request_body = CreateConsultation,
    responses(
        (status = 201, description = "Consultation created", body = Consultation),
        (status = 400, description = "Insufficient hours or expired pool"),
        (status = 403, description = "Pool belongs to another user"),
        (status = 404, description = "Pool not found")
    )
)]
pub async fn create_consultation(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateConsultation>,
) -> AppResult<Created<Consultation>> {
    let consultation = state
        .consultation_service
        .create(current_user.actor(), payload)
        .await?;
    Ok(Created(consultation))
}

#[utoipa::path(
    get,
    path = "/api/consultas/self",
    tag = "Consultations",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Own consultations", body = [Consultation]))
)]
pub async fn own_consultations(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<ApiResponse<Vec<Consultation>>> {
    let consultations = state.consultation_service.own(current_user.id).await?;
    Ok(ApiResponse::success(consultations))
}

#[utoipa::path(
    get,
    path = "/api/consultas",
    tag = "Consultations",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses((status = 200, description = "Page of consultations", body = [Consultation]))
)]
pub async fn list_consultations(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(params): Query<PaginationParams>,
) -> AppResult<ApiResponse<Paginated<Consultation>>> {
    require_admin(&current_user)?;
    let consultations = state.consultation_service.list(params).await?;
    Ok(ApiResponse::success(consultations))
}

#[utoipa::path(
    get,
    path = "/api/consultas/{id}",
    tag = "Consultations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Consultation ID")),
    responses(
        (status = 200, description = "Consultation found", body = Consultation),
        (status = 404, description = "Consultation not found")
    )
)]
pub async fn get_consultation(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    PathId(id): PathId,
) -> AppResult<ApiResponse<Consultation>> {
    require_admin(&current_user)?;
    let consultation = state.consultation_service.get(id).await?;
    Ok(ApiResponse::success(consultation))
}

/// Edit comments, notes or state (admin only)
#[utoipa::path(
    put,
    path = "/api/consultas/{id}",
    tag = "Consultations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Consultation ID")),
    request_body = ConsultationPatch,
    responses(
        (status = 200, description = "Consultation updated", body = Consultation),
        (status = 400, description = "Transition not allowed")
    )
)]
pub async fn update_consultation(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    PathId(id): PathId,
    ValidatedJson(payload): ValidatedJson<ConsultationPatch>,
) -> AppResult<ApiResponse<Consultation>> {
    require_admin(&current_user)?;
    let consultation = state.consultation_service.update(id, payload).await?;
    Ok(ApiResponse::success(consultation))
}

/// Eliminate a consultation and return its hours to the pool
#[utoipa::path(
    delete,
    path = "/api/consultas/{id}",
    tag = "Consultations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Consultation ID")),
    responses(
        (status = 200, description = "Consultation eliminated", body = Consultation),
        (status = 400, description = "Already eliminated"),
        (status = 403, description = "Not your consultation")
    )
)]
pub async fn delete_consultation(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    PathId(id): PathId,
) -> AppResult<ApiResponse<Consultation>> {
    let consultation = state
        .consultation_service
        .delete(current_user.actor(), id)
        .await?;
    Ok(ApiResponse::with_message(consultation, "Consultation eliminated"))
}

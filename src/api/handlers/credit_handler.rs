//! Credit buckets and credit purchases.

use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Router,
};

use crate::api::extractors::{PathId, ValidatedJson};
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{
    CreateCreditBucket, CreateCreditPurchase, CreditBucket, CreditBucketDetail,
    CreditBucketPatch, CreditPurchase, CreditPurchasePatch,
};
use crate::errors::AppResult;
use crate::services::CreditPurchaseReceipt;
use crate::types::{ApiResponse, Created, NoContent, Paginated, PaginationParams};

/// Mounted at `/creditos`
pub fn credit_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_buckets).post(create_bucket))
        .route("/self", get(own_buckets))
        .route(
            "/:id",
            get(get_bucket).put(update_bucket).delete(delete_bucket),
        )
}

/// Mounted at `/compra-creditos`
pub fn credit_purchase_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_credit_purchases).post(purchase_credits))
        .route("/self", get(own_credit_purchases))
        .route(
            "/:id",
            get(get_credit_purchase)
                .put(update_credit_purchase)
                .delete(delete_credit_purchase),
        )
}

/// Caller's usable buckets, in the order debits consume them
#[utoipa::path(
    get,
    path = "/api/creditos/self",
    tag = "Credits",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Usable buckets", body = [CreditBucket]))
)]
pub async fn own_buckets(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<ApiResponse<Vec<CreditBucket>>> {
    let buckets = state.credit_service.own_buckets(current_user.id).await?;
    Ok(ApiResponse::success(buckets))
}

#[utoipa::path(
    get,
    path = "/api/creditos",
    tag = "Credits",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses((status = 200, description = "Buckets with searches and purchases", body = [CreditBucketDetail]))
)]
pub async fn list_buckets(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(params): Query<PaginationParams>,
) -> AppResult<ApiResponse<Paginated<CreditBucketDetail>>> {
    require_admin(&current_user)?;
    let buckets = state.credit_service.list_buckets(params).await?;
    Ok(ApiResponse::success(buckets))
}

#[utoipa::path(
    get,
    path = "/api/creditos/{id}",
    tag = "Credits",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Bucket ID")),
    responses(
        (status = 200, description = "Bucket found", body = CreditBucketDetail),
        (status = 404, description = "Bucket not found")
    )
)]
pub async fn get_bucket(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    PathId(id): PathId,
) -> AppResult<ApiResponse<CreditBucketDetail>> {
    require_admin(&current_user)?;
    let bucket = state.credit_service.get_bucket(id).await?;
    Ok(ApiResponse::success(bucket))
}

#[utoipa::path(
    post,
    path = "/api/creditos",
    tag = "Credits",
    security(("bearer_auth" = [])),
    request_body = CreateCreditBucket,
    responses(
        (status = 201, description = "Bucket created", body = CreditBucket),
        (status = 404, description = "User not found")
    )
)]
pub async fn create_bucket(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateCreditBucket>,
) -> AppResult<Created<CreditBucket>> {
    require_admin(&current_user)?;
    let bucket = state.credit_service.create_bucket(payload).await?;
    Ok(Created(bucket))
}

/// Correct kind, quantity or expiry of a bucket (admin only)
#[utoipa::path(
    put,
    path = "/api/creditos/{id}",
    tag = "Credits",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Bucket ID")),
    request_body = CreditBucketPatch,
    responses(
        (status = 200, description = "Bucket updated", body = CreditBucket),
        (status = 404, description = "Bucket not found")
    )
)]
pub async fn update_bucket(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    PathId(id): PathId,
    ValidatedJson(payload): ValidatedJson<CreditBucketPatch>,
) -> AppResult<ApiResponse<CreditBucket>> {
    require_admin(&current_user)?;
    let bucket = state.credit_service.update_bucket(id, payload).await?;
    Ok(ApiResponse::success(bucket))
}

#[utoipa::path(
    delete,
    path = "/api/creditos/{id}",
    tag = "Credits",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Bucket ID")),
    responses(
        (status = 204, description = "Bucket deleted"),
        (status = 404, description = "Bucket not found")
    )
)]
pub async fn delete_bucket(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    PathId(id): PathId,
) -> AppResult<NoContent> {
    require_admin(&current_user)?;
    state.credit_service.delete_bucket(id).await?;
    Ok(NoContent)
}

/// Caller's credit purchases
#[utoipa::path(
    get,
    path = "/api/compra-creditos/self",
    tag = "Credit purchases",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Own purchases", body = [CreditPurchase]))
)]
pub async fn own_credit_purchases(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<ApiResponse<Vec<CreditPurchase>>> {
    let purchases = state.credit_service.own_purchases(current_user.id).await?;
    Ok(ApiResponse::success(purchases))
}

#[utoipa::path(
    get,
    path = "/api/compra-creditos",
    tag = "Credit purchases",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses((status = 200, description = "Page of credit purchases", body = [CreditPurchase]))
)]
pub async fn list_credit_purchases(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(params): Query<PaginationParams>,
) -> AppResult<ApiResponse<Paginated<CreditPurchase>>> {
    require_admin(&current_user)?;
    let purchases = state.credit_service.list_purchases(params).await?;
    Ok(ApiResponse::success(purchases))
}

#[utoipa::path(
    get,
    path = "/api/compra-creditos/{id}",
    tag = "Credit purchases",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Purchase ID")),
    responses(
        (status = 200, description = "Purchase found", body = CreditPurchase),
        (status = 404, description = "Purchase not found")
    )
)]
pub async fn get_credit_purchase(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    PathId(id): PathId,
) -> AppResult<ApiResponse<CreditPurchase>> {
    require_admin(&current_user)?;
    let purchase = state.credit_service.get_purchase(id).await?;
    Ok(ApiResponse::success(purchase))
}

/// Sell additional credits: opens an `adicional` bucket and records the sale together
#[utoipa::path(
    post,
    path = "/api/compra-creditos",
    tag = "Credit purchases",
    security(("bearer_auth" = [])),
    request_body = CreateCreditPurchase,
    responses(
        (status = 201, description = "Credits purchased", body = CreditPurchaseReceipt),
        (status = 404, description = "User not found")
    )
)]
pub async fn purchase_credits(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateCreditPurchase>,
) -> AppResult<Created<CreditPurchaseReceipt>> {
    require_admin(&current_user)?;
    let receipt = state.credit_service.purchase(payload).await?;
    Ok(Created(receipt))
}

#[utoipa::path(
    put,
    path = "/api/compra-creditos/{id}",
    tag = "Credit purchases",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Purchase ID")),
    request_body = CreditPurchasePatch,
    responses((status = 200, description = "Purchase updated", body = CreditPurchase))
)]
pub async fn update_credit_purchase(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    PathId(id): PathId,
    ValidatedJson(payload): ValidatedJson<CreditPurchasePatch>,
) -> AppResult<ApiResponse<CreditPurchase>> {
    require_admin(&current_user)?;
    let purchase = state.credit_service.update_purchase(id, payload).await?;
    Ok(ApiResponse::success(purchase))
}

/// Delete the purchase row only; the bucket stays
#[utoipa::path(
    delete,
    path = "/api/compra-creditos/{id}",
    tag = "Credit purchases",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Purchase ID")),
    responses((status = 204, description = "Purchase deleted"))
)]
pub async fn delete_credit_purchase(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    PathId(id): PathId,
) -> AppResult<NoContent> {
    require_admin(&current_user)?;
    state.credit_service.delete_purchase(id).await?;
    Ok(NoContent)
}

//! HTTP-level behavior of the API building blocks.
//!
//! These run against small stateless routers, so no database or Redis is needed.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use uplin_api::api::extractors::{PathId, ValidatedJson};
use uplin_api::domain::CreateConsultation;
use uplin_api::errors::AppError;
use uplin_api::types::{ApiResponse, Created};

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn router() -> Router {
    Router::new()
        .route(
            "/items/:id",
            get(|PathId(id): PathId| async move { ApiResponse::success(id) }),
        )
        .route(
            "/consultas",
            post(
                |ValidatedJson(payload): ValidatedJson<CreateConsultation>| async move {
                    Created(payload.hours)
                },
            ),
        )
}

fn json_post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// =============================================================================
// Extractors
// =============================================================================

#[tokio::test]
async fn numeric_path_ids_reach_the_handler() {
    let response = router()
        .oneshot(Request::get("/items/7").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"success": true, "data": 7}));
}

#[tokio::test]
async fn malformed_path_ids_are_validation_errors() {
    let response = router()
        .oneshot(Request::get("/items/abc").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["message"], "'abc' is not a valid id");
}

#[tokio::test]
async fn valid_bodies_are_created() {
    let response = router()
        .oneshot(json_post("/consultas", json!({"pool_id": 3, "hours": 2})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await, json!({"success": true, "data": 2}));
}

#[tokio::test]
async fn bodies_failing_their_rules_are_rejected_with_the_rule_message() {
    let response = router()
        .oneshot(json_post("/consultas", json!({"pool_id": 3, "hours": 0})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["message"], "Hours must be positive");
}

#[tokio::test]
async fn unparseable_bodies_are_validation_errors_too() {
    let response = router()
        .oneshot(json_post("/consultas", json!({"hours": "two"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
}

// =============================================================================
// Error mapping
// =============================================================================

#[tokio::test]
async fn ledger_errors_render_their_figures() {
    let response = AppError::InsufficientCredit {
        requested: 10,
        available: 8,
    }
    .into_response();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"error": {
            "code": "INSUFFICIENT_CREDIT",
            "message": "Insufficient credits: requested 10, available 8"
        }})
    );
}

#[tokio::test]
async fn failed_ledger_writes_hide_their_detail() {
    let response = AppError::LedgerWrite("bucket 12 changed concurrently".into()).into_response();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "LEDGER_WRITE_FAILURE");
    assert!(!body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("bucket 12"));
}

#[tokio::test]
async fn status_codes_follow_the_error_kind() {
    let cases = [
        (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
        (AppError::InvalidCredentials, StatusCode::UNAUTHORIZED),
        (AppError::UserInactive, StatusCode::UNAUTHORIZED),
        (AppError::Forbidden, StatusCode::FORBIDDEN),
        (AppError::NotFound, StatusCode::NOT_FOUND),
        (AppError::conflict("Email"), StatusCode::CONFLICT),
        (AppError::disabled("User"), StatusCode::CONFLICT),
        (
            AppError::invalid_transition("already eliminated"),
            StatusCode::BAD_REQUEST,
        ),
        (
            AppError::InsufficientHours {
                requested: 2,
                remaining: 1,
            },
            StatusCode::BAD_REQUEST,
        ),
        (AppError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR),
    ];

    for (error, status) in cases {
        let code = error.code();
        assert_eq!(error.into_response().status(), status, "{code}");
    }
}

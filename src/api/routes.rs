//! Application route configuration.

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    auth_handler, company_routes, consultation_routes, credit_purchase_routes, credit_routes,
    hour_pool_routes, plan_purchase_routes, plan_routes, search_routes, user_routes,
};
use super::middleware::{auth_middleware, rate_limit_auth_middleware, rate_limit_middleware};
use super::openapi::ApiDoc;
use super::AppState;
use crate::config::{Config, CACHE_HEALTH_KEY};

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .nest("/api", api_routes(state.clone()))
        // OpenAPI Swagger UI documentation
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes(state: AppState) -> Router<AppState> {
    // Public authentication routes (stricter rate limiting); session checks need a login
    let auth = auth_handler::public_routes()
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_auth_middleware,
        ))
        .merge(
            auth_handler::session_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    rate_limit_middleware,
                )),
        );

    // Everything else requires a session + general rate limiting
    let protected = Router::new()
        .nest("/usuarios", user_routes())
        .nest("/planes", plan_routes())
        .nest("/compra-planes", plan_purchase_routes())
        .nest("/creditos", credit_routes())
        .nest("/compra-creditos", credit_purchase_routes())
        .nest("/consultorias", hour_pool_routes())
        .nest("/consultas", consultation_routes())
        .nest("/busquedas", search_routes())
        .nest("/empresas", company_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .route_layer(middleware::from_fn_with_state(state, rate_limit_middleware));

    Router::new()
        // Health check (no rate limiting)
        .route("/health", get(health))
        .nest("/auth", auth)
        .merge(protected)
}

/// Credentialed CORS for the configured frontend origin only.
fn cors_layer(config: &Config) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    match HeaderValue::from_str(&config.frontend_url) {
        Ok(origin) => base.allow_origin(origin),
        Err(e) => {
            tracing::warn!(
                error = %e,
                frontend_url = %config.frontend_url,
                "FRONTEND_URL is not a valid origin; cross-origin requests will be refused"
            );
            base
        }
    }
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    services: ServiceHealth,
}

/// Individual service health status
#[derive(Serialize)]
struct ServiceHealth {
    database: ServiceStatus,
    redis: ServiceStatus,
}

#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ServiceStatus {
    fn from_result<T, E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(_) => Self {
                status: "healthy",
                error: None,
            },
            Err(e) => Self {
                status: "unhealthy",
                error: Some(e.to_string()),
            },
        }
    }

    fn is_healthy(&self) -> bool {
        self.error.is_none()
    }
}

/// Health check endpoint with database and Redis connectivity check
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = ServiceStatus::from_result(state.database.ping().await);
    let redis = ServiceStatus::from_result(state.cache.exists(CACHE_HEALTH_KEY).await);

    let all_healthy = database.is_healthy() && redis.is_healthy();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" },
        services: ServiceHealth { database, redis },
    };

    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_probe_reports_its_error() {
        let down = ServiceStatus::from_result(Err::<(), _>("connection refused"));
        assert!(!down.is_healthy());
        assert_eq!(down.error.as_deref(), Some("connection refused"));

        assert!(ServiceStatus::from_result(Ok::<_, String>(true)).is_healthy());
    }
}

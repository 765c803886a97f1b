//! Authentication handlers.

use axum::{
    extract::State,
    routing::{get, post, put},
    Extension, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::{PathId, ValidatedJson};
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::config::{Config, AUTH_COOKIE_NAME};
use crate::domain::UserResponse;
use crate::errors::AppResult;
use crate::services::{Registration, Session};
use crate::types::{ApiResponse, Created};

/// User registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "First name is required"))]
    #[schema(example = "Ana")]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    #[schema(example = "García")]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "ana@example.com")]
    pub email: String,
    /// Minimum 8 characters
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: String,
    #[schema(example = "+54 11 5555-0000")]
    pub phone: Option<String>,
}

impl From<RegisterRequest> for Registration {
    fn from(request: RegisterRequest) -> Self {
        Self {
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            password: request.password,
            phone: request.phone,
        }
    }
}

/// User login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "ana@example.com")]
    pub email: String,
    #[schema(example = "SecurePass123!")]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PasswordRequest {
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(min_length = 8)]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "ana@example.com")]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetTokenRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(min_length = 8)]
    pub password: String,
}

/// Routes reachable without a session (auth rate limit applies)
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/forgot-password", post(forgot_password))
        .route("/validate-token", post(validate_token))
        .route("/reset-password", post(reset_password))
}

/// Routes that need a session
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/check", get(check))
        .route("/password/:id", put(change_password))
}

fn session_cookie(token: String, config: &Config) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE_NAME, token))
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "User already exists")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<Created<UserResponse>> {
    let user = state.auth_service.register(payload.into()).await?;
    Ok(Created(UserResponse::from(user)))
}

/// Login, set the session cookie and return the token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = Session),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials or disabled account")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<(CookieJar, ApiResponse<Session>)> {
    let session = state
        .auth_service
        .login(payload.email, payload.password)
        .await?;

    let jar = jar.add(session_cookie(session.access_token.clone(), &state.config));
    Ok((jar, ApiResponse::success(session)))
}

/// Clear the session cookie
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Authentication",
    responses((status = 200, description = "Logged out"))
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, ApiResponse<()>) {
    let jar = jar.remove(Cookie::build((AUTH_COOKIE_NAME, "")).path("/"));
    (jar, ApiResponse::message("Logged out"))
}

/// Current session's user
#[utoipa::path(
    get,
    path = "/api/auth/check",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Session is valid", body = UserResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn check(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.get_user(current_user.id).await?;
    Ok(ApiResponse::success(UserResponse::from(user)))
}

/// Change a password (own account, or any account for admins)
#[utoipa::path(
    put,
    path = "/api/auth/password/{id}",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = PasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 403, description = "Not your account"),
        (status = 404, description = "User not found")
    )
)]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    PathId(id): PathId,
    ValidatedJson(payload): ValidatedJson<PasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .auth_service
        .change_password(current_user.actor(), id, payload.password)
        .await?;
    Ok(ApiResponse::message("Password updated"))
}

/// Email a password reset link
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    tag = "Authentication",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset link sent"),
        (status = 404, description = "Unknown email"),
        (status = 409, description = "Account is disabled")
    )
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ForgotPasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    state.auth_service.request_password_reset(payload.email).await?;
    Ok(ApiResponse::message("Password reset email sent"))
}

/// Check a reset token before showing the form
#[utoipa::path(
    post,
    path = "/api/auth/validate-token",
    tag = "Authentication",
    request_body = ResetTokenRequest,
    responses(
        (status = 200, description = "Token is valid"),
        (status = 400, description = "Token used or expired"),
        (status = 404, description = "Unknown token")
    )
)]
pub async fn validate_token(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ResetTokenRequest>,
) -> AppResult<ApiResponse<()>> {
    state.auth_service.validate_reset_token(&payload.token).await?;
    Ok(ApiResponse::message("Token is valid"))
}

/// Set a new password with a reset token
#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    tag = "Authentication",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset"),
        (status = 400, description = "Token used or expired"),
        (status = 404, description = "Unknown token")
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ResetPasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .auth_service
        .reset_password(payload.token, payload.password)
        .await?;
    Ok(ApiResponse::message("Password has been reset"))
}

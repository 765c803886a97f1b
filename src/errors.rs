//! Centralized error handling.
//!
//! Provides a unified error type for the entire application,
//! with automatic HTTP response conversion.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication & Authorization
    #[error("Authentication required")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User account is disabled")]
    UserInactive,

    // Resource errors
    #[error("Resource not found")]
    NotFound,

    #[error("{0} already exists")]
    Conflict(String),

    #[error("{0} is disabled")]
    Disabled(String),

    // Validation
    #[error("{0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    BadRequest(String),

    // Ledger
    #[error("Insufficient credits: requested {requested}, available {available}")]
    InsufficientCredit { requested: i32, available: i32 },

    #[error("Insufficient hours: requested {requested}, remaining {remaining}")]
    InsufficientHours { requested: i32, remaining: i32 },

    #[error("{0}")]
    InvalidStateTransition(String),

    #[error("Ledger write failed")]
    LedgerWrite(String),

    // External service errors
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    #[error("Authentication error")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Forbidden => "FORBIDDEN",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::UserInactive => "USER_INACTIVE",
            AppError::NotFound => "NOT_FOUND",
            AppError::Conflict(_) | AppError::Disabled(_) => "CONFLICT",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::InsufficientCredit { .. } => "INSUFFICIENT_CREDIT",
            AppError::InsufficientHours { .. } => "INSUFFICIENT_HOURS",
            AppError::InvalidStateTransition(_) => "INVALID_STATE_TRANSITION",
            AppError::LedgerWrite(_) => "LEDGER_WRITE_FAILURE",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Jwt(_) => "TOKEN_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized
            | AppError::InvalidCredentials
            | AppError::UserInactive
            | AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::Disabled(_) => StatusCode::CONFLICT,
            AppError::Validation(_)
            | AppError::BadRequest(_)
            | AppError::InsufficientCredit { .. }
            | AppError::InsufficientHours { .. }
            | AppError::InvalidStateTransition(_) => StatusCode::BAD_REQUEST,
            AppError::LedgerWrite(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get user-facing message (hides internal details)
    fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::InvalidStateTransition(msg) => msg.clone(),
            AppError::Conflict(msg) => format!("{} already exists", msg),

            AppError::LedgerWrite(detail) => {
                tracing::error!("Ledger write failure: {}", detail);
                "The balance update could not be completed; no changes were applied".to_string()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            AppError::Jwt(e) => {
                tracing::debug!("JWT error: {:?}", e);
                "Invalid or expired token".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.user_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

/// Convenience constructors
impl AppError {
    pub fn conflict(entity: impl Into<String>) -> Self {
        AppError::Conflict(entity.into())
    }

    pub fn disabled(entity: impl Into<String>) -> Self {
        AppError::Disabled(entity.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn invalid_transition(msg: impl Into<String>) -> Self {
        AppError::InvalidStateTransition(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// Wrap a failed ledger write. Errors that already carry a ledger meaning pass through.
    pub fn ledger_write(context: &str, err: AppError) -> Self {
        match err {
            AppError::LedgerWrite(_)
            | AppError::InsufficientCredit { .. }
            | AppError::InsufficientHours { .. } => err,
            other => AppError::LedgerWrite(format!("{}: {}", context, other_detail(&other))),
        }
    }
}

fn other_detail(err: &AppError) -> String {
    match err {
        AppError::Database(e) => e.to_string(),
        AppError::Internal(msg) => msg.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_errors_map_to_expected_status() {
        let insufficient = AppError::InsufficientCredit {
            requested: 10,
            available: 8,
        };
        assert_eq!(insufficient.status(), StatusCode::BAD_REQUEST);
        assert_eq!(insufficient.code(), "INSUFFICIENT_CREDIT");

        let hours = AppError::InsufficientHours {
            requested: 3,
            remaining: 2,
        };
        assert_eq!(hours.status(), StatusCode::BAD_REQUEST);

        let transition = AppError::invalid_transition("terminal");
        assert_eq!(transition.status(), StatusCode::BAD_REQUEST);

        let write = AppError::LedgerWrite("bucket 4".into());
        assert_eq!(write.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(write.code(), "LEDGER_WRITE_FAILURE");
    }

    #[test]
    fn ledger_write_keeps_domain_errors() {
        let err = AppError::ledger_write(
            "debit",
            AppError::InsufficientHours {
                requested: 1,
                remaining: 0,
            },
        );
        assert!(matches!(err, AppError::InsufficientHours { .. }));

        let err = AppError::ledger_write("debit", AppError::internal("connection reset"));
        match err {
            AppError::LedgerWrite(detail) => assert!(detail.contains("connection reset")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn inactive_user_is_unauthorized() {
        let response = AppError::UserInactive.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

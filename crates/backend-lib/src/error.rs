// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::storage::StoreError;

/// Message shared by every failed login, whatever the cause
pub const BAD_CREDENTIALS: &str = "Invalid email or password";

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid email or password")]
    Auth,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Account could not be created")]
    Creation,

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Token signing secret is not configured")]
    MissingSecret,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::Conflict(_)
            | AppError::Auth
            | AppError::NotFound(_)
            | AppError::Creation => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::MissingSecret
            | AppError::Internal(_)
            | AppError::Io(_)
            | AppError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VAL_001",
            AppError::Conflict(_) => "ACC_001",
            AppError::Auth => "AUTH_001",
            AppError::NotFound(_) => "NF_001",
            AppError::Creation => "ACC_002",
            AppError::Unauthorized(_) => "AUTH_002",
            AppError::MissingSecret => "CFG_001",
            AppError::Internal(_) => "INT_001",
            AppError::Io(_) => "IO_001",
            AppError::Json(_) => "JSON_001",
        }
    }

    /// Get a sanitized message suitable for production use
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::Validation(_)
            | AppError::Conflict(_)
            | AppError::Auth
            | AppError::NotFound(_)
            | AppError::Creation => self.to_string(),
            AppError::Unauthorized(_) => "Not authorized".to_string(),
            AppError::MissingSecret | AppError::Internal(_) => {
                "An internal server error occurred".to_string()
            },
            AppError::Io(_) | AppError::Json(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        if status.is_server_error() {
            tracing::error!(code = error_code, error = %self, "request failed");
        }

        // Use detailed messages in development, sanitized in production
        let message = if cfg!(debug_assertions) {
            self.to_string()
        } else {
            self.sanitized_message()
        };

        let body = serde_json::json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail(email) => {
                AppError::Conflict(format!("An account with email {email} already exists"))
            },
            StoreError::Io(e) => AppError::Io(e),
            StoreError::Serialization(e) => AppError::Json(e),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("Background task failed: {err}"))
    }
}

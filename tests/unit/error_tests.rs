// =========================
// tests/unit/error_tests.rs
// =========================
//! Unit tests for the error module
use accountd_backend::error::{AppError, BAD_CREDENTIALS};
use axum::http::StatusCode;
use axum::response::IntoResponse;

#[test]
fn test_app_error_error_codes() {
    assert_eq!(AppError::Validation("x".to_string()).error_code(), "VAL_001");
    assert_eq!(AppError::Conflict("x".to_string()).error_code(), "ACC_001");
    assert_eq!(AppError::Auth.error_code(), "AUTH_001");
    assert_eq!(AppError::NotFound("x".to_string()).error_code(), "NF_001");
    assert_eq!(AppError::Creation.error_code(), "ACC_002");
    assert_eq!(
        AppError::Unauthorized("x".to_string()).error_code(),
        "AUTH_002"
    );
    assert_eq!(AppError::MissingSecret.error_code(), "CFG_001");
}

#[test]
fn test_auth_error_message_is_uniform() {
    assert_eq!(AppError::Auth.to_string(), BAD_CREDENTIALS);
    assert_eq!(AppError::Auth.sanitized_message(), BAD_CREDENTIALS);
}

#[tokio::test]
async fn test_error_body_shape() {
    let response = AppError::Conflict("taken".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["error"]["code"], "ACC_001");
    assert!(value["error"]["message"]
        .as_str()
        .unwrap()
        .contains("taken"));
}

// =========================
// tests/unit/error_tests.rs
// =========================
//! Unit tests for the error module
use axum::http::StatusCode;
use axum::response::IntoResponse;
use start_backend_lib::auth::{LoginFailure, PasswordValidationError};
use start_backend_lib::error::AppError;
use start_backend_lib::users::UserError;
use crate::test_utils::json_body;

#[test]
fn test_app_error_status_codes() {
    assert_eq!(
        AppError::from(LoginFailure::InvalidCredentials).status_code(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(AppError::AuthRateLimited.status_code(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        AppError::from(UserError::PasswordRequired).status_code(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        AppError::from(UserError::VersionConflict {
            id: uuid::Uuid::nil(),
            expected: 1,
            actual: 2,
        })
        .status_code(),
        StatusCode::CONFLICT
    );
}

#[test]
fn test_app_error_error_codes() {
    assert_eq!(AppError::AuthRateLimited.error_code(), "AUTH_003");
    assert_eq!(AppError::from(LoginFailure::InvalidCredentials).error_code(), "AUTH_002");
    assert_eq!(
        AppError::from(UserError::Password(PasswordValidationError::Empty)).error_code(),
        "PWD_001"
    );
    assert_eq!(
        AppError::from(UserError::DuplicateUsername("bob".into())).error_code(),
        "USER_002"
    );
}

#[tokio::test]
async fn test_error_serialization() {
    let response = AppError::from(UserError::Password(PasswordValidationError::TooShort {
        min_length: 8,
    }))
    .into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .contains("application/json"));

    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "PWD_001");
    assert_eq!(
        body["error"]["message"],
        "Password must be at least 8 characters long"
    );
}

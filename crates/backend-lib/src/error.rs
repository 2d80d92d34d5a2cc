// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use crate::auth::LoginFailure;
use crate::users::UserError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use start_common::ErrorResponse;
use thiserror::Error;

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed")]
    Login(LoginFailure),

    #[error("Authentication rate limit exceeded")]
    AuthRateLimited,

    #[error("Invalid request body: {0}")]
    Json(#[from] JsonRejection),

    #[error(transparent)]
    User(#[from] UserError),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Login(_) => StatusCode::UNAUTHORIZED,
            AppError::AuthRateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Json(rejection) => rejection.status(),
            AppError::User(e) => match e {
                UserError::NotFound(_) => StatusCode::NOT_FOUND,
                UserError::DuplicateUsername(_) | UserError::VersionConflict { .. } => {
                    StatusCode::CONFLICT
                },
                UserError::Hashing(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            },
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Login(_) => "AUTH_002",
            AppError::AuthRateLimited => "AUTH_003",
            AppError::Json(_) => "JSON_001",
            AppError::User(e) => match e {
                UserError::Password(_) => "PWD_001",
                UserError::PasswordRequired => "PWD_002",
                UserError::PasswordMismatch => "PWD_003",
                UserError::InvalidUsername { .. }
                | UserError::InvalidEmail(_)
                | UserError::FieldTooLong { .. } => "USER_001",
                UserError::DuplicateUsername(_) => "USER_002",
                UserError::NotFound(_) => "USER_003",
                UserError::VersionConflict { .. } => "USER_004",
                UserError::Hashing(_) => "INT_002",
            },
        }
    }

    /// Get a sanitized message suitable for production use
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::Login(_) => "Authentication failed".to_string(),
            AppError::AuthRateLimited => {
                "Too many authentication attempts, please try again later".to_string()
            },
            AppError::Json(_) => "Invalid request format".to_string(),
            AppError::User(UserError::Hashing(_)) => "An internal server error occurred".to_string(),
            AppError::User(UserError::NotFound(_)) => "Resource not found".to_string(),
            // Validation messages are meant for the user
            AppError::User(e) => e.to_string(),
        }
    }
}

impl From<LoginFailure> for AppError {
    fn from(failure: LoginFailure) -> Self {
        AppError::Login(failure)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Use detailed messages in development, sanitized in production
        let message = if cfg!(debug_assertions) {
            self.to_string()
        } else {
            self.sanitized_message()
        };

        (status, axum::Json(ErrorResponse::new(self.error_code(), message))).into_response()
    }
}

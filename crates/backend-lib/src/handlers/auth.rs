// ============================
// crates/backend-lib/src/handlers/auth.rs
// ============================
//! Login and health endpoints.
use crate::metrics::{LOGIN_FAILED, LOGIN_SUCCEEDED};
use crate::{error::AppError, AppState};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use metrics::counter;
use start_common::{HealthResponse, LoginRequest, LoginResponse};
use std::sync::Arc;
use tracing::{info, warn};
use zeroize::Zeroize;

/// `POST /api/login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(request) = payload?;
    let LoginRequest {
        username,
        mut password,
    } = request;

    let result = state.auth.authenticate(&username, &password).await;
    password.zeroize();

    match result {
        Ok(user) => {
            counter!(LOGIN_SUCCEEDED).increment(1);
            info!(username = %user.username, "User logged in");
            state.audit.log_login(&user.username);
            Ok(Json(LoginResponse {
                user_id: user.id,
                display_name: user.display_name(),
                username: user.username,
            }))
        },
        Err(failure) => {
            counter!(LOGIN_FAILED, "reason" => failure.reason()).increment(1);
            warn!(username = %username, reason = failure.reason(), "Login failed");
            state.audit.log_login_failed(&username, failure.reason());
            Err(failure.into())
        },
    }
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

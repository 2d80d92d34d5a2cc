// ============================
// crates/backend-lib/src/handlers/mod.rs
// ============================
//! HTTP routes.

pub mod auth;

use crate::middleware::login_rate_limit;
use crate::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Create the HTTP router
pub fn create_router(state: Arc<AppState>) -> Router {
    let login = Router::new()
        .route("/api/login", post(auth::login))
        .route_layer(middleware::from_fn_with_state(state.clone(), login_rate_limit));

    Router::new()
        .merge(login)
        .route("/health", get(auth::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

use crate::{error::AppError, AppState};
use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::sync::Arc;

/// Response header carrying the attempts left in the current window
pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Key used when no client address is known
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Work out which client a request belongs to.
///
/// Forwarded headers are only honoured when `trust_forwarded` is set, since
/// clients can put anything in them. Otherwise the socket peer is used.
pub fn client_key<B>(request: &Request<B>, trust_forwarded: bool) -> String {
    if trust_forwarded {
        let headers = request.headers();
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        let real_ip = || {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };
        if let Some(ip) = forwarded.or_else(real_ip) {
            return ip.to_string();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Login rate limiter middleware
pub async fn login_rate_limit(
    State(state): State<Arc<AppState>>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let client = client_key(&request, state.settings.rate_limit.trust_forwarded_headers);

    if !state.login_limiter.is_login_allowed(&client) {
        return Err(AppError::AuthRateLimited);
    }

    let mut response = next.run(request).await;
    let remaining = state.login_limiter.remaining_login_attempts(&client);
    response
        .headers_mut()
        .insert(RATE_LIMIT_REMAINING_HEADER, HeaderValue::from(remaining));
    Ok(response)
}

// ==============================
// tests/unit/middleware_tests.rs
// ==============================
//! Unit tests for the login rate limit middleware
use crate::test_utils::{setup_test_env, test_settings};
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use start_backend_lib::middleware::RATE_LIMIT_REMAINING_HEADER;
use tower::ServiceExt;

#[tokio::test]
async fn test_health_is_not_rate_limited() {
    let env = setup_test_env(test_settings());

    for _ in 0..10 {
        let response = env
            .router
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(RATE_LIMIT_REMAINING_HEADER).is_none());
    }
    assert_eq!(env.state.login_limiter.tracked_clients(), 0);
}

#[tokio::test]
async fn test_remaining_header_counts_down() {
    let env = setup_test_env(test_settings());
    env.add_user("alice", "wonderland");

    let response = env.login("203.0.113.5", "alice", "wonderland").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[RATE_LIMIT_REMAINING_HEADER], "4");

    let response = env.login("203.0.113.5", "alice", "wrong-password").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()[RATE_LIMIT_REMAINING_HEADER], "3");
}

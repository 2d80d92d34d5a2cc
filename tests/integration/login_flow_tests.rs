// =====================================
// tests/integration/login_flow_tests.rs
// =====================================
//! End to end login flow over HTTP
use crate::test_utils::{json_body, setup_test_env, test_settings};
use axum::http::StatusCode;
use start_backend_lib::audit::AuditEvent;
use start_backend_lib::auth::AuthContext;
use start_backend_lib::users::UserUpdate;
use std::time::Duration;

#[tokio::test]
async fn test_successful_login() {
    let env = setup_test_env(test_settings());
    env.add_user("alice", "wonderland");

    let response = env.login("203.0.113.1", "alice", "wonderland").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["displayName"], "[alice]");
    assert!(body["userId"].is_string());

    assert_eq!(
        env.audit.events().last(),
        Some(&AuditEvent::LoginSuccess {
            username: "alice".to_string()
        })
    );
}

#[tokio::test]
async fn test_wrong_password_is_rejected_and_audited() {
    let env = setup_test_env(test_settings());
    env.add_user("alice", "wonderland");

    let response = env.login("203.0.113.1", "alice", "not-wonderland").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "AUTH_002");
    assert_eq!(body["error"]["message"], "Authentication failed");

    assert_eq!(
        env.audit.events().last(),
        Some(&AuditEvent::LoginFailed {
            username: "alice".to_string(),
            reason: "invalid credentials".to_string(),
        })
    );
}

#[tokio::test]
async fn test_unknown_user_looks_like_wrong_password() {
    let env = setup_test_env(test_settings());

    let response = env.login("203.0.113.1", "nobody", "whatever-pw").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        env.audit.events(),
        vec![AuditEvent::LoginFailed {
            username: "nobody".to_string(),
            reason: "invalid credentials".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_disabled_account() {
    let env = setup_test_env(test_settings());
    env.add_user("alice", "wonderland");
    let user = env.state.users.find_by_username("alice").unwrap();
    let mut update = UserUpdate::from_user(&user);
    update.active = false;
    env.state
        .users
        .update_user(&AuthContext::system(), user.id, update)
        .unwrap();

    let response = env.login("203.0.113.1", "alice", "wonderland").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        env.audit.events().last(),
        Some(&AuditEvent::LoginFailed {
            username: "alice".to_string(),
            reason: "account disabled".to_string(),
        })
    );
}

#[tokio::test]
async fn test_sixth_attempt_is_rate_limited() {
    let env = setup_test_env(test_settings());
    env.add_user("alice", "wonderland");

    for _ in 0..5 {
        let response = env.login("203.0.113.9", "alice", "bad-password").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Even the right password is refused once the budget is spent
    let response = env.login("203.0.113.9", "alice", "wonderland").await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "AUTH_003");

    // Rejected attempts never reach the authenticator
    let failures = env
        .audit
        .events()
        .iter()
        .filter(|e| e.kind() == "LOGIN_FAILED")
        .count();
    assert_eq!(failures, 5);

    // A different client still gets through
    let response = env.login("203.0.113.10", "alice", "wonderland").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_budget_returns_after_window() {
    let env = setup_test_env(test_settings());
    env.add_user("alice", "wonderland");

    for _ in 0..6 {
        env.login("203.0.113.9", "alice", "bad-password").await;
    }
    assert_eq!(
        env.login("203.0.113.9", "alice", "wonderland").await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );

    env.clock.advance(Duration::from_secs(60));
    assert_eq!(
        env.login("203.0.113.9", "alice", "wonderland").await.status(),
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_malformed_body_uses_error_envelope() {
    let env = setup_test_env(test_settings());

    let cases = [
        (Some("application/json"), "{not json", StatusCode::BAD_REQUEST),
        (Some("application/json"), r#"{"username":"alice"}"#, StatusCode::UNPROCESSABLE_ENTITY),
        (None, r#"{"username":"alice","password":"wonderland"}"#, StatusCode::UNSUPPORTED_MEDIA_TYPE),
    ];

    for (content_type, body, status) in cases {
        let response = env.login_raw("203.0.113.20", content_type, body).await;
        assert_eq!(response.status(), status, "body: {body}");
        assert!(response.headers()["content-type"]
            .to_str()
            .unwrap()
            .contains("application/json"));

        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "JSON_001");
        assert!(json["error"]["message"].is_string());
    }

    // Nothing reached the authenticator
    assert!(env.audit.events().is_empty());
}

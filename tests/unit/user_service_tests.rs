// ================================
// tests/unit/user_service_tests.rs
// ================================
//! Unit tests for user management through the application state
use crate::test_utils::{setup_test_env, test_settings};
use start_backend_lib::audit::AuditEvent;
use start_backend_lib::auth::{AuthContext, PasswordValidationError};
use start_backend_lib::users::{NewUser, UserError, UserUpdate};

#[test]
fn test_password_policy_applies_to_new_users() {
    let env = setup_test_env(test_settings());
    let ctx = AuthContext::authenticated("admin");

    assert_eq!(
        env.state.users.create_user(&ctx, NewUser::new("bob", "1234567")),
        Err(UserError::Password(PasswordValidationError::TooShort { min_length: 8 }))
    );
    assert!(env.state.users.create_user(&ctx, NewUser::new("bob", "12345678")).is_ok());
}

#[test]
fn test_configured_min_length_is_used() {
    let mut settings = test_settings();
    settings.password.min_length = 12;
    let env = setup_test_env(settings);

    let err = env
        .state
        .users
        .create_user(&AuthContext::system(), NewUser::new("bob", "elevenchars"))
        .unwrap_err();
    assert_eq!(err.to_string(), "Password must be at least 12 characters long");
}

#[test]
fn test_stale_update_is_rejected() {
    let env = setup_test_env(test_settings());
    let ctx = AuthContext::system();
    let user = env
        .state
        .users
        .create_user(&ctx, NewUser::new("carol", "carol-password"))
        .unwrap();

    let first = UserUpdate::from_user(&user);
    let second = UserUpdate::from_user(&user);
    env.state.users.update_user(&ctx, user.id, first).unwrap();
    assert!(matches!(
        env.state.users.update_user(&ctx, user.id, second),
        Err(UserError::VersionConflict { .. })
    ));
}

#[test]
fn test_user_lifecycle_is_audited() {
    let env = setup_test_env(test_settings());
    let ctx = AuthContext::authenticated("admin");
    let users = &env.state.users;

    let user = users.create_user(&ctx, NewUser::new("dave", "dave-password")).unwrap();
    users
        .change_password(&ctx, user.id, "new-dave-password", "new-dave-password")
        .unwrap();
    users.delete_user(&ctx, user.id).unwrap();

    let events = env.audit.events();
    let kinds: Vec<_> = events.iter().map(AuditEvent::kind).collect();
    assert_eq!(kinds, vec!["USER_CREATED", "PASSWORD_CHANGED", "USER_DELETED"]);
    assert!(events.iter().all(|e| e.to_string().contains("By=admin")));
}

#[test]
fn test_bootstrap_admin_is_created_once() {
    let mut settings = test_settings();
    settings.bootstrap.admin_username = Some("admin".to_string());
    settings.bootstrap.admin_password = Some("admin-password".to_string());
    let env = setup_test_env(settings);

    let admin = env.state.users.find_by_username("admin").unwrap();
    assert!(admin.active);
    assert_eq!(
        env.audit.events(),
        vec![AuditEvent::UserCreated {
            user_id: admin.id,
            username: "admin".to_string(),
            created_by: "system".to_string(),
        }]
    );
}

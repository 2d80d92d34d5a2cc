// ==========================
// tests/unit/config_tests.rs
// ==========================
//! Unit tests for the configuration module
use figment::Jail;
use start_backend_lib::config::Settings;
use std::path::PathBuf;

#[test]
fn test_settings_default() {
    let settings = Settings::default();

    assert_eq!(settings.server.port, 3000);
    assert_eq!(settings.log.level, "info");
    assert_eq!(settings.rate_limit.max_attempts, 5);
    assert_eq!(settings.rate_limit.window_secs, 60);
    assert!(!settings.rate_limit.trust_forwarded_headers);
    assert!(settings.audit.tracing);
    assert!(settings.audit.log_path.is_none());
}

#[test]
fn test_load_full_file() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [password]
            min_length = 12
            scrypt_log_n = 10

            [audit]
            tracing = false
            log_path = "logs/audit.jsonl"
            "#,
        )?;

        let settings = Settings::load().expect("settings load");
        assert_eq!(settings.bind_addr().to_string(), "0.0.0.0:9000");
        assert_eq!(settings.password_policy().min_length, 12);
        assert!(settings.password_encoder().is_ok());
        assert!(!settings.audit.tracing);
        assert_eq!(settings.audit.log_path, Some(PathBuf::from("logs/audit.jsonl")));
        Ok(())
    });
}

#[test]
fn test_env_overrides_nested_keys() {
    Jail::expect_with(|jail| {
        jail.set_env("START_SERVER__PORT", "4000");
        jail.set_env("START_RATE_LIMIT__WINDOW_SECS", "30");

        let settings = Settings::load().expect("settings load");
        assert_eq!(settings.server.port, 4000);
        assert_eq!(settings.rate_limit_policy().window.as_secs(), 30);
        Ok(())
    });
}

#[test]
fn test_half_configured_bootstrap_is_rejected() {
    Jail::expect_with(|jail| {
        jail.set_env("START_BOOTSTRAP__ADMIN_PASSWORD", "only-a-password");
        assert!(Settings::load().is_err());
        Ok(())
    });
}

// ============================
// crates/backend-lib/src/lib.rs
// ============================
//! Core backend-lib functionality for the login service: rate limiting,
//! password policy, user management and auditing.

pub mod audit;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod users;

use crate::audit::{AuditLogger, JsonLinesAuditSink, TracingAuditSink};
use crate::auth::{AuthService, Clock, DefaultAuth, LoginRateLimiter, SystemClock};
use crate::config::Settings;
use crate::users::{UserService, UserStore};
use anyhow::Context;
use std::sync::Arc;
use tracing::info;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Settings the state was built from
    pub settings: Arc<Settings>,
    /// Authentication service
    pub auth: Arc<dyn AuthService>,
    /// User management
    pub users: Arc<UserService>,
    /// Login rate limiter
    pub login_limiter: Arc<LoginRateLimiter>,
    /// Audit trail
    pub audit: Arc<AuditLogger>,
}

impl AppState {
    /// Create a new application state on the system clock
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        Self::builder(settings).build()
    }

    pub fn builder(settings: Settings) -> AppStateBuilder {
        AppStateBuilder {
            settings,
            clock: None,
            audit: None,
        }
    }
}

/// Builds an [`AppState`], optionally replacing the clock or audit logger
pub struct AppStateBuilder {
    settings: Settings,
    clock: Option<Arc<dyn Clock>>,
    audit: Option<AuditLogger>,
}

impl AppStateBuilder {
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Use this audit logger instead of the one described by the settings
    pub fn audit(mut self, audit: AuditLogger) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn build(self) -> anyhow::Result<AppState> {
        let settings = self.settings;
        settings.validate()?;

        let audit = match self.audit {
            Some(audit) => audit,
            None => audit_logger(&settings)?,
        };
        let audit = Arc::new(audit);

        let encoder = settings.password_encoder()?;
        let store = Arc::new(UserStore::new());
        let users = Arc::new(UserService::new(
            store.clone(),
            encoder.clone(),
            settings.password_policy(),
            audit.clone(),
        ));
        let auth = Arc::new(DefaultAuth::new(store, encoder)?);

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let login_limiter = Arc::new(LoginRateLimiter::with_clock(settings.rate_limit_policy(), clock));

        if let Some((username, password)) = settings.bootstrap_admin() {
            users
                .ensure_user(username, password)
                .with_context(|| format!("failed to create bootstrap user '{username}'"))?;
        }

        Ok(AppState {
            settings: Arc::new(settings),
            auth,
            users,
            login_limiter,
            audit,
        })
    }
}

/// Audit logger with the sinks enabled in `settings`
pub fn audit_logger(settings: &Settings) -> anyhow::Result<AuditLogger> {
    let mut audit = AuditLogger::disabled();
    if settings.audit.tracing {
        audit.add_sink(Arc::new(TracingAuditSink));
    }
    if let Some(path) = &settings.audit.log_path {
        let sink = JsonLinesAuditSink::open(path)
            .with_context(|| format!("failed to open audit log {}", path.display()))?;
        info!(path = %path.display(), "Writing audit log");
        audit.add_sink(Arc::new(sink));
    }
    Ok(audit)
}

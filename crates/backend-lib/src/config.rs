// ============================
// crates/backend-lib/src/config.rs
// ============================
//! Configuration management.
//!
//! Settings are layered with figment: built-in defaults, then a TOML file,
//! then `START_` environment variables (`__` separates nested keys, e.g.
//! `START_RATE_LIMIT__MAX_ATTEMPTS=10`).
use crate::auth::{
    LoginRateLimitPolicy, PasswordEncoder, PasswordPolicy, MAX_LOGIN_ATTEMPTS, MIN_PASSWORD_LENGTH,
};
use crate::auth::rate_limit::{EXPIRY_GRACE, LOGIN_WINDOW, MAX_TRACKED_CLIENTS};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default configuration file
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "START_";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Load(Box::new(err))
    }
}

/// Application settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub log: LogSettings,
    pub rate_limit: RateLimitSettings,
    pub password: PasswordSettings,
    pub audit: AuditSettings,
    pub bootstrap: BootstrapSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default filter level; `RUST_LOG` takes precedence
    pub level: String,
    /// Emit JSON formatted logs
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Login rate limiting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub max_attempts: u64,
    pub window_secs: u64,
    pub max_tracked_clients: usize,
    pub expiry_grace_secs: u64,
    /// Take the client address from `x-forwarded-for` / `x-real-ip`
    pub trust_forwarded_headers: bool,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_attempts: MAX_LOGIN_ATTEMPTS,
            window_secs: LOGIN_WINDOW.as_secs(),
            max_tracked_clients: MAX_TRACKED_CLIENTS,
            expiry_grace_secs: EXPIRY_GRACE.as_secs(),
            trust_forwarded_headers: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordSettings {
    pub min_length: usize,
    /// scrypt cost exponent; scrypt's recommended cost when unset
    pub scrypt_log_n: Option<u8>,
}

impl Default for PasswordSettings {
    fn default() -> Self {
        Self {
            min_length: MIN_PASSWORD_LENGTH,
            scrypt_log_n: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditSettings {
    /// Write audit events to the `start::audit` tracing target
    pub tracing: bool,
    /// Append audit events as JSON lines to this file
    pub log_path: Option<PathBuf>,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            tracing: true,
            log_path: None,
        }
    }
}

/// Administrator created at startup when missing
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapSettings {
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl std::fmt::Debug for BootstrapSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapSettings")
            .field("admin_username", &self.admin_username)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Settings {
    /// Load from `config.toml` (if present) and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load from the given TOML file (if present) and the environment
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings: Settings = Self::figment(path.as_ref()).extract()?;
        settings.validate()?;
        Ok(settings)
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Check values that would make the server misbehave
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.log.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "unknown log level '{}'",
                self.log.level
            )));
        }

        let rl = &self.rate_limit;
        if rl.max_attempts == 0 {
            return Err(ConfigError::Invalid("rate_limit.max_attempts must be positive".into()));
        }
        if rl.window_secs == 0 {
            return Err(ConfigError::Invalid("rate_limit.window_secs must be positive".into()));
        }
        if rl.max_tracked_clients == 0 {
            return Err(ConfigError::Invalid(
                "rate_limit.max_tracked_clients must be positive".into(),
            ));
        }

        if self.password.min_length < MIN_PASSWORD_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "password.min_length must be at least {MIN_PASSWORD_LENGTH}"
            )));
        }
        if let Some(log_n) = self.password.scrypt_log_n {
            PasswordEncoder::with_log_n(log_n).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }

        let b = &self.bootstrap;
        if b.admin_username.is_some() != b.admin_password.is_some() {
            return Err(ConfigError::Invalid(
                "bootstrap.admin_username and bootstrap.admin_password must be set together".into(),
            ));
        }

        Ok(())
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.host, self.server.port)
    }

    pub fn rate_limit_policy(&self) -> LoginRateLimitPolicy {
        LoginRateLimitPolicy {
            max_attempts: self.rate_limit.max_attempts,
            window: Duration::from_secs(self.rate_limit.window_secs),
            max_tracked_clients: self.rate_limit.max_tracked_clients,
            expiry_grace: Duration::from_secs(self.rate_limit.expiry_grace_secs),
        }
    }

    pub fn password_policy(&self) -> PasswordPolicy {
        PasswordPolicy::new(self.password.min_length)
    }

    pub fn password_encoder(&self) -> Result<PasswordEncoder, ConfigError> {
        match self.password.scrypt_log_n {
            Some(log_n) => {
                PasswordEncoder::with_log_n(log_n).map_err(|e| ConfigError::Invalid(e.to_string()))
            },
            None => Ok(PasswordEncoder::default()),
        }
    }

    /// Bootstrap administrator credentials, when configured
    pub fn bootstrap_admin(&self) -> Option<(&str, &str)> {
        match (&self.bootstrap.admin_username, &self.bootstrap.admin_password) {
            (Some(user), Some(password)) => Some((user.as_str(), password.as_str())),
            _ => None,
        }
    }
}

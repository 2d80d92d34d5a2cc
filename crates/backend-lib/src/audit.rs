// ============================
// crates/backend-lib/src/audit.rs
// ============================
//! Audit trail of security relevant events.
//!
//! [`AuditLogger`] turns each business event into an [`AuditRecord`] and
//! hands it to every configured [`AuditSink`]. Auditing is best effort: a
//! failing sink is reported at debug level and never reaches the caller.

use crate::auth::AuthContext;
use crate::metrics::{AUDIT_EVENTS, AUDIT_SINK_FAILURES};
use chrono::{DateTime, Utc};
use metrics::counter;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Tracing target reserved for audit events
pub const AUDIT_TARGET: &str = "start::audit";

/// Security relevant business events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEvent {
    #[serde(rename_all = "camelCase")]
    UserCreated {
        user_id: Uuid,
        username: String,
        created_by: String,
    },
    #[serde(rename_all = "camelCase")]
    UserUpdated {
        user_id: Uuid,
        username: String,
        updated_by: String,
    },
    #[serde(rename_all = "camelCase")]
    UserDeleted {
        user_id: Uuid,
        username: String,
        deleted_by: String,
    },
    LoginSuccess {
        username: String,
    },
    LoginFailed {
        username: String,
        reason: String,
    },
    #[serde(rename_all = "camelCase")]
    PasswordChanged {
        user_id: Uuid,
        username: String,
        changed_by: String,
    },
}

impl AuditEvent {
    /// Stable event name, e.g. `USER_CREATED`
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserCreated { .. } => "USER_CREATED",
            Self::UserUpdated { .. } => "USER_UPDATED",
            Self::UserDeleted { .. } => "USER_DELETED",
            Self::LoginSuccess { .. } => "LOGIN_SUCCESS",
            Self::LoginFailed { .. } => "LOGIN_FAILED",
            Self::PasswordChanged { .. } => "PASSWORD_CHANGED",
        }
    }
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind();
        match self {
            Self::UserCreated {
                user_id,
                username,
                created_by,
            } => write!(f, "{kind}: userId={user_id}, username={username}, createdBy={created_by}"),
            Self::UserUpdated {
                user_id,
                username,
                updated_by,
            } => write!(f, "{kind}: userId={user_id}, username={username}, updatedBy={updated_by}"),
            Self::UserDeleted {
                user_id,
                username,
                deleted_by,
            } => write!(f, "{kind}: userId={user_id}, username={username}, deletedBy={deleted_by}"),
            Self::LoginSuccess { username } => write!(f, "{kind}: username={username}"),
            Self::LoginFailed { username, reason } => {
                write!(f, "{kind}: username={username}, reason={reason}")
            }
            Self::PasswordChanged {
                user_id,
                username,
                changed_by,
            } => write!(f, "{kind}: userId={user_id}, username={username}, changedBy={changed_by}"),
        }
    }
}

/// An event plus the time it was recorded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: AuditEvent,
}

impl AuditRecord {
    pub fn now(event: AuditEvent) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Destination for audit records
pub trait AuditSink: Send + Sync + fmt::Debug {
    fn write(&self, record: &AuditRecord) -> anyhow::Result<()>;
}

/// Writes records to the `start::audit` tracing target
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn write(&self, record: &AuditRecord) -> anyhow::Result<()> {
        let kind = record.event.kind();
        match record.event {
            AuditEvent::LoginFailed { .. } => {
                warn!(target: AUDIT_TARGET, event = kind, "{}", record.event)
            }
            _ => info!(target: AUDIT_TARGET, event = kind, "{}", record.event),
        }
        Ok(())
    }
}

/// Appends one JSON object per line to an audit file
#[derive(Debug)]
pub struct JsonLinesAuditSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonLinesAuditSink {
    /// Open (or create) the audit file for appending
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for JsonLinesAuditSink {
    fn write(&self, record: &AuditRecord) -> anyhow::Result<()> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let mut file = self.file.lock();
        file.write_all(&line)?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(any(test, feature = "test-helpers"))]
pub use memory::MemoryAuditSink;

#[cfg(any(test, feature = "test-helpers"))]
mod memory {
    use super::{AuditEvent, AuditRecord, AuditSink};
    use parking_lot::Mutex;

    /// Keeps records in memory so tests can inspect them
    #[derive(Debug, Default)]
    pub struct MemoryAuditSink {
        records: Mutex<Vec<AuditRecord>>,
    }

    impl MemoryAuditSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn records(&self) -> Vec<AuditRecord> {
            self.records.lock().clone()
        }

        pub fn events(&self) -> Vec<AuditEvent> {
            self.records.lock().iter().map(|r| r.event.clone()).collect()
        }

        pub fn clear(&self) {
            self.records.lock().clear();
        }
    }

    impl AuditSink for MemoryAuditSink {
        fn write(&self, record: &AuditRecord) -> anyhow::Result<()> {
            self.records.lock().push(record.clone());
            Ok(())
        }
    }
}

/// Records business events to the configured sinks
#[derive(Debug, Clone)]
pub struct AuditLogger {
    sinks: Vec<Arc<dyn AuditSink>>,
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new(vec![Arc::new(TracingAuditSink)])
    }
}

impl AuditLogger {
    pub fn new(sinks: Vec<Arc<dyn AuditSink>>) -> Self {
        Self { sinks }
    }

    /// Logger that drops every event
    pub fn disabled() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add_sink(&mut self, sink: Arc<dyn AuditSink>) {
        self.sinks.push(sink);
    }

    pub fn log_user_created(&self, ctx: &AuthContext, user_id: Uuid, username: &str) {
        self.record(AuditEvent::UserCreated {
            user_id,
            username: username.to_string(),
            created_by: ctx.actor().to_string(),
        });
    }

    pub fn log_user_updated(&self, ctx: &AuthContext, user_id: Uuid, username: &str) {
        self.record(AuditEvent::UserUpdated {
            user_id,
            username: username.to_string(),
            updated_by: ctx.actor().to_string(),
        });
    }

    pub fn log_user_deleted(&self, ctx: &AuthContext, user_id: Uuid, username: &str) {
        self.record(AuditEvent::UserDeleted {
            user_id,
            username: username.to_string(),
            deleted_by: ctx.actor().to_string(),
        });
    }

    pub fn log_login(&self, username: &str) {
        self.record(AuditEvent::LoginSuccess {
            username: username.to_string(),
        });
    }

    /// `reason` is a short classification such as `"invalid credentials"`
    pub fn log_login_failed(&self, username: &str, reason: &str) {
        self.record(AuditEvent::LoginFailed {
            username: username.to_string(),
            reason: reason.to_string(),
        });
    }

    pub fn log_password_changed(&self, ctx: &AuthContext, user_id: Uuid, username: &str) {
        self.record(AuditEvent::PasswordChanged {
            user_id,
            username: username.to_string(),
            changed_by: ctx.actor().to_string(),
        });
    }

    fn record(&self, event: AuditEvent) {
        counter!(AUDIT_EVENTS, "kind" => event.kind()).increment(1);
        let record = AuditRecord::now(event);

        for sink in &self.sinks {
            if let Err(e) = sink.write(&record) {
                counter!(AUDIT_SINK_FAILURES).increment(1);
                debug!(error = %e, sink = ?sink, event = record.event.kind(), "Audit sink write failed");
            }
        }
    }
}

// =========================
// tests/unit/audit_tests.rs
// =========================
//! Unit tests for the audit trail
use start_backend_lib::audit::{AuditEvent, AuditLogger, AuditRecord, JsonLinesAuditSink, MemoryAuditSink};
use start_backend_lib::auth::AuthContext;
use std::sync::Arc;
use tempfile::tempdir;
use uuid::Uuid;

#[test]
fn test_actor_defaults_to_system() {
    let memory = Arc::new(MemoryAuditSink::new());
    let audit = AuditLogger::new(vec![memory.clone()]);
    let id = Uuid::new_v4();

    audit.log_user_created(&AuthContext::Anonymous, id, "bob");
    audit.log_user_deleted(&AuthContext::authenticated("admin"), id, "bob");

    assert_eq!(
        memory.events(),
        vec![
            AuditEvent::UserCreated {
                user_id: id,
                username: "bob".to_string(),
                created_by: "system".to_string(),
            },
            AuditEvent::UserDeleted {
                user_id: id,
                username: "bob".to_string(),
                deleted_by: "admin".to_string(),
            },
        ]
    );
}

#[test]
fn test_event_text_format() {
    let event = AuditEvent::LoginFailed {
        username: "mallory".to_string(),
        reason: "invalid credentials".to_string(),
    };
    assert_eq!(
        event.to_string(),
        "LOGIN_FAILED: username=mallory, reason=invalid credentials"
    );
}

#[test]
fn test_json_lines_sink_appends_records() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("audit").join("events.jsonl");

    let sink = Arc::new(JsonLinesAuditSink::open(&path).unwrap());
    let audit = AuditLogger::new(vec![sink]);
    audit.log_login("alice");
    audit.log_login_failed("alice", "account disabled");

    let contents = std::fs::read_to_string(&path).unwrap();
    let records: Vec<AuditRecord> = contents
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].event.kind(), "LOGIN_SUCCESS");
    assert_eq!(records[1].event.kind(), "LOGIN_FAILED");

    let raw: serde_json::Value = serde_json::from_str(contents.lines().next().unwrap()).unwrap();
    assert_eq!(raw["event"], "LOGIN_SUCCESS");
    assert_eq!(raw["username"], "alice");
}

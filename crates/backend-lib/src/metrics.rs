// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for metric keys
pub const LOGIN_ALLOWED: &str = "auth.login.allowed";
pub const LOGIN_RATE_LIMITED: &str = "auth.login.rate_limited";
pub const LOGIN_SUCCEEDED: &str = "auth.login.succeeded";
pub const LOGIN_FAILED: &str = "auth.login.failed";
pub const RATE_LIMIT_TRACKED_CLIENTS: &str = "auth.rate_limit.tracked_clients";
pub const RATE_LIMIT_EVICTIONS: &str = "auth.rate_limit.evictions";
pub const AUDIT_EVENTS: &str = "audit.events";
pub const AUDIT_SINK_FAILURES: &str = "audit.sink_failures";
pub const USERS_STORED: &str = "users.stored";

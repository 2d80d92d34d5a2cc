// crates/backend-lib/src/middleware/mod.rs

//! Request middleware.

pub mod rate_limit;

pub use rate_limit::{client_key, login_rate_limit, RATE_LIMIT_REMAINING_HEADER};

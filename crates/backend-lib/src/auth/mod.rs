// ============================
// crates/backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod clock;
pub mod context;
pub mod password;
pub mod rate_limit;
mod service;
mod service_impl;

pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "test-helpers"))]
pub use clock::ManualClock;
pub use context::{AuthContext, SYSTEM_ACTOR};
pub use password::{
    hash_password, validate_password, verify_password, PasswordEncoder, PasswordPolicy,
    PasswordValidationError, MIN_PASSWORD_LENGTH,
};
pub use rate_limit::{BucketStore, LoginRateLimitPolicy, LoginRateLimiter, TokenBucket, MAX_LOGIN_ATTEMPTS};
pub use service::{AuthService, LoginFailure};
pub use service_impl::DefaultAuth;

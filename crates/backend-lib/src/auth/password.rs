// ============================
// crates/backend-lib/src/auth/password.rs
// ============================
//! Password policy, hashing and verification.
use scrypt::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Params, Scrypt,
};
use thiserror::Error;
use tracing::debug;
use zeroize::Zeroize;

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Reasons a candidate password is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordValidationError {
    #[error("Password cannot be empty")]
    Empty,

    #[error("Password must be at least {min_length} characters long")]
    TooShort { min_length: usize },
}

/// Password strength rules applied before a password is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: MIN_PASSWORD_LENGTH,
        }
    }
}

impl PasswordPolicy {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    /// Check a candidate password.
    ///
    /// Length is counted in Unicode scalar values, not bytes and not UTF-16
    /// code units. A character outside the Basic Multilingual Plane counts
    /// once, so `"😀😀😀😀"` is four characters long and fails an 8 character
    /// minimum even though it is eight UTF-16 units.
    pub fn validate(&self, password: Option<&str>) -> Result<(), PasswordValidationError> {
        let password = match password {
            Some(p) if !p.is_empty() => p,
            _ => return Err(PasswordValidationError::Empty),
        };

        if password.chars().count() < self.min_length {
            return Err(PasswordValidationError::TooShort {
                min_length: self.min_length,
            });
        }

        debug!("Password validation passed");
        Ok(())
    }
}

/// Check a password against the default policy
pub fn validate_password(password: Option<&str>) -> Result<(), PasswordValidationError> {
    PasswordPolicy::default().validate(password)
}

/// Hashes and verifies passwords with scrypt
#[derive(Debug, Clone)]
pub struct PasswordEncoder {
    params: Params,
}

impl Default for PasswordEncoder {
    fn default() -> Self {
        Self {
            params: Params::recommended(),
        }
    }
}

impl PasswordEncoder {
    /// Encoder with a custom scrypt cost (`N = 2^log_n`, r = 8, p = 1)
    pub fn with_log_n(log_n: u8) -> anyhow::Result<Self> {
        let params = Params::new(
            log_n,
            Params::RECOMMENDED_R,
            Params::RECOMMENDED_P,
            Params::RECOMMENDED_LEN,
        )
        .map_err(|e| anyhow::anyhow!("invalid scrypt parameters: {e}"))?;
        Ok(Self { params })
    }

    /// Hash a password into a PHC string
    pub fn hash(&self, plain: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Scrypt
            .hash_password_customized(plain.as_bytes(), None, None, self.params.clone(), &salt)
            .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?
            .to_string();
        Ok(hash)
    }

    /// Securely hash a password and zeroize the original
    pub fn hash_secure(&self, plain: &mut String) -> anyhow::Result<String> {
        let hash = self.hash(plain);
        plain.zeroize();
        hash
    }

    /// Verify a password against a hash.
    ///
    /// Parameters are read from the hash, so hashes made with another cost
    /// still verify.
    pub fn verify(&self, hash: &str, plain: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return false,
        };
        Scrypt.verify_password(plain.as_bytes(), &parsed_hash).is_ok()
    }
}

/// Hash a password using scrypt with the recommended cost
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    PasswordEncoder::default().hash(plain)
}

/// Verify a password against a hash
pub fn verify_password(hash: &str, plain: &str) -> bool {
    PasswordEncoder::default().verify(hash, plain)
}

//! Hashing configuration.
//!
//! The salt is a deployment secret: two deployments with different salts
//! produce unrelated hashes for the same document number, so hashes leaked
//! from one store cannot be correlated with another.

use serde::{Deserialize, Serialize};

use crate::error::CanonicalError;

/// Minimum salt length accepted by [`HashingConfig::validate`].
pub const MIN_SALT_LEN: usize = 16;

/// Configuration for salted document hashing.
///
/// ```rust
/// use canonical::HashingConfig;
///
/// let cfg = HashingConfig::new("a-deployment-secret-salt");
/// assert!(cfg.validate().is_ok());
/// assert!(HashingConfig::new("short").validate().is_err());
/// ```
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HashingConfig {
    /// Secret mixed into every document hash. Never logged.
    pub salt: String,
}

impl HashingConfig {
    pub fn new(salt: impl Into<String>) -> Self {
        Self { salt: salt.into() }
    }

    /// Rejects salts that are too short to be a meaningful secret.
    pub fn validate(&self) -> Result<(), CanonicalError> {
        if self.salt.trim().len() < MIN_SALT_LEN {
            return Err(CanonicalError::InvalidConfig(format!(
                "hashing salt must be at least {MIN_SALT_LEN} characters"
            )));
        }
        Ok(())
    }
}

// Debug output must not leak the salt into logs.
impl std::fmt::Debug for HashingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashingConfig")
            .field("salt", &"<redacted>")
            .finish()
    }
}

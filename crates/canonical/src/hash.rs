//! Hashing utilities for document numbers.
//!
//! # Document Hash
//!
//! ```text
//! SHA-256(salt_bytes || 0x00 || digits_only(document_number)) -> lowercase hex
//! ```
//!
//! The separator byte keeps `salt="ab", number="1"` distinct from
//! `salt="a", number="b1"`-style concatenation collisions.
//!
//! # Placeholder Hash
//!
//! ```text
//! "placeholder:" || uuid_v4_simple
//! ```
//!
//! A record carries a placeholder until its real number has been extracted.
//! Placeholders are unique per submission and can never collide with a real
//! hash because they are neither 64 chars long nor pure hex.

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::HashingConfig;
use crate::digits::digits_only;
use crate::error::CanonicalError;

/// Prefix shared by every placeholder hash.
pub const PLACEHOLDER_PREFIX: &str = "placeholder:";

/// Computes the salted identity hash for a document number.
///
/// Formatting characters are ignored: `1.041.970.336` and `1041970336`
/// hash identically.
///
/// # Errors
///
/// [`CanonicalError::EmptyDocumentNumber`] when `document_number` has no
/// digits at all.
///
/// ```rust
/// use canonical::{document_hash, HashingConfig};
///
/// let cfg = HashingConfig::new("doc-example-salt-value");
/// let a = document_hash(&cfg, "52.345.678").unwrap();
/// let b = document_hash(&cfg, "52345678").unwrap();
/// assert_eq!(a, b);
/// ```
pub fn document_hash(cfg: &HashingConfig, document_number: &str) -> Result<String, CanonicalError> {
    let digits = digits_only(document_number);
    if digits.is_empty() {
        return Err(CanonicalError::EmptyDocumentNumber);
    }
    let mut hasher = Sha256::new();
    hasher.update(cfg.salt.as_bytes());
    hasher.update([0]);
    hasher.update(digits.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Generates a fresh placeholder hash for a record whose document number is
/// not known yet.
pub fn placeholder_hash() -> String {
    format!("{PLACEHOLDER_PREFIX}{}", Uuid::new_v4().simple())
}

/// Returns `true` when `hash` was produced by [`placeholder_hash`].
pub fn is_placeholder_hash(hash: &str) -> bool {
    hash.starts_with(PLACEHOLDER_PREFIX)
}

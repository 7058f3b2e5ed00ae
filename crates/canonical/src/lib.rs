//! docverify canonical layer.
//!
//! Normalizes the text that flows through the verification pipeline into a
//! deterministic form and derives the salted document hash used for
//! duplicate detection.
//!
//! ## What we do
//!
//! - Name normalization (NFKD, combining marks stripped, lowercase, letters only)
//! - Accent folding for case- and accent-insensitive comparisons
//! - Digit extraction for document numbers
//! - Salted SHA-256 document hashes and unique placeholder hashes
//!
//! ## Pure function guarantee
//!
//! Everything except [`placeholder_hash`] is free of I/O, clocks and
//! randomness. Same input + same salt = same output on any machine.
//!
//! ## Invariants worth knowing
//!
//! - Document hash = SHA-256(salt || 0x00 || digits_only(number)), lowercase hex
//! - Real hashes are always 64 hex chars; placeholders never are
//! - The raw document number is never part of a hash's textual form

mod config;
mod digits;
mod error;
mod hash;
mod name;
mod whitespace;

pub use crate::config::HashingConfig;
pub use crate::digits::digits_only;
pub use crate::error::CanonicalError;
pub use crate::hash::{document_hash, is_placeholder_hash, placeholder_hash, PLACEHOLDER_PREFIX};
pub use crate::name::{fold_accents, normalize_name};
pub use crate::whitespace::collapse_whitespace;

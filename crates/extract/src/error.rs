//! Error types produced by the extract crate.
//!
//! | Error | Meaning |
//! |-------|---------|
//! | [`EmptyText`](ExtractError::EmptyText) | OCR returned nothing usable |
//! | [`MissingDocumentNumber`](ExtractError::MissingDocumentNumber) | No 6–10 digit number found |
//! | [`InvalidConfig`](ExtractError::InvalidConfig) | Parser configuration rejected |
//!
//! Missing names are *not* errors: an empty field flows into a low match
//! score downstream.
use thiserror::Error;

use crate::config::ConfigError;

/// Errors produced while parsing OCR text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("OCR text is empty")]
    EmptyText,
    #[error("no document number found in OCR text")]
    MissingDocumentNumber,
    #[error("invalid extract configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

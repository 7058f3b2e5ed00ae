use thiserror::Error;

/// Errors that can occur while normalizing or hashing identity data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CanonicalError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("document number contains no digits")]
    EmptyDocumentNumber,
}

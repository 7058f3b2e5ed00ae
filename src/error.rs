//! Error taxonomy of the verification pipeline.
//!
//! Validation, conflict, authorization and not-found errors are returned
//! synchronously to the caller. Extraction, match and timeout failures
//! happen inside the deferred job and only ever surface as a record's
//! `rejection_reason`.

use store::{StoreError, VerificationStatus};
use thiserror::Error;

use crate::collaborators::CollaboratorError;

/// Errors produced by the coordinator and the review workflow.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum VerificationError {
    /// Malformed or missing input. No record is created.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An uploaded image exceeds the configured size limit.
    #[error("image is {size} bytes, limit is {limit}")]
    ImageTooLarge { size: usize, limit: usize },

    /// The request conflicts with an existing record.
    #[error("{message}")]
    Conflict {
        message: String,
        existing_status: Option<VerificationStatus>,
        record_id: Option<String>,
    },

    /// The user exceeded the rolling submission limit.
    #[error("too many verification attempts: {0}")]
    TooManyAttempts(String),

    #[error("document extraction failed: {0}")]
    ExtractionFailure(String),

    #[error("identity match failed: {0}")]
    MatchFailure(String),

    #[error("not authorized: {0}")]
    Authorization(String),

    #[error("verification timed out after {0} ms")]
    Timeout(u64),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("store error: {0}")]
    Store(StoreError),

    #[error("file storage error: {0}")]
    Storage(String),

    #[error("collaborator error: {0}")]
    Collaborator(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type VerificationResult<T> = Result<T, VerificationError>;

impl VerificationError {
    pub fn conflict(message: impl Into<String>) -> Self {
        VerificationError::Conflict {
            message: message.into(),
            existing_status: None,
            record_id: None,
        }
    }

    /// Stable machine-readable code, used by the HTTP surface and in logs.
    pub fn code(&self) -> &'static str {
        match self {
            VerificationError::Validation(_) => "VALIDATION_ERROR",
            VerificationError::ImageTooLarge { .. } => "IMAGE_TOO_LARGE",
            VerificationError::Conflict { .. } => "CONFLICT",
            VerificationError::TooManyAttempts(_) => "TOO_MANY_ATTEMPTS",
            VerificationError::ExtractionFailure(_) => "EXTRACTION_FAILURE",
            VerificationError::MatchFailure(_) => "MATCH_FAILURE",
            VerificationError::Authorization(_) => "FORBIDDEN",
            VerificationError::Timeout(_) => "TIMEOUT",
            VerificationError::NotFound(_) => "NOT_FOUND",
            VerificationError::Store(_) => "STORE_ERROR",
            VerificationError::Storage(_) => "STORAGE_ERROR",
            VerificationError::Collaborator(_) => "UPSTREAM_ERROR",
            VerificationError::Config(_) => "CONFIG_ERROR",
        }
    }
}

impl From<StoreError> for VerificationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ActiveRecordExists { record_id, status } => VerificationError::Conflict {
                message: format!("a verification is already {status}"),
                existing_status: Some(status),
                record_id: Some(record_id),
            },
            StoreError::NotFound(id) => {
                VerificationError::NotFound(format!("verification record {id}"))
            }
            StoreError::DuplicateHash { .. } => VerificationError::conflict(
                "this document is already registered to another account",
            ),
            other => VerificationError::Store(other),
        }
    }
}

impl From<CollaboratorError> for VerificationError {
    fn from(err: CollaboratorError) -> Self {
        match err {
            CollaboratorError::Storage(msg) => VerificationError::Storage(msg),
            other => VerificationError::Collaborator(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_record_maps_to_conflict_with_status() {
        let err: VerificationError = StoreError::ActiveRecordExists {
            record_id: "r1".into(),
            status: VerificationStatus::Processing,
        }
        .into();
        match err {
            VerificationError::Conflict {
                existing_status,
                record_id,
                ..
            } => {
                assert_eq!(existing_status, Some(VerificationStatus::Processing));
                assert_eq!(record_id.as_deref(), Some("r1"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(VerificationError::Validation("x".into()).code(), "VALIDATION_ERROR");
        assert_eq!(VerificationError::conflict("x").code(), "CONFLICT");
        assert_eq!(VerificationError::NotFound("x".into()).code(), "NOT_FOUND");
    }
}

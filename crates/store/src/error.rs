use bincode::error::{DecodeError, EncodeError};
use thiserror::Error;

use crate::model::VerificationStatus;

/// Errors produced by the record store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(String),
    #[error("serialization encode error: {0}")]
    Encode(String),
    #[error("serialization decode error: {0}")]
    Decode(String),
    #[error("verification record {0} not found")]
    NotFound(String),
    /// The user already has a record in an active status.
    #[error("user already has an active verification ({status})")]
    ActiveRecordExists {
        record_id: String,
        status: VerificationStatus,
    },
    /// Another record already uses this hash (placeholder collision or a
    /// different user's approved document).
    #[error("document hash already in use by record {record_id}")]
    DuplicateHash { record_id: String },
    /// Compare-and-set failed: the record moved on before this write.
    #[error("record {record_id} is {actual}, expected one of {expected:?}")]
    StaleTransition {
        record_id: String,
        expected: Vec<VerificationStatus>,
        actual: VerificationStatus,
    },
    /// The lifecycle does not allow this edge.
    #[error("transition {from} -> {to} is not allowed")]
    IllegalTransition {
        from: VerificationStatus,
        to: VerificationStatus,
    },
    /// A write-once field was changed.
    #[error("field {0} is write-once")]
    WriteOnce(&'static str),
    /// `previous_attempt` points at a missing or foreign record.
    #[error("previous attempt {0} does not belong to this user")]
    InvalidPreviousAttempt(String),
}

impl From<EncodeError> for StoreError {
    fn from(e: EncodeError) -> Self {
        StoreError::Encode(e.to_string())
    }
}

impl From<DecodeError> for StoreError {
    fn from(e: DecodeError) -> Self {
        StoreError::Decode(e.to_string())
    }
}

impl StoreError {
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }
}

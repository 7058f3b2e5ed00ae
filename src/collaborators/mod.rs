//! Services the pipeline consumes but does not own.
//!
//! Each one sits behind an `async_trait` so the coordinator can be wired
//! with the shipped implementations in production and with fakes in tests.

mod files;
mod ocr;
mod users;

use std::path::Path;

use async_trait::async_trait;
use matcher::PersonName;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use files::LocalFileStorage;
pub use ocr::{parse_tesseract_tsv, TesseractCli};
pub use users::{InMemoryUserDirectory, UserProfile};

/// Failures reported by a collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("ocr failed: {0}")]
    Ocr(String),
    #[error("file storage failed: {0}")]
    Storage(String),
    #[error("user {0} not found")]
    UserNotFound(String),
    #[error("identity provider failed: {0}")]
    Provider(String),
}

/// Recognized text of one image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrOutput {
    /// Lines separated by `\n`.
    pub text: String,
    /// Mean word confidence in `[0, 1]`.
    pub confidence: f32,
}

#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, path: &Path) -> Result<OcrOutput, CollaboratorError>;
}

/// Where uploaded images live while their record owns them.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Stores `bytes` under a fresh name ending in `extension` and returns its path.
    async fn save(&self, bytes: &[u8], extension: &str) -> Result<String, CollaboratorError>;
    /// Removes a stored file. Missing files are not an error.
    async fn delete(&self, path: &str) -> Result<(), CollaboratorError>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Registered name and display data of a user.
    async fn profile(&self, user_id: &str) -> Result<Option<UserProfile>, CollaboratorError>;
    /// Flags the user as verified after an approval.
    async fn mark_verified(&self, user_id: &str) -> Result<(), CollaboratorError>;

    /// The name pair used for matching.
    async fn name_fields(&self, user_id: &str) -> Result<PersonName, CollaboratorError> {
        self.profile(user_id)
            .await?
            .map(|p| p.name())
            .ok_or_else(|| CollaboratorError::UserNotFound(user_id.to_string()))
    }
}

/// External KYC check: does this document belong to this person?
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn check(
        &self,
        document_number: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<bool, CollaboratorError>;
}

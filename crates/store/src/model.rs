//! Verification record model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a verification record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    Processing,
    PendingReview,
    Approved,
    Rejected,
    Expired,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Processing => "processing",
            VerificationStatus::PendingReview => "pending_review",
            VerificationStatus::Approved => "approved",
            VerificationStatus::Rejected => "rejected",
            VerificationStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of identity document submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    NationalId,
    ForeignId,
    Passport,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::NationalId => "national_id",
            DocumentType::ForeignId => "foreign_id",
            DocumentType::Passport => "passport",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentType {
    type Err = String;

    /// Accepts snake_case, kebab-case and the short local codes (`CC`, `CE`, `PA`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "national_id" | "cc" => Ok(DocumentType::NationalId),
            "foreign_id" | "ce" => Ok(DocumentType::ForeignId),
            "passport" | "pa" => Ok(DocumentType::Passport),
            other => Err(format!("unsupported document type: {other:?}")),
        }
    }
}

/// How the final decision was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMethod {
    AutomatedOcr,
    Manual,
    ExternalApi,
    ForcedForTest,
}

impl VerificationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationMethod::AutomatedOcr => "automated_ocr",
            VerificationMethod::Manual => "manual",
            VerificationMethod::ExternalApi => "external_api",
            VerificationMethod::ForcedForTest => "forced_for_test",
        }
    }
}

/// Fields recovered from the document by OCR.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedData {
    pub first_name: String,
    pub last_name: String,
    pub document_number: String,
    /// Mean OCR confidence in `[0, 1]`.
    pub confidence: f32,
}

/// One submission attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub id: String,
    pub user_id: String,
    /// Store-assigned creation order; strictly increasing.
    pub sequence: u64,
    pub document_type: DocumentType,
    /// Sensitive. Write-once.
    pub document_number: Option<String>,
    /// Placeholder until extraction succeeds, then the salted hash.
    pub document_hash: String,
    pub status: VerificationStatus,
    pub extracted_data: Option<ExtractedData>,
    pub verification_method: VerificationMethod,
    pub attempts: u32,
    pub similarity: Option<f64>,
    pub rejection_reason: Option<String>,
    pub review_reason: Option<String>,
    pub previous_attempt: Option<String>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub front_image: Option<String>,
    pub back_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

impl VerificationRecord {
    /// A fresh `pending` record carrying a unique placeholder hash.
    pub fn new(user_id: impl Into<String>, document_type: DocumentType) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            sequence: 0,
            document_type,
            document_number: None,
            document_hash: canonical::placeholder_hash(),
            status: VerificationStatus::Pending,
            extracted_data: None,
            verification_method: VerificationMethod::AutomatedOcr,
            attempts: 0,
            similarity: None,
            rejection_reason: None,
            review_reason: None,
            previous_attempt: None,
            reviewed_by: None,
            reviewed_at: None,
            front_image: None,
            back_image: None,
            created_at: now,
            updated_at: now,
            verified_at: None,
        }
    }

    pub fn with_images(mut self, front: impl Into<String>, back: Option<String>) -> Self {
        self.front_image = Some(front.into());
        self.back_image = back;
        self
    }

    pub fn with_previous_attempt(mut self, previous: impl Into<String>) -> Self {
        self.previous_attempt = Some(previous.into());
        self
    }

    pub fn has_images(&self) -> bool {
        self.front_image.is_some()
    }

    /// Stored image paths owned by this record.
    pub fn image_paths(&self) -> Vec<String> {
        self.front_image
            .iter()
            .chain(self.back_image.iter())
            .cloned()
            .collect()
    }

    pub fn has_placeholder_hash(&self) -> bool {
        canonical::is_placeholder_hash(&self.document_hash)
    }
}

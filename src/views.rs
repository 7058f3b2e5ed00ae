//! Read models handed to callers.
//!
//! None of them carry the raw document number.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use store::{DocumentType, VerificationMethod, VerificationRecord, VerificationStatus};

/// Returned by submit and retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub record_id: String,
    pub status: VerificationStatus,
    pub estimated_seconds: u64,
}

/// Names recovered from the document, without the number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedSummary {
    pub first_name: String,
    pub last_name: String,
    pub confidence: f32,
}

/// The user's view of their latest verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusView {
    /// `not_started` or a record status.
    pub status: String,
    pub record_id: Option<String>,
    pub message: String,
    pub extracted: Option<ExtractedSummary>,
    pub rejection_reason: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub verified_at: Option<DateTime<Utc>>,
    pub can_retry: bool,
}

pub const NOT_STARTED: &str = "not_started";

impl StatusView {
    pub fn not_started() -> Self {
        Self {
            status: NOT_STARTED.to_string(),
            record_id: None,
            message: "No verification has been submitted yet".to_string(),
            extracted: None,
            rejection_reason: None,
            submitted_at: None,
            verified_at: None,
            can_retry: false,
        }
    }

    pub fn from_record(record: &VerificationRecord) -> Self {
        Self {
            status: record.status.as_str().to_string(),
            record_id: Some(record.id.clone()),
            message: status_message(record).to_string(),
            extracted: summarize(record),
            rejection_reason: record.rejection_reason.clone(),
            submitted_at: Some(record.created_at),
            verified_at: record.verified_at,
            can_retry: record.status.is_retryable(),
        }
    }
}

fn status_message(record: &VerificationRecord) -> &'static str {
    match record.status {
        VerificationStatus::Pending if !record.has_images() => {
            "Waiting for document images"
        }
        VerificationStatus::Pending => "Your document is queued for processing",
        VerificationStatus::Processing => "Your document is being processed",
        VerificationStatus::PendingReview => "Your document is awaiting manual review",
        VerificationStatus::Approved => "Your identity has been verified",
        VerificationStatus::Rejected => "Your verification was rejected",
        VerificationStatus::Expired => "Your verification expired",
    }
}

fn summarize(record: &VerificationRecord) -> Option<ExtractedSummary> {
    record.extracted_data.as_ref().map(|d| ExtractedSummary {
        first_name: d.first_name.clone(),
        last_name: d.last_name.clone(),
        confidence: d.confidence,
    })
}

/// Administrative view of one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSummary {
    pub record_id: String,
    pub user_id: String,
    pub document_type: DocumentType,
    pub status: VerificationStatus,
    pub verification_method: VerificationMethod,
    pub attempts: u32,
    pub similarity: Option<f64>,
    pub extracted: Option<ExtractedSummary>,
    pub rejection_reason: Option<String>,
    pub review_reason: Option<String>,
    pub previous_attempt: Option<String>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

impl From<&VerificationRecord> for RecordSummary {
    fn from(record: &VerificationRecord) -> Self {
        Self {
            record_id: record.id.clone(),
            user_id: record.user_id.clone(),
            document_type: record.document_type,
            status: record.status,
            verification_method: record.verification_method,
            attempts: record.attempts,
            similarity: record.similarity,
            extracted: summarize(record),
            rejection_reason: record.rejection_reason.clone(),
            review_reason: record.review_reason.clone(),
            previous_attempt: record.previous_attempt.clone(),
            reviewed_by: record.reviewed_by.clone(),
            reviewed_at: record.reviewed_at,
            created_at: record.created_at,
            updated_at: record.updated_at,
            verified_at: record.verified_at,
        }
    }
}

/// A `pending_review` record joined with its owner's display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub display_name: Option<String>,
    #[serde(flatten)]
    pub record: RecordSummary,
}

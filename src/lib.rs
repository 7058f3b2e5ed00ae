//! Workspace umbrella crate for identity-document verification.
//!
//! A user uploads photos of an identity document; the [`Coordinator`]
//! persists a `pending` record and hands the images to a background job
//! that reads them with an [`OcrEngine`], extracts the document number and
//! names, rejects documents already verified by another account and scores
//! the names against the registered account. Scores land in one of three
//! bands: approved, manual review or rejected. The [`ReviewWorkflow`] covers
//! what humans do afterwards: reviewer decisions, user retries, audit
//! history and the retention purge.
//!
//! ```no_run
//! use std::sync::Arc;
//! use docverify::{
//!     Collaborators, Coordinator, ImageUpload, InMemoryUserDirectory, LocalFileStorage,
//!     SubmitRequest, TesseractCli, UserProfile, VerificationConfig, VerificationStore,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = VerificationConfig::from_file("docverify.yaml")?;
//! let store = Arc::new(VerificationStore::open(&config.storage)?);
//! let users = Arc::new(InMemoryUserDirectory::new());
//! users.insert("user-1", UserProfile::new("Luz Deisy", "Ramos Ochoa"));
//!
//! let coordinator = Coordinator::new(
//!     &config,
//!     store,
//!     Collaborators {
//!         ocr: Arc::new(TesseractCli::new(&config.ocr)),
//!         files: Arc::new(LocalFileStorage::new(&config.uploads.dir)),
//!         users,
//!         identity_provider: None,
//!     },
//! )?;
//! let receipt = coordinator
//!     .submit(SubmitRequest {
//!         user_id: "user-1".into(),
//!         document_type: "national_id".into(),
//!         front_image: Some(ImageUpload::new(std::fs::read("front.jpg")?, "image/jpeg")),
//!         back_image: None,
//!     })
//!     .await?;
//! println!("{} is {}", receipt.record_id, receipt.status);
//! # Ok(())
//! # }
//! ```

pub mod caller;
pub mod collaborators;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod metrics;
pub mod views;
pub mod workflow;

pub use canonical::{document_hash, placeholder_hash, HashingConfig};
pub use extract::{DocumentParser, ExtractConfig, ParsedDocument};
pub use matcher::{
    bigram_similarity, CheckDigitScheme, Decision, IdentityMatcher, MatchConfig, MatchOutcome,
    PersonName,
};
pub use store::{
    BackendConfig, DocumentType, ExtractedData, Page, StoreError, VerificationMethod,
    VerificationRecord, VerificationStatus, VerificationStore,
};

pub use caller::{Caller, Role};
pub use collaborators::{
    CollaboratorError, FileStorage, IdentityProvider, InMemoryUserDirectory, LocalFileStorage,
    OcrEngine, OcrOutput, TesseractCli, UserDirectory, UserProfile,
};
pub use config::{ConfigLoadError, VerificationConfig};
pub use coordinator::{Collaborators, Coordinator, ImageUpload, SubmitRequest, SweepReport};
pub use error::{VerificationError, VerificationResult};
pub use metrics::{set_verification_metrics, VerificationMetrics};
pub use views::{ExtractedSummary, RecordSummary, ReviewItem, StatusView, SubmitReceipt};
pub use workflow::{PurgeReport, RetryRequest, ReviewDecision, ReviewWorkflow};

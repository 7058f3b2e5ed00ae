#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use docverify::{
    Collaborators, CollaboratorError, Coordinator, IdentityProvider, ImageUpload,
    InMemoryUserDirectory, LocalFileStorage, OcrEngine, OcrOutput, ReviewWorkflow,
    SubmitReceipt, SubmitRequest, UserProfile, VerificationConfig, VerificationRecord,
    VerificationResult, VerificationStatus, VerificationStore,
};
use tempfile::TempDir;

pub const SALT: &str = "integration-test-salt-0001";

pub const CEDULA_FRONT: &str = "REPÚBLICA DE COLOMBIA\n\
    IDENTIFICACIÓN PERSONAL\n\
    CÉDULA DE CIUDADANÍA\n\
    NÚMERO 1.041.970.336\n\
    RAMOS OCHOA\n\
    APELLIDOS\n\
    LUZ DEISY\n\
    NOMBRES";

/// OCR text whose engine call never returns.
pub const HANG: &str = "HANG";
/// OCR text whose engine call fails.
pub const FAIL: &str = "FAIL";

/// Reads the "image" back as its text, so tests control what OCR sees.
pub struct EchoOcr;

#[async_trait]
impl OcrEngine for EchoOcr {
    async fn recognize(&self, path: &Path) -> Result<OcrOutput, CollaboratorError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CollaboratorError::Ocr(e.to_string()))?;
        match text.as_str() {
            HANG => std::future::pending().await,
            FAIL => Err(CollaboratorError::Ocr("engine crashed".into())),
            _ => Ok(OcrOutput {
                text,
                confidence: 0.9,
            }),
        }
    }
}

/// Identity provider with a fixed answer.
pub struct FixedProvider(pub bool);

#[async_trait]
impl IdentityProvider for FixedProvider {
    async fn check(&self, _: &str, _: &str, _: &str) -> Result<bool, CollaboratorError> {
        Ok(self.0)
    }
}

pub struct Harness {
    pub coordinator: Coordinator,
    pub workflow: ReviewWorkflow,
    pub users: Arc<InMemoryUserDirectory>,
    pub config: VerificationConfig,
    pub dir: TempDir,
}

pub fn test_config() -> VerificationConfig {
    let mut config = VerificationConfig::default();
    config.hashing.salt = SALT.to_string();
    config.coordinator.liveness_timeout_ms = 5_000;
    config
}

impl Harness {
    pub fn new() -> Self {
        Self::build(|_| {}, None)
    }

    pub fn with_config(configure: impl FnOnce(&mut VerificationConfig)) -> Self {
        Self::build(configure, None)
    }

    pub fn build(
        configure: impl FnOnce(&mut VerificationConfig),
        identity_provider: Option<Arc<dyn IdentityProvider>>,
    ) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = test_config();
        config.uploads.dir = dir.path().join("uploads");
        configure(&mut config);

        let users = Arc::new(InMemoryUserDirectory::new());
        let coordinator = Coordinator::new(
            &config,
            Arc::new(VerificationStore::in_memory()),
            Collaborators {
                ocr: Arc::new(EchoOcr),
                files: Arc::new(LocalFileStorage::new(&config.uploads.dir)),
                users: users.clone(),
                identity_provider,
            },
        )
        .expect("coordinator builds");
        let workflow = ReviewWorkflow::new(coordinator.clone());

        Self {
            coordinator,
            workflow,
            users,
            config,
            dir,
        }
    }

    pub fn register(&self, user_id: &str, first_name: &str, last_name: &str) {
        self.users
            .insert(user_id, UserProfile::new(first_name, last_name));
    }

    pub async fn submit(&self, user_id: &str, ocr_text: &str) -> VerificationResult<SubmitReceipt> {
        self.submit_both(user_id, ocr_text, None).await
    }

    pub async fn submit_both(
        &self,
        user_id: &str,
        front_text: &str,
        back_text: Option<&str>,
    ) -> VerificationResult<SubmitReceipt> {
        self.coordinator
            .submit(SubmitRequest {
                user_id: user_id.to_string(),
                document_type: "national_id".to_string(),
                front_image: Some(image(front_text)),
                back_image: back_text.map(image),
            })
            .await
    }

    pub fn record(&self, record_id: &str) -> VerificationRecord {
        self.coordinator
            .store()
            .get(record_id)
            .expect("store read")
            .expect("record exists")
    }

    /// Polls until the record leaves `pending`/`processing`.
    pub async fn settled(&self, record_id: &str) -> VerificationRecord {
        self.wait_for(record_id, |r| {
            !matches!(
                r.status,
                VerificationStatus::Pending | VerificationStatus::Processing
            )
        })
        .await
    }

    pub async fn wait_for(
        &self,
        record_id: &str,
        done: impl Fn(&VerificationRecord) -> bool,
    ) -> VerificationRecord {
        for _ in 0..500 {
            let record = self.record(record_id);
            if done(&record) {
                return record;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("record {record_id} did not reach the expected state");
    }
}

pub fn image(ocr_text: &str) -> ImageUpload {
    ImageUpload::new(ocr_text.as_bytes().to_vec(), "image/jpeg")
}

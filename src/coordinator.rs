//! Intake, deferred processing and the janitor.
//!
//! `submit` persists a `pending` record and returns at once; a tokio task
//! tracked in the job table then drives the record through OCR, parsing,
//! hashing, deduplication and matching. Every write goes through
//! [`VerificationStore::transition`], so a late job can never overwrite a
//! state the janitor or a reviewer already reached.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use canonical::HashingConfig;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use extract::DocumentParser;
use matcher::{Decision, IdentityMatcher, PersonName};
use serde::{Deserialize, Serialize};
use store::{
    DocumentType, ExtractedData, StoreError, VerificationMethod, VerificationRecord,
    VerificationStatus, VerificationStore,
};
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn, Instrument, Level};

use crate::collaborators::{FileStorage, IdentityProvider, OcrEngine, OcrOutput, UserDirectory};
use crate::config::{CoordinatorConfig, VerificationConfig};
use crate::error::{VerificationError, VerificationResult};
use crate::metrics::metrics_recorder;
use crate::views::{StatusView, SubmitReceipt};

use VerificationStatus::{Approved, Expired, Pending, PendingReview, Processing, Rejected};

/// One uploaded image as received from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl ImageUpload {
    pub fn new(bytes: impl Into<Vec<u8>>, content_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.into(),
        }
    }

    fn extension(&self) -> &str {
        let subtype = self
            .content_type
            .split(';')
            .next()
            .and_then(|mime| mime.split('/').nth(1))
            .unwrap_or("bin")
            .trim();
        match subtype {
            "jpeg" | "pjpeg" => "jpg",
            other => other,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub user_id: String,
    /// Parsed leniently; see [`DocumentType`]'s `FromStr`.
    pub document_type: String,
    pub front_image: Option<ImageUpload>,
    pub back_image: Option<ImageUpload>,
}

/// The services a coordinator is wired with.
#[derive(Clone)]
pub struct Collaborators {
    pub ocr: Arc<dyn OcrEngine>,
    pub files: Arc<dyn FileStorage>,
    pub users: Arc<dyn UserDirectory>,
    pub identity_provider: Option<Arc<dyn IdentityProvider>>,
}

/// Record ids touched by one janitor pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub timed_out: Vec<String>,
    pub expired: Vec<String>,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.timed_out.is_empty() && self.expired.is_empty()
    }
}

pub(crate) struct Inner {
    pub(crate) store: Arc<VerificationStore>,
    pub(crate) ocr: Arc<dyn OcrEngine>,
    pub(crate) files: Arc<dyn FileStorage>,
    pub(crate) users: Arc<dyn UserDirectory>,
    identity_provider: Option<Arc<dyn IdentityProvider>>,
    parser: DocumentParser,
    matcher: IdentityMatcher,
    hashing: HashingConfig,
    pub(crate) cfg: CoordinatorConfig,
    jobs: DashMap<String, AbortHandle>,
}

/// Owns the job table and drives records through processing.
///
/// Cloning is cheap; clones share the same job table.
#[derive(Clone)]
pub struct Coordinator {
    pub(crate) inner: Arc<Inner>,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("active_jobs", &self.inner.jobs.len())
            .field("cfg", &self.inner.cfg)
            .finish()
    }
}

impl Coordinator {
    pub fn new(
        config: &VerificationConfig,
        store: Arc<VerificationStore>,
        collaborators: Collaborators,
    ) -> VerificationResult<Self> {
        config
            .validate()
            .map_err(|e| VerificationError::Config(e.to_string()))?;
        let parser = DocumentParser::new(&config.extract)
            .map_err(|e| VerificationError::Config(e.to_string()))?;
        let matcher = IdentityMatcher::new(config.matcher.clone())
            .map_err(|e| VerificationError::Config(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(Inner {
                store,
                ocr: collaborators.ocr,
                files: collaborators.files,
                users: collaborators.users,
                identity_provider: collaborators.identity_provider,
                parser,
                matcher,
                hashing: config.hashing.clone(),
                cfg: config.coordinator.clone(),
                jobs: DashMap::new(),
            }),
        })
    }

    pub fn store(&self) -> &Arc<VerificationStore> {
        &self.inner.store
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.cfg
    }

    /// Number of jobs currently tracked.
    pub fn active_jobs(&self) -> usize {
        self.inner.jobs.len()
    }

    pub fn is_job_running(&self, record_id: &str) -> bool {
        self.inner.jobs.contains_key(record_id)
    }

    /// Accepts a document and schedules its processing.
    ///
    /// Never waits for the job. When the user's active record is a retry
    /// still waiting for images, the images are attached to it instead of
    /// creating a new record.
    pub async fn submit(&self, request: SubmitRequest) -> VerificationResult<SubmitReceipt> {
        let user_id = request.user_id.clone();
        let result = self.submit_inner(request).await;
        match &result {
            Ok(receipt) => info!(
                user_id = %user_id,
                record_id = %receipt.record_id,
                "verification_submitted"
            ),
            Err(err) => warn!(
                user_id = %user_id,
                error = %err,
                code = err.code(),
                "verification_submit_failure"
            ),
        }
        if let Some(recorder) = metrics_recorder() {
            recorder.record_submission(match &result {
                Ok(_) => "accepted",
                Err(err) => err.code(),
            });
        }
        result
    }

    async fn submit_inner(&self, request: SubmitRequest) -> VerificationResult<SubmitReceipt> {
        let document_type: DocumentType = request
            .document_type
            .parse()
            .map_err(VerificationError::Validation)?;
        let front = request
            .front_image
            .as_ref()
            .ok_or_else(|| VerificationError::Validation("front_image is required".into()))?;
        self.check_image(front, "front_image")?;
        if let Some(back) = &request.back_image {
            self.check_image(back, "back_image")?;
        }

        let store = &self.inner.store;
        let user_id = request.user_id.as_str();
        let records = store.records_for_user(user_id)?;
        if let Some(approved) = records.iter().find(|r| r.status == Approved) {
            return Err(already_verified(approved));
        }

        let waiting = match store.active_for_user(user_id)? {
            Some(active) if active.status == Pending && !active.has_images() => Some(active),
            Some(active) => {
                return Err(StoreError::ActiveRecordExists {
                    record_id: active.id,
                    status: active.status,
                }
                .into())
            }
            None => None,
        };
        if waiting.is_none() {
            self.check_daily_limit(&records, Utc::now())?;
        }

        let (front_path, back_path) = self
            .store_images(front, request.back_image.as_ref())
            .await?;
        let persisted = match waiting {
            Some(record) => {
                self.attach_images(&record.id, document_type, front_path.clone(), back_path.clone())
            }
            None => store.create_guarded(
                VerificationRecord::new(user_id, document_type)
                    .with_images(front_path.clone(), back_path.clone()),
                |records| self.check_admission(records, Utc::now()),
            ),
        };
        let record = match persisted {
            Ok(record) => record,
            Err(err) => {
                let paths: Vec<String> = std::iter::once(front_path).chain(back_path).collect();
                release_images(&self.inner, &paths).await;
                return Err(err);
            }
        };

        self.spawn_job(&record.id);
        Ok(SubmitReceipt {
            record_id: record.id,
            status: record.status,
            estimated_seconds: self.inner.cfg.estimated_seconds,
        })
    }

    pub(crate) fn check_image(&self, image: &ImageUpload, field: &str) -> VerificationResult<()> {
        if image.bytes.is_empty() {
            return Err(VerificationError::Validation(format!("{field} is empty")));
        }
        if image.bytes.len() > self.inner.cfg.max_image_bytes {
            return Err(VerificationError::ImageTooLarge {
                size: image.bytes.len(),
                limit: self.inner.cfg.max_image_bytes,
            });
        }
        if !image
            .content_type
            .trim()
            .to_ascii_lowercase()
            .starts_with(&self.inner.cfg.image_mime_prefix)
        {
            return Err(VerificationError::Validation(format!(
                "{field} must be an image, got {:?}",
                image.content_type
            )));
        }
        Ok(())
    }

    /// Limit on records created in the last 24 hours, over one user's records.
    pub(crate) fn check_daily_limit(
        &self,
        records: &[VerificationRecord],
        now: DateTime<Utc>,
    ) -> VerificationResult<()> {
        let since = now - chrono::Duration::hours(24);
        let recent = records.iter().filter(|r| r.created_at >= since).count();
        let limit = self.inner.cfg.max_attempts_per_day;
        if recent >= limit {
            return Err(VerificationError::TooManyAttempts(format!(
                "{recent} submissions in the last 24 hours, limit is {limit}"
            )));
        }
        Ok(())
    }

    /// Admission rules for a new record, run inside the store's write gate.
    pub(crate) fn check_admission(
        &self,
        records: &[VerificationRecord],
        now: DateTime<Utc>,
    ) -> VerificationResult<()> {
        if let Some(approved) = records.iter().find(|r| r.status == Approved) {
            return Err(already_verified(approved));
        }
        self.check_daily_limit(records, now)
    }

    pub(crate) async fn store_images(
        &self,
        front: &ImageUpload,
        back: Option<&ImageUpload>,
    ) -> VerificationResult<(String, Option<String>)> {
        let files = &self.inner.files;
        let front_path = files.save(&front.bytes, front.extension()).await?;
        let back_path = match back {
            Some(back) => match files.save(&back.bytes, back.extension()).await {
                Ok(path) => Some(path),
                Err(err) => {
                    release_images(&self.inner, &[front_path]).await;
                    return Err(err.into());
                }
            },
            None => None,
        };
        Ok((front_path, back_path))
    }

    fn attach_images(
        &self,
        record_id: &str,
        document_type: DocumentType,
        front: String,
        back: Option<String>,
    ) -> VerificationResult<VerificationRecord> {
        let mut attached = false;
        let record = self
            .inner
            .store
            .transition(record_id, &[Pending], |r| {
                if r.front_image.is_none() {
                    r.document_type = document_type;
                    r.front_image = Some(front);
                    r.back_image = back;
                    attached = true;
                }
            })
            .map_err(stale_as_conflict)?;
        if !attached {
            return Err(VerificationError::Conflict {
                message: "a verification is already pending".into(),
                existing_status: Some(record.status),
                record_id: Some(record.id),
            });
        }
        Ok(record)
    }

    /// Starts the processing job for `record_id` unless one is running.
    pub(crate) fn spawn_job(&self, record_id: &str) -> bool {
        match self.inner.jobs.entry(record_id.to_string()) {
            Entry::Occupied(_) => {
                debug!(record_id, "verification_job_already_running");
                false
            }
            Entry::Vacant(slot) => {
                let inner = Arc::clone(&self.inner);
                let id = record_id.to_string();
                let span = tracing::span!(Level::INFO, "verification.job", record_id = %id);
                let handle = tokio::spawn(
                    async move {
                        run_job(&inner, &id).await;
                        inner.jobs.remove(&id);
                    }
                    .instrument(span),
                );
                slot.insert(handle.abort_handle());
                true
            }
        }
    }

    /// The user's latest record as a read model. Never mutates state.
    pub fn status(&self, user_id: &str) -> VerificationResult<StatusView> {
        Ok(match self.inner.store.latest_for_user(user_id)? {
            Some(record) => StatusView::from_record(&record),
            None => StatusView::not_started(),
        })
    }

    /// One janitor pass against the current time.
    pub async fn sweep(&self) -> VerificationResult<SweepReport> {
        self.sweep_at(Utc::now()).await
    }

    /// One janitor pass treating `now` as the current time.
    ///
    /// Records in `pending` (with images) or `processing` untouched for
    /// longer than the liveness bound are rejected. With
    /// `review_expiry_hours` set, `pending_review` records and retries still
    /// waiting for images expire after that long.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> VerificationResult<SweepReport> {
        let inner = &self.inner;
        let mut report = SweepReport::default();

        let liveness_ms = inner.cfg.liveness_timeout_ms;
        let cutoff = now - chrono::Duration::milliseconds(liveness_ms as i64);
        for record in inner.store.stale(&[Pending, Processing], cutoff)? {
            if record.status == Pending && !record.has_images() {
                continue;
            }
            if let Some((_, job)) = inner.jobs.remove(&record.id) {
                job.abort();
            }
            let reason = format!(
                "processing did not finish within {} seconds",
                liveness_ms.div_ceil(1000)
            );
            if let Some(closed) =
                close_record(inner, &record.id, &[Pending, Processing], Rejected, reason, None)
                    .await?
            {
                report.timed_out.push(closed.id);
            }
        }

        if let Some(hours) = inner.cfg.review_expiry_hours {
            let cutoff = now - chrono::Duration::hours(hours as i64);
            for record in inner.store.stale(&[Pending, PendingReview], cutoff)? {
                if record.status == Pending && record.has_images() {
                    continue;
                }
                let reason = format!("no activity for {hours} hours");
                if let Some(closed) =
                    close_record(inner, &record.id, &[Pending, PendingReview], Expired, reason, None)
                        .await?
                {
                    report.expired.push(closed.id);
                }
            }
        }

        if !report.is_empty() {
            info!(
                timed_out = report.timed_out.len(),
                expired = report.expired.len(),
                "janitor_sweep"
            );
        }
        if let Some(recorder) = metrics_recorder() {
            recorder.record_sweep(report.timed_out.len(), report.expired.len());
        }
        Ok(report)
    }

    /// Runs [`sweep`](Self::sweep) every `janitor_interval_secs`.
    pub fn spawn_janitor(&self) -> JoinHandle<()> {
        let coordinator = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(coordinator.inner.cfg.janitor_interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(err) = coordinator.sweep().await {
                    warn!(error = %err, "janitor_failure");
                }
            }
        })
    }

    /// Approves a record without OCR. Test and staging builds only.
    #[cfg(any(test, feature = "forced-verification"))]
    pub async fn force_approve(&self, record_id: &str) -> VerificationResult<VerificationRecord> {
        if let Some((_, job)) = self.inner.jobs.remove(record_id) {
            job.abort();
        }
        let store = &self.inner.store;
        match store.transition(record_id, &[Pending], |r| r.status = Processing) {
            Ok(_) | Err(StoreError::StaleTransition { .. }) => {}
            Err(err) => return Err(err.into()),
        }
        let record = store
            .transition(record_id, &[Processing, PendingReview], |r| {
                r.status = Approved;
                r.verification_method = VerificationMethod::ForcedForTest;
                r.verified_at = Some(Utc::now());
            })
            .map_err(stale_as_conflict)?;
        warn!(record_id, user_id = %record.user_id, "verification_forced");
        mark_verified(&self.inner, &record.user_id).await;
        Ok(record)
    }
}

pub(crate) fn stale_as_conflict(err: StoreError) -> VerificationError {
    match err {
        StoreError::StaleTransition {
            record_id, actual, ..
        } => VerificationError::Conflict {
            message: format!("record is already {actual}"),
            existing_status: Some(actual),
            record_id: Some(record_id),
        },
        other => other.into(),
    }
}

async fn run_job(inner: &Inner, record_id: &str) {
    let start = Instant::now();
    let result = match tokio::time::timeout(inner.cfg.liveness(), process(inner, record_id)).await
    {
        Ok(result) => result,
        Err(_) => Err(VerificationError::Timeout(inner.cfg.liveness_timeout_ms)),
    };

    let finished = match result {
        Ok(Some(record)) => {
            info!(
                record_id,
                status = %record.status,
                similarity = record.similarity,
                elapsed_micros = start.elapsed().as_micros(),
                "verification_job_success"
            );
            Some(record)
        }
        Ok(None) => None,
        Err(err) => {
            warn!(
                record_id,
                error = %err,
                code = err.code(),
                elapsed_micros = start.elapsed().as_micros(),
                "verification_job_failure"
            );
            match close_record(
                inner,
                record_id,
                &[Pending, Processing],
                Rejected,
                rejection_reason(&err),
                None,
            )
            .await
            {
                Ok(closed) => closed,
                Err(close_err) => {
                    warn!(record_id, error = %close_err, "verification_reject_failure");
                    None
                }
            }
        }
    };

    if let (Some(record), Some(recorder)) = (finished, metrics_recorder()) {
        recorder.record_job(record.status, start.elapsed());
    }
}

fn already_verified(record: &VerificationRecord) -> VerificationError {
    VerificationError::Conflict {
        message: "identity is already verified".into(),
        existing_status: Some(Approved),
        record_id: Some(record.id.clone()),
    }
}

fn rejection_reason(err: &VerificationError) -> String {
    match err {
        VerificationError::ExtractionFailure(msg) | VerificationError::MatchFailure(msg) => {
            msg.clone()
        }
        VerificationError::Conflict { message, .. } => message.clone(),
        VerificationError::Timeout(ms) => {
            format!("processing did not finish within {} seconds", ms.div_ceil(1000))
        }
        other => format!("internal error: {other}"),
    }
}

/// The job body. `Ok(None)` means the record had already left `pending`.
async fn process(inner: &Inner, record_id: &str) -> VerificationResult<Option<VerificationRecord>> {
    let store = &inner.store;
    let record = match store.transition(record_id, &[Pending], |r| {
        r.status = Processing;
        r.attempts += 1;
    }) {
        Ok(record) => record,
        Err(StoreError::StaleTransition { actual, .. }) => {
            debug!(record_id, status = %actual, "verification_job_skipped");
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    };

    let front_path = record
        .front_image
        .clone()
        .ok_or_else(|| VerificationError::ExtractionFailure("no document image stored".into()))?;
    let front = recognize(inner, &front_path).await?;
    let back = match &record.back_image {
        Some(path) => match recognize(inner, path).await {
            Ok(back) => Some(back),
            Err(err) => {
                warn!(record_id, error = %err, "back_image_unreadable");
                None
            }
        },
        None => None,
    };
    let confidence = match &back {
        Some(back) => (front.confidence + back.confidence) / 2.0,
        None => front.confidence,
    };

    let parsed = inner
        .parser
        .parse(&front.text, back.as_ref().map(|b| b.text.as_str()))
        .map_err(|e| VerificationError::ExtractionFailure(e.to_string()))?;
    let number = inner
        .matcher
        .check_document_number(&parsed.document_number)
        .map_err(|e| VerificationError::ExtractionFailure(format!("invalid document number: {e}")))?;
    let hash = canonical::document_hash(&inner.hashing, &number)
        .map_err(|e| VerificationError::ExtractionFailure(e.to_string()))?;

    let extracted = ExtractedData {
        first_name: parsed.first_name.clone(),
        last_name: parsed.last_name.clone(),
        document_number: number.clone(),
        confidence,
    };
    let record = store.transition(record_id, &[Processing], |r| {
        r.document_number = Some(number.clone());
        r.document_hash = hash.clone();
        r.extracted_data = Some(extracted);
    })?;

    if let Some(owner) = store.approved_with_hash(&hash, Some(&record.user_id))? {
        warn!(record_id, owner_record_id = %owner.id, "duplicate_document");
        return Err(VerificationError::conflict(
            "this document is already registered to another account",
        ));
    }

    let registered = inner
        .users
        .name_fields(&record.user_id)
        .await
        .map_err(|e| VerificationError::MatchFailure(format!("registered name unavailable: {e}")))?;
    let outcome = inner.matcher.compare(
        &PersonName::new(parsed.first_name.as_str(), parsed.last_name.as_str()),
        &registered,
    );
    let score = outcome.score;
    let thresholds = inner.matcher.config();

    let (decision, method, review_reason) = match outcome.decision {
        Decision::Approve => match &inner.identity_provider {
            None => (Decision::Approve, VerificationMethod::AutomatedOcr, None),
            Some(provider) => {
                match provider
                    .check(&number, &parsed.first_name, &parsed.last_name)
                    .await
                {
                    Ok(true) => (Decision::Approve, VerificationMethod::ExternalApi, None),
                    Ok(false) => (
                        Decision::Review,
                        VerificationMethod::AutomatedOcr,
                        Some("external identity check did not confirm the document".to_string()),
                    ),
                    Err(err) => {
                        warn!(record_id, error = %err, "identity_provider_failure");
                        (
                            Decision::Review,
                            VerificationMethod::AutomatedOcr,
                            Some("external identity check unavailable".to_string()),
                        )
                    }
                }
            }
        },
        Decision::Review => (
            Decision::Review,
            VerificationMethod::AutomatedOcr,
            Some(format!(
                "name similarity {score:.2} is below the auto-approval threshold {:.2}",
                thresholds.auto_approve_threshold
            )),
        ),
        Decision::Reject => (Decision::Reject, VerificationMethod::AutomatedOcr, None),
    };

    match decision {
        Decision::Approve => {
            let approved = store.transition(record_id, &[Processing], |r| {
                r.status = Approved;
                r.similarity = Some(score);
                r.verification_method = method;
                r.verified_at = Some(Utc::now());
            })?;
            mark_verified(inner, &approved.user_id).await;
            Ok(Some(approved))
        }
        Decision::Review => {
            let review = store.transition(record_id, &[Processing], |r| {
                r.status = PendingReview;
                r.similarity = Some(score);
                r.verification_method = method;
                r.review_reason = review_reason;
            })?;
            Ok(Some(review))
        }
        Decision::Reject => {
            let reason = format!(
                "name on the document does not match the account (similarity {score:.2})"
            );
            close_record(inner, record_id, &[Processing], Rejected, reason, Some(score)).await
        }
    }
}

async fn recognize(inner: &Inner, path: &str) -> VerificationResult<OcrOutput> {
    let output = inner
        .ocr
        .recognize(Path::new(path))
        .await
        .map_err(|e| VerificationError::ExtractionFailure(format!("could not read the document: {e}")))?;
    if output.text.trim().is_empty() {
        return Err(VerificationError::ExtractionFailure(
            "no text could be read from the document".into(),
        ));
    }
    Ok(output)
}

/// Moves a record to `rejected` or `expired` and releases its images.
///
/// Returns `Ok(None)` when the record already left `expected`.
pub(crate) async fn close_record(
    inner: &Inner,
    record_id: &str,
    expected: &[VerificationStatus],
    target: VerificationStatus,
    reason: String,
    similarity: Option<f64>,
) -> VerificationResult<Option<VerificationRecord>> {
    let mut released = Vec::new();
    let closed = inner.store.transition(record_id, expected, |r| {
        released = r.image_paths();
        r.status = target;
        r.rejection_reason = Some(reason);
        if similarity.is_some() {
            r.similarity = similarity;
        }
        r.front_image = None;
        r.back_image = None;
    });
    match closed {
        Ok(record) => {
            release_images(inner, &released).await;
            Ok(Some(record))
        }
        Err(StoreError::StaleTransition { actual, .. }) => {
            debug!(record_id, status = %actual, "close_skipped");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

pub(crate) async fn release_images(inner: &Inner, paths: &[String]) {
    for path in paths {
        if let Err(err) = inner.files.delete(path).await {
            warn!(path = %path, error = %err, "image_cleanup_failure");
        }
    }
}

pub(crate) async fn mark_verified(inner: &Inner, user_id: &str) {
    if let Err(err) = inner.users.mark_verified(user_id).await {
        warn!(user_id, error = %err, "mark_verified_failure");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{CollaboratorError, InMemoryUserDirectory, LocalFileStorage};
    use async_trait::async_trait;

    struct NeverOcr;

    #[async_trait]
    impl OcrEngine for NeverOcr {
        async fn recognize(&self, _: &Path) -> Result<OcrOutput, CollaboratorError> {
            std::future::pending().await
        }
    }

    fn coordinator(dir: &Path) -> Coordinator {
        let mut config = VerificationConfig::default();
        config.uploads.dir = dir.to_path_buf();
        Coordinator::new(
            &config,
            Arc::new(VerificationStore::in_memory()),
            Collaborators {
                ocr: Arc::new(NeverOcr),
                files: Arc::new(LocalFileStorage::new(dir)),
                users: Arc::new(InMemoryUserDirectory::new()),
                identity_provider: None,
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn at_most_one_job_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let c = coordinator(dir.path());
        let receipt = c
            .submit(SubmitRequest {
                user_id: "u1".into(),
                document_type: "passport".into(),
                front_image: Some(ImageUpload::new(b"x".to_vec(), "image/png")),
                back_image: None,
            })
            .await
            .unwrap();

        assert!(c.is_job_running(&receipt.record_id));
        assert!(!c.spawn_job(&receipt.record_id));
        assert_eq!(c.active_jobs(), 1);
    }

    #[tokio::test]
    async fn forced_approval_from_pending() {
        let dir = tempfile::tempdir().unwrap();
        let c = coordinator(dir.path());
        let record = c
            .store()
            .create(VerificationRecord::new("u1", DocumentType::NationalId))
            .unwrap();

        let forced = c.force_approve(&record.id).await.unwrap();
        assert_eq!(forced.status, Approved);
        assert_eq!(forced.verification_method, VerificationMethod::ForcedForTest);
        assert!(c.force_approve(&record.id).await.is_err());
    }

    #[tokio::test]
    async fn admission_rules_hold_inside_the_store_gate() {
        let dir = tempfile::tempdir().unwrap();
        let c = coordinator(dir.path());
        let store = c.store();
        let admit = |user: &str| {
            store.create_guarded(
                VerificationRecord::new(user, DocumentType::NationalId),
                |records| c.check_admission(records, Utc::now()),
            )
        };

        for _ in 0..3 {
            let record = admit("u1").unwrap();
            store
                .transition(&record.id, &[Pending], |r| r.status = Rejected)
                .unwrap();
        }
        assert!(matches!(admit("u1"), Err(VerificationError::TooManyAttempts(_))));
        assert_eq!(store.records_for_user("u1").unwrap().len(), 3);

        let approved = admit("u2").unwrap();
        c.force_approve(&approved.id).await.unwrap();
        match admit("u2") {
            Err(VerificationError::Conflict {
                existing_status,
                record_id,
                ..
            }) => {
                assert_eq!(existing_status, Some(Approved));
                assert_eq!(record_id, Some(approved.id));
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn upload_extension_from_content_type() {
        assert_eq!(ImageUpload::new(vec![1], "image/jpeg").extension(), "jpg");
        assert_eq!(ImageUpload::new(vec![1], "image/png; q=1").extension(), "png");
        assert_eq!(ImageUpload::new(vec![1], "garbage").extension(), "bin");
    }

    #[test]
    fn job_errors_become_user_facing_reasons() {
        assert_eq!(
            rejection_reason(&VerificationError::ExtractionFailure("blurry".into())),
            "blurry"
        );
        assert_eq!(
            rejection_reason(&VerificationError::Timeout(300_000)),
            "processing did not finish within 300 seconds"
        );
        assert!(rejection_reason(&VerificationError::Storage("disk".into()))
            .starts_with("internal error"));
    }
}

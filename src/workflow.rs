//! Administrative review, user retries, audit history and purge.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use store::{Page, StoreError, VerificationMethod, VerificationRecord, VerificationStatus};
use tracing::{info, warn};

use crate::caller::Caller;
use crate::coordinator::{mark_verified, release_images, Coordinator, ImageUpload};
use crate::error::{VerificationError, VerificationResult};
use crate::views::{RecordSummary, ReviewItem, SubmitReceipt};

use VerificationStatus::{Approved, PendingReview, Rejected};

/// Largest page the review listing serves.
pub const MAX_PER_PAGE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

#[derive(Debug, Clone, Default)]
pub struct RetryRequest {
    pub user_id: String,
    pub front_image: Option<ImageUpload>,
    pub back_image: Option<ImageUpload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeReport {
    pub removed: usize,
    pub cutoff: DateTime<Utc>,
}

/// Human-driven operations on top of a [`Coordinator`].
#[derive(Debug, Clone)]
pub struct ReviewWorkflow {
    coordinator: Coordinator,
}

impl ReviewWorkflow {
    pub fn new(coordinator: Coordinator) -> Self {
        Self { coordinator }
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// `pending_review` records, oldest first, with their owner's display name.
    pub async fn list_pending_review(
        &self,
        caller: &Caller,
        page: usize,
        per_page: usize,
    ) -> VerificationResult<Page<ReviewItem>> {
        caller.require_admin()?;
        if page == 0 || per_page == 0 || per_page > MAX_PER_PAGE {
            return Err(VerificationError::Validation(format!(
                "page must be at least 1 and per_page between 1 and {MAX_PER_PAGE}"
            )));
        }

        let inner = &self.coordinator.inner;
        let listed = inner.store.list_by_status(PendingReview, page, per_page)?;
        let mut items = Vec::with_capacity(listed.items.len());
        for record in &listed.items {
            let display_name = match inner.users.profile(&record.user_id).await {
                Ok(profile) => profile.map(|p| p.display_name()),
                Err(err) => {
                    warn!(user_id = %record.user_id, error = %err, "display_name_lookup_failure");
                    None
                }
            };
            items.push(ReviewItem {
                display_name,
                record: RecordSummary::from(record),
            });
        }
        Ok(Page {
            items,
            page: listed.page,
            per_page: listed.per_page,
            total: listed.total,
        })
    }

    /// Resolves a `pending_review` record.
    pub async fn decide(
        &self,
        caller: &Caller,
        record_id: &str,
        decision: ReviewDecision,
        reason: Option<String>,
    ) -> VerificationResult<RecordSummary> {
        caller.require_admin()?;
        let inner = &self.coordinator.inner;
        let reviewer = caller.user_id.clone();
        let now = Utc::now();

        let record = match decision {
            ReviewDecision::Approve => {
                let record = inner
                    .store
                    .transition(record_id, &[PendingReview], |r| {
                        r.status = Approved;
                        r.verification_method = VerificationMethod::Manual;
                        r.reviewed_by = Some(reviewer);
                        r.reviewed_at = Some(now);
                        r.verified_at = Some(now);
                        if reason.is_some() {
                            r.review_reason = reason;
                        }
                    })
                    .map_err(|e| not_reviewable(record_id, e))?;
                mark_verified(inner, &record.user_id).await;
                record
            }
            ReviewDecision::Reject => {
                let mut released = Vec::new();
                let record = inner
                    .store
                    .transition(record_id, &[PendingReview], |r| {
                        released = r.image_paths();
                        r.status = Rejected;
                        r.verification_method = VerificationMethod::Manual;
                        r.reviewed_by = Some(reviewer);
                        r.reviewed_at = Some(now);
                        r.rejection_reason =
                            Some(reason.unwrap_or_else(|| "rejected by reviewer".to_string()));
                        r.front_image = None;
                        r.back_image = None;
                    })
                    .map_err(|e| not_reviewable(record_id, e))?;
                release_images(inner, &released).await;
                record
            }
        };

        info!(
            record_id,
            reviewer = %caller.user_id,
            status = %record.status,
            "review_decided"
        );
        Ok(RecordSummary::from(&record))
    }

    /// Starts a new attempt after a `rejected` or `expired` one.
    ///
    /// With images the new record is processed right away; without, it
    /// waits in `pending` until the next submit attaches them.
    pub async fn retry(&self, request: RetryRequest) -> VerificationResult<SubmitReceipt> {
        let coordinator = &self.coordinator;
        let store = &coordinator.inner.store;
        let user_id = request.user_id.as_str();

        let latest = store.latest_for_user(user_id)?.ok_or_else(|| {
            VerificationError::NotFound("no previous verification to retry".into())
        })?;
        if let Some(active) = store.active_for_user(user_id)? {
            return Err(StoreError::ActiveRecordExists {
                record_id: active.id,
                status: active.status,
            }
            .into());
        }
        if !latest.status.is_retryable() {
            return Err(VerificationError::Conflict {
                message: format!("latest verification is {}, retry is not allowed", latest.status),
                existing_status: Some(latest.status),
                record_id: Some(latest.id),
            });
        }

        let front = match (&request.front_image, &request.back_image) {
            (None, Some(_)) => {
                return Err(VerificationError::Validation(
                    "back_image requires front_image".into(),
                ))
            }
            (front, _) => front.as_ref(),
        };
        if let Some(front) = front {
            coordinator.check_image(front, "front_image")?;
        }
        if let Some(back) = &request.back_image {
            coordinator.check_image(back, "back_image")?;
        }
        let records = store.records_for_user(user_id)?;
        coordinator.check_daily_limit(&records, Utc::now())?;

        let stored = match front {
            Some(front) => Some(
                coordinator
                    .store_images(front, request.back_image.as_ref())
                    .await?,
            ),
            None => None,
        };

        let mut record = VerificationRecord::new(user_id, latest.document_type)
            .with_previous_attempt(latest.id.clone());
        if let Some((front_path, back_path)) = &stored {
            record = record.with_images(front_path.clone(), back_path.clone());
        }
        let created = store.create_guarded(record, |records| {
            match records.last() {
                Some(current) if current.id == latest.id => {}
                Some(current) => {
                    return Err(VerificationError::Conflict {
                        message: "a newer verification exists, retry is not allowed".into(),
                        existing_status: Some(current.status),
                        record_id: Some(current.id.clone()),
                    })
                }
                None => {
                    return Err(VerificationError::NotFound(
                        "no previous verification to retry".into(),
                    ))
                }
            }
            coordinator.check_admission(records, Utc::now())
        });
        let record = match created {
            Ok(record) => record,
            Err(err) => {
                if let Some((front_path, back_path)) = stored {
                    let paths: Vec<String> =
                        std::iter::once(front_path).chain(back_path).collect();
                    release_images(&coordinator.inner, &paths).await;
                }
                return Err(err);
            }
        };

        info!(
            user_id,
            record_id = %record.id,
            previous_attempt = %latest.id,
            with_images = record.has_images(),
            "verification_retry"
        );
        if record.has_images() {
            coordinator.spawn_job(&record.id);
        }
        Ok(SubmitReceipt {
            record_id: record.id,
            status: record.status,
            estimated_seconds: coordinator.inner.cfg.estimated_seconds,
        })
    }

    /// `record_id` and its predecessors, newest first.
    ///
    /// Stops at the first missing link, which happens once older attempts
    /// were purged.
    pub fn attempt_history(
        &self,
        caller: &Caller,
        record_id: &str,
    ) -> VerificationResult<Vec<RecordSummary>> {
        caller.require_admin()?;
        let store = &self.coordinator.inner.store;
        let mut current = store.get(record_id)?;
        if current.is_none() {
            return Err(VerificationError::NotFound(format!(
                "verification record {record_id}"
            )));
        }

        let mut seen = HashSet::new();
        let mut chain = Vec::new();
        while let Some(record) = current {
            if !seen.insert(record.id.clone()) {
                break;
            }
            current = match &record.previous_attempt {
                Some(previous) => store.get(previous)?,
                None => None,
            };
            chain.push(RecordSummary::from(&record));
        }
        Ok(chain)
    }

    /// Deletes `rejected`/`expired` records untouched for `older_than_days`.
    ///
    /// Approved records are kept: they back the duplicate-document check.
    pub async fn purge(
        &self,
        caller: &Caller,
        older_than_days: u32,
    ) -> VerificationResult<PurgeReport> {
        caller.require_admin()?;
        if older_than_days == 0 {
            return Err(VerificationError::Validation(
                "older_than_days must be at least 1".into(),
            ));
        }
        let inner = &self.coordinator.inner;
        let cutoff = Utc::now() - chrono::Duration::days(i64::from(older_than_days));
        let removed = inner.store.purge_terminal_before(cutoff)?;
        for record in &removed {
            release_images(inner, &record.image_paths()).await;
        }
        info!(
            removed = removed.len(),
            older_than_days,
            actor = %caller.user_id,
            "maintenance_purge"
        );
        Ok(PurgeReport {
            removed: removed.len(),
            cutoff,
        })
    }
}

fn not_reviewable(record_id: &str, err: StoreError) -> VerificationError {
    match err {
        StoreError::StaleTransition { .. } | StoreError::NotFound(_) => {
            VerificationError::NotFound(format!(
                "verification record {record_id} is not awaiting review"
            ))
        }
        other => other.into(),
    }
}

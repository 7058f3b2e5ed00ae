use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::backend::{BackendConfig, InMemoryBackend, StoreBackend};
use crate::model::{VerificationRecord, VerificationStatus};
use crate::StoreError;

const KEY_PREFIX: &str = "record:";

fn record_key(id: &str) -> String {
    format!("{KEY_PREFIX}{id}")
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number.
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
}

/// Verification records over a [`StoreBackend`].
///
/// Every write goes through a single gate so that the read-check-write of
/// [`create`](Self::create) and [`transition`](Self::transition) is atomic
/// with respect to every other write: the active-record invariant and the
/// approved-hash uniqueness hold without backend support for transactions.
pub struct VerificationStore {
    backend: Box<dyn StoreBackend>,
    write_gate: Mutex<()>,
}

impl VerificationStore {
    pub fn new(backend: Box<dyn StoreBackend>) -> Self {
        Self {
            backend,
            write_gate: Mutex::new(()),
        }
    }

    pub fn open(cfg: &BackendConfig) -> Result<Self, StoreError> {
        Ok(Self::new(cfg.build()?))
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(InMemoryBackend::new()))
    }

    fn gate(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.write_gate
            .lock()
            .map_err(|_| StoreError::backend("poisoned lock"))
    }

    fn encode(record: &VerificationRecord) -> Result<Vec<u8>, StoreError> {
        Ok(bincode::serde::encode_to_vec(
            record,
            bincode::config::standard(),
        )?)
    }

    fn decode(bytes: &[u8]) -> Result<VerificationRecord, StoreError> {
        let (record, _) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())?;
        Ok(record)
    }

    fn put(&self, record: &VerificationRecord) -> Result<(), StoreError> {
        self.backend.put(&record_key(&record.id), &Self::encode(record)?)
    }

    /// Load every record. Order is unspecified.
    pub fn all(&self) -> Result<Vec<VerificationRecord>, StoreError> {
        let mut records = Vec::new();
        self.backend.scan(&mut |bytes| {
            records.push(Self::decode(bytes)?);
            Ok(())
        })?;
        Ok(records)
    }

    fn filtered<F>(&self, mut keep: F) -> Result<Vec<VerificationRecord>, StoreError>
    where
        F: FnMut(&VerificationRecord) -> bool,
    {
        let mut records = Vec::new();
        self.backend.scan(&mut |bytes| {
            let record = Self::decode(bytes)?;
            if keep(&record) {
                records.push(record);
            }
            Ok(())
        })?;
        records.sort_by_key(|r| r.sequence);
        Ok(records)
    }

    pub fn get(&self, id: &str) -> Result<Option<VerificationRecord>, StoreError> {
        match self.backend.get(&record_key(id))? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Persist a new record.
    ///
    /// Fails with [`StoreError::ActiveRecordExists`] when the user already has
    /// an active record, [`StoreError::DuplicateHash`] when the hash is taken
    /// and [`StoreError::InvalidPreviousAttempt`] when the chain link is bad.
    /// The store assigns `sequence`.
    pub fn create(&self, record: VerificationRecord) -> Result<VerificationRecord, StoreError> {
        self.create_guarded(record, |_| Ok::<(), StoreError>(()))
    }

    /// [`create`](Self::create) with a caller-supplied admission rule.
    ///
    /// `guard` receives the user's existing records, oldest first, and runs
    /// under the same write gate right after the active-record check. An
    /// error from `guard` aborts the create.
    pub fn create_guarded<E, G>(
        &self,
        mut record: VerificationRecord,
        guard: G,
    ) -> Result<VerificationRecord, E>
    where
        E: From<StoreError>,
        G: FnOnce(&[VerificationRecord]) -> Result<(), E>,
    {
        let _gate = self.gate()?;
        let existing = self.all()?;

        if let Some(active) = existing
            .iter()
            .find(|r| r.user_id == record.user_id && r.status.is_active())
        {
            return Err(StoreError::ActiveRecordExists {
                record_id: active.id.clone(),
                status: active.status,
            }
            .into());
        }
        let mut mine: Vec<VerificationRecord> = existing
            .iter()
            .filter(|r| r.user_id == record.user_id)
            .cloned()
            .collect();
        mine.sort_by_key(|r| r.sequence);
        guard(&mine)?;

        if let Some(clash) = existing
            .iter()
            .find(|r| r.document_hash == record.document_hash)
        {
            return Err(StoreError::DuplicateHash {
                record_id: clash.id.clone(),
            }
            .into());
        }
        if let Some(previous) = &record.previous_attempt {
            if !mine.iter().any(|r| &r.id == previous) {
                return Err(StoreError::InvalidPreviousAttempt(previous.clone()).into());
            }
        }

        record.sequence = existing.iter().map(|r| r.sequence).max().unwrap_or(0) + 1;
        self.put(&record)?;
        debug!(record_id = %record.id, user_id = %record.user_id, status = %record.status, "record_created");
        Ok(record)
    }

    /// Compare-and-set update of one record.
    ///
    /// Applies `mutate` only if the stored status is one of `expected`. A
    /// status change must be a lifecycle edge; `document_number` is
    /// write-once; an `approved` result must not share its hash with another
    /// user's approved record. `updated_at` is stamped here.
    pub fn transition<F>(
        &self,
        id: &str,
        expected: &[VerificationStatus],
        mutate: F,
    ) -> Result<VerificationRecord, StoreError>
    where
        F: FnOnce(&mut VerificationRecord),
    {
        let _gate = self.gate()?;
        let current = self
            .get(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if !expected.contains(&current.status) {
            return Err(StoreError::StaleTransition {
                record_id: id.to_string(),
                expected: expected.to_vec(),
                actual: current.status,
            });
        }

        let mut next = current.clone();
        mutate(&mut next);

        if next.id != current.id || next.user_id != current.user_id || next.sequence != current.sequence
        {
            return Err(StoreError::WriteOnce("id"));
        }
        if current.document_number.is_some() && next.document_number != current.document_number {
            return Err(StoreError::WriteOnce("document_number"));
        }
        if next.status != current.status && !current.status.can_transition_to(next.status) {
            return Err(StoreError::IllegalTransition {
                from: current.status,
                to: next.status,
            });
        }
        if next.status == VerificationStatus::Approved {
            if let Some(owner) =
                self.approved_with_hash(&next.document_hash, Some(&next.user_id))?
            {
                return Err(StoreError::DuplicateHash {
                    record_id: owner.id,
                });
            }
        }

        next.updated_at = Utc::now();
        self.put(&next)?;
        debug!(
            record_id = %next.id,
            from = %current.status,
            to = %next.status,
            "record_transition"
        );
        Ok(next)
    }

    /// An approved record carrying `hash`, optionally ignoring one user.
    pub fn approved_with_hash(
        &self,
        hash: &str,
        excluding_user: Option<&str>,
    ) -> Result<Option<VerificationRecord>, StoreError> {
        let mut found = self.filtered(|r| {
            r.status == VerificationStatus::Approved
                && r.document_hash == hash
                && excluding_user.map_or(true, |user| r.user_id != user)
        })?;
        Ok(if found.is_empty() {
            None
        } else {
            Some(found.swap_remove(0))
        })
    }

    /// All records of one user, oldest first.
    pub fn records_for_user(&self, user_id: &str) -> Result<Vec<VerificationRecord>, StoreError> {
        self.filtered(|r| r.user_id == user_id)
    }

    /// The user's most recent record.
    pub fn latest_for_user(&self, user_id: &str) -> Result<Option<VerificationRecord>, StoreError> {
        Ok(self.records_for_user(user_id)?.pop())
    }

    /// The user's record in an active status, if any.
    pub fn active_for_user(&self, user_id: &str) -> Result<Option<VerificationRecord>, StoreError> {
        Ok(self
            .filtered(|r| r.user_id == user_id && r.status.is_active())?
            .pop())
    }

    /// Paginated records in `status`, oldest first. `page` is 1-based.
    pub fn list_by_status(
        &self,
        status: VerificationStatus,
        page: usize,
        per_page: usize,
    ) -> Result<Page<VerificationRecord>, StoreError> {
        let page = page.max(1);
        let per_page = per_page.max(1);
        let matching = self.filtered(|r| r.status == status)?;
        let total = matching.len();
        let items = matching
            .into_iter()
            .skip((page - 1).saturating_mul(per_page))
            .take(per_page)
            .collect();
        Ok(Page {
            items,
            page,
            per_page,
            total,
        })
    }

    /// Records in one of `statuses` whose `updated_at` is before `cutoff`.
    pub fn stale(
        &self,
        statuses: &[VerificationStatus],
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<VerificationRecord>, StoreError> {
        self.filtered(|r| statuses.contains(&r.status) && r.updated_at < cutoff)
    }

    /// Delete terminal records last updated before `cutoff` and return them.
    pub fn purge_terminal_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<VerificationRecord>, StoreError> {
        let _gate = self.gate()?;
        let doomed = self.filtered(|r| {
            matches!(
                r.status,
                VerificationStatus::Rejected | VerificationStatus::Expired
            ) && r.updated_at < cutoff
        })?;
        for record in &doomed {
            self.backend.delete(&record_key(&record.id))?;
        }
        self.backend.flush()?;
        Ok(doomed)
    }
}

//! # docverify store
//!
//! Record model, lifecycle rules and persistence for identity-verification
//! attempts.
//!
//! ## Core Features
//!
//! - **Pluggable Backends**: records live behind the [`StoreBackend`] trait.
//!   Out of the box:
//!   - an in-memory `HashMap` backend for tests and ephemeral deployments;
//!   - a Redb backend for persistent, on-disk storage (`backend-redb`
//!     feature, on by default).
//! - **Lifecycle rules**: [`VerificationStatus::can_transition_to`] encodes
//!   every legal edge; [`VerificationStore::transition`] refuses the rest.
//! - **Compare-and-set writes**: a transition names the statuses it expects
//!   and fails with [`StoreError::StaleTransition`] if the record moved on.
//! - **Invariants at the write gate**: at most one active record per user,
//!   approved document hashes unique across users, write-once document
//!   numbers, acyclic retry chains.
//!
//! Records are encoded with `bincode` (serde mode) before they reach the
//! backend.
//!
//! ## Example Usage
//!
//! ```
//! use store::{DocumentType, VerificationRecord, VerificationStatus, VerificationStore};
//!
//! let store = VerificationStore::in_memory();
//! let record = store
//!     .create(VerificationRecord::new("user-1", DocumentType::NationalId))
//!     .unwrap();
//! let record = store
//!     .transition(&record.id, &[VerificationStatus::Pending], |r| {
//!         r.status = VerificationStatus::Processing
//!     })
//!     .unwrap();
//! assert_eq!(record.status, VerificationStatus::Processing);
//! ```

mod backend;
mod error;
mod model;
mod state;
mod store;

pub use crate::backend::{BackendConfig, InMemoryBackend, StoreBackend};
#[cfg(feature = "backend-redb")]
pub use crate::backend::RedbBackend;
pub use crate::error::StoreError;
pub use crate::model::{
    DocumentType, ExtractedData, VerificationMethod, VerificationRecord, VerificationStatus,
};
pub use crate::store::{Page, VerificationStore};

//! # docverify matcher (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` decides whether the name printed on an identity document
//! belongs to the account that uploaded it. It is pure: no I/O, no clocks
//! in the result, same inputs give the same [`MatchOutcome`].
//!
//! ## Core Types
//!
//! - [`MatchConfig`]: field weights (0.6 surname / 0.4 given name), the
//!   approve / review thresholds (0.7 / 0.4) and the optional check-digit
//!   scheme.
//! - [`PersonName`]: given name + surname pair.
//! - [`MatchOutcome`]: per-field scores, combined score and [`Decision`].
//! - [`IdentityMatcher`]: validates the config once and runs comparisons.
//!
//! ## Scoring
//!
//! Each field is normalized (accents stripped, lowercase, letters only) and
//! compared with a multiset character-bigram Dice coefficient. The combined
//! score weights the surname higher; if only one field produced a non-zero
//! score, that score stands alone.
//!
//! ## Example Usage
//!
//! ```
//! use matcher::{Decision, IdentityMatcher, MatchConfig, PersonName};
//!
//! let matcher = IdentityMatcher::new(MatchConfig::default()).unwrap();
//! let outcome = matcher.compare(
//!     &PersonName::new("LUZ DEISY", "RAMOS OCHOA"),
//!     &PersonName::new("Luz Deisy", "Ramos Ochoa"),
//! );
//! assert_eq!(outcome.decision, Decision::Approve);
//! ```
//!
//! ## Observability
//!
//! Install a [`MatchMetrics`] implementation via [`set_match_metrics`] to
//! record every decision and its latency.

pub mod document_number;
pub mod engine;
pub mod metrics;
pub mod similarity;
pub mod types;

pub use crate::document_number::{validate_document_number, KNOWN_PLACEHOLDERS};
pub use crate::engine::IdentityMatcher;
pub use crate::metrics::{set_match_metrics, MatchMetrics};
pub use crate::similarity::bigram_similarity;
pub use crate::types::{
    CheckDigitScheme, Decision, DocumentNumberError, MatchConfig, MatchError, MatchOutcome,
    PersonName,
};

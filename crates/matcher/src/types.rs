use serde::{Deserialize, Serialize};
use thiserror::Error;

fn default_last_name_weight() -> f64 {
    0.6
}

fn default_first_name_weight() -> f64 {
    0.4
}

fn default_auto_approve() -> f64 {
    0.7
}

fn default_manual_review() -> f64 {
    0.4
}

/// Tuning knobs for [`IdentityMatcher`](crate::IdentityMatcher).
///
/// Scores at or above `auto_approve_threshold` approve, scores in
/// `[manual_review_threshold, auto_approve_threshold)` go to a human, and
/// everything below rejects.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MatchConfig {
    #[serde(default = "default_last_name_weight")]
    pub last_name_weight: f64,
    #[serde(default = "default_first_name_weight")]
    pub first_name_weight: f64,
    #[serde(default = "default_auto_approve")]
    pub auto_approve_threshold: f64,
    #[serde(default = "default_manual_review")]
    pub manual_review_threshold: f64,
    /// Check-digit scheme applied to document numbers. Off by default.
    #[serde(default)]
    pub check_digit: CheckDigitScheme,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            last_name_weight: default_last_name_weight(),
            first_name_weight: default_first_name_weight(),
            auto_approve_threshold: default_auto_approve(),
            manual_review_threshold: default_manual_review(),
            check_digit: CheckDigitScheme::default(),
        }
    }
}

impl MatchConfig {
    pub fn validate(&self) -> Result<(), MatchError> {
        let unit = 0.0..=1.0;
        if !unit.contains(&self.last_name_weight) || !unit.contains(&self.first_name_weight) {
            return Err(MatchError::InvalidConfig(
                "name weights must be between 0.0 and 1.0".into(),
            ));
        }
        if ((self.last_name_weight + self.first_name_weight) - 1.0).abs() > 1e-9 {
            return Err(MatchError::InvalidConfig(
                "last_name_weight + first_name_weight must equal 1.0".into(),
            ));
        }
        if !unit.contains(&self.manual_review_threshold) || !unit.contains(&self.auto_approve_threshold)
        {
            return Err(MatchError::InvalidConfig(
                "thresholds must be between 0.0 and 1.0".into(),
            ));
        }
        if self.manual_review_threshold > self.auto_approve_threshold {
            return Err(MatchError::InvalidConfig(
                "manual_review_threshold must not exceed auto_approve_threshold".into(),
            ));
        }
        Ok(())
    }

    /// Maps a combined score onto a decision band.
    pub fn decide(&self, score: f64) -> Decision {
        if score >= self.auto_approve_threshold {
            Decision::Approve
        } else if score >= self.manual_review_threshold {
            Decision::Review
        } else {
            Decision::Reject
        }
    }
}

/// Optional check-digit validation for document numbers.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CheckDigitScheme {
    #[default]
    None,
    /// Standard Luhn mod-10 over the whole digit run.
    Luhn,
}

/// A given-name / surname pair as registered or as extracted.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersonName {
    pub first_name: String,
    pub last_name: String,
}

impl PersonName {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}

/// Outcome band of a name comparison.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Review,
    Reject,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approve => "approve",
            Decision::Review => "review",
            Decision::Reject => "reject",
        }
    }
}

/// Per-field and combined similarity with the resulting decision.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MatchOutcome {
    pub first_name_score: f64,
    pub last_name_score: f64,
    pub score: f64,
    pub decision: Decision,
}

/// Why a document number failed format validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentNumberError {
    #[error("document number is empty")]
    Empty,
    #[error("document number must have 6 to 10 digits (got {0})")]
    InvalidLength(usize),
    #[error("document number repeats a single digit")]
    RepeatedDigits,
    #[error("document number is a known placeholder value")]
    KnownPlaceholder,
    #[error("document number check digit does not match")]
    CheckDigitMismatch,
}

/// Errors produced by the matching layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatchError {
    /// Invalid configuration.
    #[error("invalid match config: {0}")]
    InvalidConfig(String),
    /// The document number failed the format gate.
    #[error("invalid document number: {0}")]
    InvalidDocument(#[from] DocumentNumberError),
}

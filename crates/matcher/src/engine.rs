use std::time::Instant;

use tracing::debug;

use crate::document_number::validate_document_number;
use crate::metrics::metrics_recorder;
use crate::similarity::bigram_similarity;
use crate::types::{DocumentNumberError, MatchConfig, MatchError, MatchOutcome, PersonName};

#[cfg(test)]
mod tests;

/// Compares extracted identity fields with the registered account name.
#[derive(Clone, Debug)]
pub struct IdentityMatcher {
    cfg: MatchConfig,
}

impl IdentityMatcher {
    /// Construct a matcher after validating `cfg`.
    pub fn new(cfg: MatchConfig) -> Result<Self, MatchError> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Applies the document-number format gate and returns the bare digits.
    pub fn check_document_number(&self, number: &str) -> Result<String, DocumentNumberError> {
        validate_document_number(number, self.cfg.check_digit)
    }

    /// Scores `extracted` against `registered` and picks a decision band.
    ///
    /// Both fields scoring non-zero combine with the configured weights;
    /// when exactly one field scores non-zero it is used alone.
    pub fn compare(&self, extracted: &PersonName, registered: &PersonName) -> MatchOutcome {
        let start = Instant::now();
        let first_name_score = bigram_similarity(&extracted.first_name, &registered.first_name);
        let last_name_score = bigram_similarity(&extracted.last_name, &registered.last_name);

        let score = match (first_name_score > 0.0, last_name_score > 0.0) {
            (true, true) => {
                self.cfg.last_name_weight * last_name_score
                    + self.cfg.first_name_weight * first_name_score
            }
            (true, false) => first_name_score,
            (false, true) => last_name_score,
            (false, false) => 0.0,
        };
        let decision = self.cfg.decide(score);

        debug!(
            first_name_score,
            last_name_score,
            score,
            decision = decision.as_str(),
            "identity_compared"
        );
        if let Some(recorder) = metrics_recorder() {
            recorder.record_match(decision, score, start.elapsed());
        }

        MatchOutcome {
            first_name_score,
            last_name_score,
            score,
            decision,
        }
    }

    /// Format gate followed by the name comparison.
    pub fn evaluate(
        &self,
        document_number: &str,
        extracted: &PersonName,
        registered: &PersonName,
    ) -> Result<MatchOutcome, MatchError> {
        self.check_document_number(document_number)?;
        Ok(self.compare(extracted, registered))
    }
}

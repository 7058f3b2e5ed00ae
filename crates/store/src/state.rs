//! Lifecycle rules for verification records.
//!
//! ```text
//! pending ──> processing ──> approved
//!    │            ├────────> pending_review ──> approved | rejected (admin)
//!    │            └────────> rejected
//!    ├──> rejected (failure, timeout)
//!    └──> expired
//! pending_review ──> expired (janitor, when enabled)
//! ```
//!
//! `approved` is terminal. `rejected` and `expired` are terminal for the
//! record but allow the user to retry with a new record.

use crate::model::VerificationStatus;

impl VerificationStatus {
    /// Statuses that block a new submission for the same user.
    pub const ACTIVE: [VerificationStatus; 3] = [
        VerificationStatus::Pending,
        VerificationStatus::Processing,
        VerificationStatus::PendingReview,
    ];

    /// Statuses a record never leaves.
    pub const TERMINAL: [VerificationStatus; 3] = [
        VerificationStatus::Approved,
        VerificationStatus::Rejected,
        VerificationStatus::Expired,
    ];

    pub fn is_active(self) -> bool {
        Self::ACTIVE.contains(&self)
    }

    pub fn is_terminal(self) -> bool {
        Self::TERMINAL.contains(&self)
    }

    /// The user may open a new attempt after a record ends here.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            VerificationStatus::Rejected | VerificationStatus::Expired
        )
    }

    /// Whether the lifecycle has an edge `self -> next`.
    pub fn can_transition_to(self, next: VerificationStatus) -> bool {
        use VerificationStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Pending, Rejected)
                | (Pending, Expired)
                | (Processing, Approved)
                | (Processing, PendingReview)
                | (Processing, Rejected)
                | (PendingReview, Approved)
                | (PendingReview, Rejected)
                | (PendingReview, Expired)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use VerificationStatus::*;

    const ALL: [VerificationStatus; 6] =
        [Pending, Processing, PendingReview, Approved, Rejected, Expired];

    #[test]
    fn terminal_statuses_have_no_exits() {
        for from in VerificationStatus::TERMINAL {
            for to in ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn active_and_terminal_partition_all_statuses() {
        for status in ALL {
            assert_ne!(status.is_active(), status.is_terminal(), "{status}");
        }
    }

    #[test]
    fn review_is_reachable_only_from_processing() {
        for from in ALL {
            assert_eq!(from.can_transition_to(PendingReview), from == Processing);
        }
    }

    #[test]
    fn approved_is_not_retryable() {
        assert!(!Approved.is_retryable());
        assert!(Rejected.is_retryable());
        assert!(Expired.is_retryable());
    }
}

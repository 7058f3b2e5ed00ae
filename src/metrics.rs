// Metrics hooks for the verification pipeline.
//
// Install a `VerificationMetrics` implementation via `set_verification_metrics`
// and the coordinator reports submissions, job outcomes and janitor sweeps.
use std::sync::{Arc, OnceLock, RwLock};
use std::time::Duration;

use store::VerificationStatus;

/// Metrics observer for the verification pipeline.
pub trait VerificationMetrics: Send + Sync {
    /// A submission was accepted (`"accepted"`) or refused (error code).
    fn record_submission(&self, outcome: &str);
    /// A deferred job finished with `status` after `latency`.
    fn record_job(&self, status: VerificationStatus, latency: Duration);
    /// A janitor pass rejected `timed_out` and expired `expired` records.
    fn record_sweep(&self, timed_out: usize, expired: usize);
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn VerificationMetrics>>> {
    static METRICS: OnceLock<RwLock<Option<Arc<dyn VerificationMetrics>>>> = OnceLock::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn VerificationMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

/// Install or clear the global verification metrics recorder.
pub fn set_verification_metrics(recorder: Option<Arc<dyn VerificationMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}

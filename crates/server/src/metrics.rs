//! Bridges pipeline observers to the `metrics` facade.

use std::sync::Arc;
use std::time::Duration;

use docverify::{set_verification_metrics, Decision, VerificationMetrics, VerificationStatus};
use matcher::{set_match_metrics, MatchMetrics};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct PrometheusBridge;

impl VerificationMetrics for PrometheusBridge {
    fn record_submission(&self, outcome: &str) {
        counter!("docverify_submissions_total", "outcome" => outcome.to_string()).increment(1);
    }

    fn record_job(&self, status: VerificationStatus, latency: Duration) {
        counter!("docverify_jobs_total", "status" => status.as_str()).increment(1);
        histogram!("docverify_job_duration_seconds").record(latency.as_secs_f64());
    }

    fn record_sweep(&self, timed_out: usize, expired: usize) {
        counter!("docverify_janitor_timed_out_total").increment(timed_out as u64);
        counter!("docverify_janitor_expired_total").increment(expired as u64);
    }
}

impl MatchMetrics for PrometheusBridge {
    fn record_match(&self, decision: Decision, score: f64, latency: Duration) {
        counter!("docverify_match_decisions_total", "decision" => decision.as_str()).increment(1);
        histogram!("docverify_match_score").record(score);
        histogram!("docverify_match_duration_seconds").record(latency.as_secs_f64());
    }
}

/// Installs the Prometheus recorder and hooks the pipeline observers into it.
pub fn install() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    let bridge = Arc::new(PrometheusBridge);
    set_verification_metrics(Some(bridge.clone()));
    set_match_metrics(Some(bridge));
    Ok(handle)
}

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::{Harness, CEDULA_FRONT};
use docverify::{set_verification_metrics, VerificationMetrics, VerificationStatus};

#[derive(Default)]
struct Recorder {
    submissions: Mutex<Vec<String>>,
    jobs: Mutex<Vec<VerificationStatus>>,
    sweeps: Mutex<Vec<(usize, usize)>>,
}

impl VerificationMetrics for Recorder {
    fn record_submission(&self, outcome: &str) {
        self.submissions.lock().unwrap().push(outcome.to_string());
    }

    fn record_job(&self, status: VerificationStatus, _latency: Duration) {
        self.jobs.lock().unwrap().push(status);
    }

    fn record_sweep(&self, timed_out: usize, expired: usize) {
        self.sweeps.lock().unwrap().push((timed_out, expired));
    }
}

#[tokio::test]
async fn coordinator_reports_to_the_installed_recorder() {
    let recorder = Arc::new(Recorder::default());
    set_verification_metrics(Some(recorder.clone()));

    let h = Harness::new();
    h.register("u1", "Luz Deisy", "Ramos Ochoa");
    let receipt = h.submit("u1", CEDULA_FRONT).await.unwrap();
    h.settled(&receipt.record_id).await;
    assert!(h.submit("u1", CEDULA_FRONT).await.is_err());
    h.coordinator.sweep().await.unwrap();

    // The job reports after its final write; give it a moment.
    for _ in 0..100 {
        if !recorder.jobs.lock().unwrap().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    set_verification_metrics(None);

    assert_eq!(
        *recorder.submissions.lock().unwrap(),
        vec!["accepted".to_string(), "CONFLICT".to_string()]
    );
    assert_eq!(*recorder.jobs.lock().unwrap(), vec![VerificationStatus::Approved]);
    assert_eq!(*recorder.sweeps.lock().unwrap(), vec![(0, 0)]);
}

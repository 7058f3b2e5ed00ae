use super::*;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::metrics::{set_match_metrics, MatchMetrics};
use crate::types::{CheckDigitScheme, Decision};

fn matcher() -> IdentityMatcher {
    IdentityMatcher::new(MatchConfig::default()).expect("default config is valid")
}

#[test]
fn exact_match_approves() {
    let registered = PersonName::new("Luz Deisy", "Ramos Ochoa");
    let extracted = PersonName::new("LUZ DEISY", "RAMOS OCHOA");
    let outcome = matcher().compare(&extracted, &registered);
    assert_eq!(outcome.score, 1.0);
    assert_eq!(outcome.decision, Decision::Approve);
}

#[test]
fn weights_favour_last_name() {
    let registered = PersonName::new("Luz Deisy", "Ramos Ochoa");
    let extracted = PersonName::new("Maria", "Ramos Ochoa");
    let outcome = matcher().compare(&extracted, &registered);
    assert_eq!(outcome.last_name_score, 1.0);
    assert_eq!(outcome.first_name_score, 0.0);
    // Only one field scored, so it is used alone.
    assert_eq!(outcome.score, 1.0);

    let extracted = PersonName::new("Luz Daisy", "Ramos Ochoa");
    let outcome = matcher().compare(&extracted, &registered);
    let expected = 0.6 * 1.0 + 0.4 * outcome.first_name_score;
    assert!((outcome.score - expected).abs() < 1e-12);
    assert!(outcome.first_name_score > 0.0 && outcome.first_name_score < 1.0);
}

#[test]
fn empty_extraction_rejects() {
    let registered = PersonName::new("Luz Deisy", "Ramos Ochoa");
    let outcome = matcher().compare(&PersonName::default(), &registered);
    assert_eq!(outcome.score, 0.0);
    assert_eq!(outcome.decision, Decision::Reject);
}

#[test]
fn threshold_boundaries_are_inclusive_from_below() {
    let cfg = MatchConfig::default();
    assert_eq!(cfg.decide(0.7), Decision::Approve);
    assert_eq!(cfg.decide(0.7 - 1e-9), Decision::Review);
    assert_eq!(cfg.decide(0.5), Decision::Review);
    assert_eq!(cfg.decide(0.4), Decision::Review);
    assert_eq!(cfg.decide(0.4 - 1e-9), Decision::Reject);
    assert_eq!(cfg.decide(0.0), Decision::Reject);
}

#[test]
fn compare_is_deterministic() {
    let registered = PersonName::new("José María", "Gómez Peña");
    let extracted = PersonName::new("JOSE MARIA", "GOMEZ PENA");
    let m = matcher();
    let first = m.compare(&extracted, &registered);
    for _ in 0..10 {
        assert_eq!(m.compare(&extracted, &registered), first);
    }
    assert_eq!(first.decision, Decision::Approve);
}

#[test]
fn evaluate_applies_format_gate_first() {
    let name = PersonName::new("Luz Deisy", "Ramos Ochoa");
    let res = matcher().evaluate("0000000000", &name, &name);
    assert!(matches!(
        res,
        Err(MatchError::InvalidDocument(DocumentNumberError::RepeatedDigits))
    ));
    let ok = matcher()
        .evaluate("1041970336", &name, &name)
        .expect("valid number");
    assert_eq!(ok.decision, Decision::Approve);
}

#[test]
fn check_digit_scheme_is_configurable() {
    let m = IdentityMatcher::new(MatchConfig {
        check_digit: CheckDigitScheme::Luhn,
        ..MatchConfig::default()
    })
    .expect("valid config");
    assert!(m.check_document_number("1041970336").is_err());
    assert!(m.check_document_number("1041970334").is_ok());
}

#[test]
fn invalid_configs_are_rejected() {
    let bad_weights = MatchConfig {
        last_name_weight: 0.7,
        ..MatchConfig::default()
    };
    assert!(matches!(
        IdentityMatcher::new(bad_weights),
        Err(MatchError::InvalidConfig(_))
    ));

    let inverted = MatchConfig {
        manual_review_threshold: 0.8,
        ..MatchConfig::default()
    };
    assert!(matches!(
        IdentityMatcher::new(inverted),
        Err(MatchError::InvalidConfig(_))
    ));
}

#[test]
fn config_defaults_apply_when_deserializing() {
    let cfg: MatchConfig =
        serde_json::from_str(r#"{"auto_approve_threshold": 0.8}"#).expect("config parses");
    assert_eq!(cfg.auto_approve_threshold, 0.8);
    assert_eq!(cfg.manual_review_threshold, 0.4);
    assert_eq!(cfg.last_name_weight, 0.6);
    assert_eq!(cfg.check_digit, CheckDigitScheme::None);
}

#[derive(Default)]
struct RecordingMetrics {
    events: Mutex<Vec<(Decision, f64)>>,
}

impl MatchMetrics for RecordingMetrics {
    fn record_match(&self, decision: Decision, score: f64, _latency: Duration) {
        self.events
            .lock()
            .expect("metrics lock")
            .push((decision, score));
    }
}

#[test]
fn metrics_observer_sees_decisions() {
    let metrics = Arc::new(RecordingMetrics::default());
    set_match_metrics(Some(metrics.clone()));

    let name = PersonName::new("Luz Deisy", "Ramos Ochoa");
    matcher().compare(&name, &name);
    set_match_metrics(None);

    let events = metrics.events.lock().expect("metrics lock");
    assert!(events
        .iter()
        .any(|(decision, score)| *decision == Decision::Approve && *score == 1.0));
}

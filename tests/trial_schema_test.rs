//! Trial schema tests: records, values, queries, and selector aggregation.

use std::collections::BTreeMap;

use trialdb::trial::parse_timestamp;
use trialdb::{ArtifactKind, SelectorSet, TrialQuery, TrialRecord, Value};

fn at(timestamp: &str) -> chrono::DateTime<chrono::Utc> {
    parse_timestamp(timestamp).expect("test timestamp")
}

// =============================================================================
// TrialRecord Tests
// =============================================================================

#[test]
fn test_trial_record_creation() {
    let record = TrialRecord::new("vision", "augmentation", at("2024-05-01T10:00:00Z"));

    assert_eq!(record.id(), "");
    assert_eq!(record.project(), "vision");
    assert_eq!(record.experiment(), "augmentation");
    assert!(!record.is_success());
    assert!(record.datastreams().is_empty());
    assert!(record.plots().is_empty());
}

#[test]
fn test_trial_record_builder_with_parameters() {
    let record = TrialRecord::builder("vision", "augmentation", at("2024-05-01T10:00:00Z"))
        .parameter("lr", "0.01")
        .parameter("workers", 4_i64)
        .parameter("shuffle", true)
        .build();

    assert_eq!(record.parameters().len(), 3);
    assert_eq!(record.parameter("lr"), Some(&Value::from("0.01")));
    assert_eq!(record.parameter("workers"), Some(&Value::Number(4.0)));
    assert_eq!(record.parameter("shuffle"), Some(&Value::Bool(true)));
}

#[test]
fn test_trial_record_artifact_sets_are_disjoint() {
    let mut record = TrialRecord::new("p", "e", at("2024-05-01T10:00:00Z"));
    record.attach_artifact(ArtifactKind::Datastream, "loss");
    record.attach_artifact(ArtifactKind::Plot, "loss");

    assert_eq!(record.artifacts(ArtifactKind::Datastream).len(), 1);
    assert_eq!(record.artifacts(ArtifactKind::Plot).len(), 1);
    assert_eq!(ArtifactKind::Datastream.extension(), "csv");
    assert_eq!(ArtifactKind::Plot.extension(), "pdf");
}

#[test]
fn test_trial_record_serialization() {
    let mut record = TrialRecord::builder("p", "e", at("2024-05-01T10:00:00Z"))
        .parameter("lr", "0.01")
        .build();
    record.assign_id("t-000042");
    record.mark_success();
    record.attach_artifact(ArtifactKind::Datastream, "loss");

    let json = serde_json::to_string(&record).expect("serialization failed");
    let parsed: TrialRecord = serde_json::from_str(&json).expect("deserialization failed");

    assert_eq!(parsed, record);
    assert_eq!(parsed.id(), "t-000042");
    assert!(parsed.is_success());
}

// =============================================================================
// TrialQuery Tests
// =============================================================================

#[test]
fn test_query_merges_parameter_filters() {
    let record = TrialRecord::builder("p", "e", at("2024-05-01T10:00:00Z"))
        .parameter("lr", "0.01")
        .parameter("batch", "32")
        .build();

    let filters = BTreeMap::from([("lr".to_string(), Value::from("0.01"))]);
    let query = TrialQuery::new().project("p").parameters(filters);
    assert!(query.matches(&record));

    let query = query.parameter("batch", "64");
    assert!(!query.matches(&record));
}

#[test]
fn test_query_success_filter_is_separate_from_parameters() {
    // A free parameter literally named "success" never shadows the flag.
    let record = TrialRecord::builder("p", "e", at("2024-05-01T10:00:00Z"))
        .parameter("success", "yes")
        .build();

    assert!(!TrialQuery::new().success(true).matches(&record));
    assert!(TrialQuery::new()
        .parameter("success", "yes")
        .matches(&record));
}

// =============================================================================
// SelectorSet Tests
// =============================================================================

fn population() -> Vec<TrialRecord> {
    vec![
        TrialRecord::builder("p", "e", at("2024-05-01T10:00:00Z"))
            .parameter("lr", "0.1")
            .parameter("mode", "fast")
            .build(),
        TrialRecord::builder("p", "e", at("2024-05-02T10:00:00Z"))
            .parameter("lr", "0.01")
            .build(),
        TrialRecord::builder("p", "e", at("2024-05-03T10:00:00Z"))
            .parameter("lr", "0.10")
            .parameter("mode", "exact")
            .build(),
    ]
}

#[test]
fn test_selector_distinct_values_sorted() {
    let set = SelectorSet::from_trials(&population());

    assert_eq!(
        set.field_values("lr"),
        Some(&[Value::Number(0.01), Value::Number(0.1)][..])
    );
    assert_eq!(
        set.field_values("mode"),
        Some(&[Value::from("exact"), Value::from("fast")][..])
    );
}

#[test]
fn test_selector_trial_contributes_only_fields_it_has() {
    let set = SelectorSet::from_trials(&population());

    // Only two of the three trials carry "mode".
    assert_eq!(set.field_values("mode").unwrap().len(), 2);
    assert_eq!(set.field_values("lr").unwrap().len(), 2);
    assert!(set.field_values("batch").is_none());
}

#[test]
fn test_selector_label_overwrite_for_shared_numeric_key() {
    // "0.1" and "0.10" share the numeric key 0.1; the later spelling
    // wins the label.
    let set = SelectorSet::from_trials(&population());
    assert_eq!(set.labels()["lr"]["0.1"], "0.10");
}

//! Trial Record - one recorded run of an experiment

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::trial::Value;

/// Kind of artifact attached to a trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// CSV data stream recorded during the trial.
    Datastream,
    /// PDF plot rendered from the trial's data.
    Plot,
}

impl ArtifactKind {
    /// File extension used for this kind in the blob cache.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Datastream => "csv",
            Self::Plot => "pdf",
        }
    }
}

/// Trial Record represents one recorded run of an experiment.
///
/// Reserved fields (`id`, `project`, `experiment`, `timestamp`, `success`,
/// artifact sets) are struct fields; everything the client supplied beyond
/// them lives in `parameters`. A free parameter therefore can never collide
/// with a reserved field.
///
/// The identity is assigned by the record store on insert and is immutable
/// afterward. Free parameters are fixed at creation; later operations only
/// set `success` or append artifact names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrialRecord {
    #[serde(default)]
    id: String,
    project: String,
    experiment: String,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    success: bool,
    #[serde(default)]
    datastreams: BTreeSet<String>,
    #[serde(default)]
    plots: BTreeSet<String>,
    #[serde(default)]
    parameters: BTreeMap<String, Value>,
}

impl TrialRecord {
    /// Create a new trial record with no free parameters.
    ///
    /// The record starts with `success` unset, empty artifact sets, and no
    /// identity (the store assigns one on insert).
    #[must_use]
    pub fn new(
        project: impl Into<String>,
        experiment: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: String::new(),
            project: project.into(),
            experiment: experiment.into(),
            timestamp,
            success: false,
            datastreams: BTreeSet::new(),
            plots: BTreeSet::new(),
            parameters: BTreeMap::new(),
        }
    }

    /// Create a builder for constructing a trial record with free parameters.
    #[must_use]
    pub fn builder(
        project: impl Into<String>,
        experiment: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> TrialRecordBuilder {
        TrialRecordBuilder::new(project, experiment, timestamp)
    }

    /// Get the store-assigned identity. Empty until the record is inserted.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the owning project name.
    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Get the experiment name within the project.
    #[must_use]
    pub fn experiment(&self) -> &str {
        &self.experiment
    }

    /// Get the creation timestamp used for recency ordering.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Whether the trial has been marked successful.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.success
    }

    /// Get the CSV data-stream names attached to this trial.
    #[must_use]
    pub const fn datastreams(&self) -> &BTreeSet<String> {
        &self.datastreams
    }

    /// Get the PDF plot names attached to this trial.
    #[must_use]
    pub const fn plots(&self) -> &BTreeSet<String> {
        &self.plots
    }

    /// Get the artifact name set for the given kind.
    #[must_use]
    pub const fn artifacts(&self, kind: ArtifactKind) -> &BTreeSet<String> {
        match kind {
            ArtifactKind::Datastream => &self.datastreams,
            ArtifactKind::Plot => &self.plots,
        }
    }

    /// Get the free parameters describing the experimental conditions.
    #[must_use]
    pub const fn parameters(&self) -> &BTreeMap<String, Value> {
        &self.parameters
    }

    /// Get a single free parameter by name.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    /// Assign the store identity. Intended for `RecordStore`
    /// implementations; called exactly once, on insert.
    pub fn assign_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Mark the trial successful. Idempotent.
    pub fn mark_success(&mut self) {
        self.success = true;
    }

    /// Append an artifact name to the set for `kind`.
    ///
    /// Returns `true` if the name was newly added, `false` if it was
    /// already present (set semantics, no duplicates).
    pub fn attach_artifact(&mut self, kind: ArtifactKind, name: impl Into<String>) -> bool {
        match kind {
            ArtifactKind::Datastream => self.datastreams.insert(name.into()),
            ArtifactKind::Plot => self.plots.insert(name.into()),
        }
    }
}

/// Builder for `TrialRecord`.
#[derive(Debug)]
pub struct TrialRecordBuilder {
    project: String,
    experiment: String,
    timestamp: DateTime<Utc>,
    parameters: BTreeMap<String, Value>,
}

impl TrialRecordBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(
        project: impl Into<String>,
        experiment: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            project: project.into(),
            experiment: experiment.into(),
            timestamp,
            parameters: BTreeMap::new(),
        }
    }

    /// Add a single free parameter.
    #[must_use]
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Add all free parameters from a map.
    #[must_use]
    pub fn parameters(mut self, parameters: BTreeMap<String, Value>) -> Self {
        self.parameters.extend(parameters);
        self
    }

    /// Build the `TrialRecord`.
    #[must_use]
    pub fn build(self) -> TrialRecord {
        let mut record = TrialRecord::new(self.project, self.experiment, self.timestamp);
        record.parameters = self.parameters;
        record
    }
}

/// Parse a client-supplied timestamp into a canonical UTC instant.
///
/// Accepts RFC 3339 (`2024-05-01T10:00:00Z`) and the common space or `T`
/// separated forms without an offset, which are taken as UTC.
///
/// # Errors
///
/// Returns `Error::Validation` if the string matches none of the accepted
/// formats.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(Error::Validation(format!("unparsable timestamp: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        parse_timestamp("2024-05-01T10:00:00Z").unwrap()
    }

    #[test]
    fn test_record_new_defaults() {
        let record = TrialRecord::new("vision", "augmentation", t0());
        assert_eq!(record.id(), "");
        assert!(!record.is_success());
        assert!(record.datastreams().is_empty());
        assert!(record.plots().is_empty());
        assert!(record.parameters().is_empty());
    }

    #[test]
    fn test_record_builder_parameters() {
        let record = TrialRecord::builder("vision", "augmentation", t0())
            .parameter("lr", "0.01")
            .parameter("batch", 32_i64)
            .build();
        assert_eq!(record.parameter("lr"), Some(&Value::from("0.01")));
        assert_eq!(record.parameter("batch"), Some(&Value::Number(32.0)));
    }

    #[test]
    fn test_attach_artifact_set_semantics() {
        let mut record = TrialRecord::new("p", "e", t0());
        assert!(record.attach_artifact(ArtifactKind::Datastream, "loss"));
        assert!(!record.attach_artifact(ArtifactKind::Datastream, "loss"));
        assert_eq!(record.datastreams().len(), 1);
        assert!(record.plots().is_empty());
    }

    #[test]
    fn test_mark_success_idempotent() {
        let mut record = TrialRecord::new("p", "e", t0());
        record.mark_success();
        record.mark_success();
        assert!(record.is_success());
    }

    #[test]
    fn test_record_serde_round_trip() {
        let mut record = TrialRecord::builder("p", "e", t0())
            .parameter("lr", "0.01")
            .build();
        record.assign_id("t-000001");
        record.attach_artifact(ArtifactKind::Plot, "curve");

        let json = serde_json::to_string(&record).expect("serialization failed");
        let parsed: TrialRecord = serde_json::from_str(&json).expect("deserialization failed");
        assert_eq!(record, parsed);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-05-01T10:00:00Z").is_ok());
        assert!(parse_timestamp("2024-05-01T10:00:00+02:00").is_ok());
        assert!(parse_timestamp("2024-05-01 10:00:00").is_ok());
        assert!(parse_timestamp("2024-05-01T10:00:00").is_ok());
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(Error::Validation(_))
        ));
    }
}

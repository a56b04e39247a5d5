//! Trial Repository - record CRUD and latest-match resolution
//!
//! Owns the trial lifecycle against a [`RecordStore`]: creation from a raw
//! client payload, the "latest successful trial for these parameters"
//! query, success marking, and artifact-manifest updates.
//!
//! ## Concurrency
//!
//! `mark_success` and `attach_artifact` are read-modify-write over the
//! whole record. Concurrent attaches to the *same* trial are last-writer-
//! wins on the artifact sets; operations on different trials rely only on
//! the store's per-document atomicity and never interfere.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use crate::artifact::validate_fragment;
use crate::error::{Error, Result};
use crate::store::{RecordStore, Sort, TrialQuery};
use crate::trial::record::parse_timestamp;
use crate::trial::{ArtifactKind, TrialRecord, Value};

/// Payload keys consumed into reserved record fields at creation.
const RESERVED_FIELDS: [&str; 3] = ["project", "experiment", "timestamp"];

/// Payload keys a client may never supply; they are owned by the core.
const INTERNAL_FIELDS: [&str; 4] = ["id", "success", "datastreams", "plots"];

/// Repository over trial records.
///
/// The store is an injected dependency; its lifecycle is owned by the
/// process entry point (see [`crate::Tracker`]).
#[derive(Debug)]
pub struct TrialRepository<S> {
    store: S,
}

impl<S: RecordStore> TrialRepository<S> {
    /// Create a repository over the given record store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Create a trial from a raw client payload and return its identity.
    ///
    /// The payload must be a JSON object with string fields `project`,
    /// `experiment`, and a parsable `timestamp`; every other key becomes a
    /// free parameter and must be a scalar. The new trial starts with
    /// `success` unset and empty artifact sets.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if the payload is not an object, a
    /// required field is missing or malformed, a free parameter is not a
    /// scalar, or a client key collides with an internal field.
    pub async fn create(&self, payload: &serde_json::Value) -> Result<String> {
        let fields = payload
            .as_object()
            .ok_or_else(|| Error::Validation("trial payload must be a JSON object".to_string()))?;

        let project = require_string(fields, "project")?;
        let experiment = require_string(fields, "experiment")?;
        let timestamp = parse_timestamp(&require_string(fields, "timestamp")?)?;

        let mut parameters = BTreeMap::new();
        for (name, value) in fields {
            if RESERVED_FIELDS.contains(&name.as_str()) {
                continue;
            }
            if INTERNAL_FIELDS.contains(&name.as_str()) {
                return Err(Error::Validation(format!(
                    "field {name} is reserved and cannot be supplied at creation"
                )));
            }
            let value = Value::from_json(value).ok_or_else(|| {
                Error::Validation(format!("parameter {name} must be a scalar value"))
            })?;
            parameters.insert(name.clone(), value);
        }

        let record = TrialRecord::builder(project, experiment, timestamp)
            .parameters(parameters)
            .build();
        let id = self.store.insert(record).await?;
        info!(%id, "trial created");
        Ok(id)
    }

    /// Fetch every trial matching `query`, in store order.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn find(&self, query: &TrialQuery) -> Result<Vec<TrialRecord>> {
        self.store.find(query, Sort::Unsorted, None).await
    }

    /// Fetch a trial by identity.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if the identity does not exist.
    pub async fn find_one(&self, id: &str) -> Result<TrialRecord> {
        self.store
            .find_one(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("trial {id}")))
    }

    /// Resolve the latest successful trial for the given parameters.
    ///
    /// Builds an exact-match query from `project`, `experiment`, and every
    /// entry of `extra_filters`, always restricted to successful trials
    /// (callers cannot override that filter: `success` is a reserved field,
    /// disjoint from free parameters). Results order newest first with a
    /// deterministic identity tie-break.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` on zero matches.
    pub async fn find_latest(
        &self,
        project: &str,
        experiment: &str,
        extra_filters: &BTreeMap<String, Value>,
    ) -> Result<TrialRecord> {
        let query = TrialQuery::new()
            .project(project)
            .experiment(experiment)
            .success(true)
            .parameters(extra_filters.clone());
        debug!(%project, %experiment, filters = extra_filters.len(), "resolving latest trial");

        let hits = self.store.find(&query, Sort::TimestampDesc, Some(1)).await?;
        hits.into_iter().next().ok_or_else(|| {
            Error::NotFound(format!(
                "no successful trial for {project}/{experiment} with the given parameters"
            ))
        })
    }

    /// Mark the trial successful. No-op if already marked.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if the identity does not exist.
    pub async fn mark_success(&self, id: &str) -> Result<()> {
        let mut record = self.find_one(id).await?;
        if record.is_success() {
            return Ok(());
        }
        record.mark_success();
        self.store.update(id, record).await?;
        info!(%id, "trial marked successful");
        Ok(())
    }

    /// Append an artifact name to the trial's manifest for `kind`.
    ///
    /// Set semantics: attaching the same name twice leaves the manifest
    /// unchanged, and the second call performs no store write.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` for unsafe artifact names (path
    /// traversal) and `Error::NotFound` for an unknown identity.
    pub async fn attach_artifact(&self, id: &str, kind: ArtifactKind, name: &str) -> Result<()> {
        validate_fragment(name)?;
        let mut record = self.find_one(id).await?;
        if record.attach_artifact(kind, name) {
            self.store.update(id, record).await?;
            debug!(%id, %name, kind = ?kind, "artifact attached");
        }
        Ok(())
    }

    /// Enumerate the distinct values of `field` across trials matching
    /// `query`.
    ///
    /// `field` is `"project"`, `"experiment"`, or a free-parameter name;
    /// parameter values are projected in display form. Trials without the
    /// field contribute nothing.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn list_distinct(
        &self,
        field: &str,
        query: &TrialQuery,
    ) -> Result<BTreeSet<String>> {
        let trials = self.store.find(query, Sort::Unsorted, None).await?;
        let mut values = BTreeSet::new();
        for trial in &trials {
            match field {
                "project" => {
                    values.insert(trial.project().to_string());
                }
                "experiment" => {
                    values.insert(trial.experiment().to_string());
                }
                name => {
                    if let Some(value) = trial.parameter(name) {
                        values.insert(value.to_string());
                    }
                }
            }
        }
        Ok(values)
    }
}

fn require_string(
    fields: &serde_json::Map<String, serde_json::Value>,
    name: &str,
) -> Result<String> {
    fields
        .get(name)
        .and_then(serde_json::Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| Error::Validation(format!("missing or non-string field: {name}")))
}

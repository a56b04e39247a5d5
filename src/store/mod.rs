//! Record Store boundary
//!
//! The core never talks to a concrete database. `RecordStore` is the
//! document-store seam: insert, update-by-id, and query-by-partial-match
//! with sort and limit. Query semantics are AND-of-equalities over the
//! fields present in the query; the core needs no range or regex operators.
//!
//! # Example
//!
//! ```rust,no_run
//! use trialdb::{MemoryRecordStore, RecordStore, Sort, TrialQuery, TrialRecord};
//! use trialdb::trial::parse_timestamp;
//!
//! # async fn example() -> trialdb::Result<()> {
//! let store = MemoryRecordStore::new();
//! let record = TrialRecord::new("vision", "augmentation", parse_timestamp("2024-05-01T10:00:00Z")?);
//! let id = store.insert(record).await?;
//!
//! let query = TrialQuery::new().project("vision");
//! let hits = store.find(&query, Sort::TimestampDesc, None).await?;
//! assert_eq!(hits[0].id(), id);
//! # Ok(())
//! # }
//! ```

mod memory;

pub use memory::MemoryRecordStore;

use std::collections::BTreeMap;
use std::future::Future;

use crate::error::Result;
use crate::trial::{TrialRecord, Value};

/// Sort order applied by a store query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sort {
    /// Store-native order; no guarantee.
    #[default]
    Unsorted,
    /// Newest first. Timestamp ties break deterministically by identity,
    /// descending.
    TimestampDesc,
}

/// Exact-match query over trial records.
///
/// Every field present in the query must equal the corresponding record
/// field; fields left unset match anything. Reserved fields and free
/// parameters are separate, so a caller-supplied parameter filter can
/// never shadow `success` or the other reserved fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrialQuery {
    project: Option<String>,
    experiment: Option<String>,
    success: Option<bool>,
    parameters: BTreeMap<String, Value>,
}

impl TrialQuery {
    /// Create an empty query that matches every trial.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require an exact project name.
    #[must_use]
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Require an exact experiment name.
    #[must_use]
    pub fn experiment(mut self, experiment: impl Into<String>) -> Self {
        self.experiment = Some(experiment.into());
        self
    }

    /// Require the success flag to equal `success`.
    #[must_use]
    pub const fn success(mut self, success: bool) -> Self {
        self.success = Some(success);
        self
    }

    /// Require a free parameter to equal `value` exactly.
    #[must_use]
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Require every free parameter in `parameters` to match exactly.
    #[must_use]
    pub fn parameters(mut self, parameters: BTreeMap<String, Value>) -> Self {
        self.parameters.extend(parameters);
        self
    }

    /// Whether `record` satisfies every equality in this query.
    #[must_use]
    pub fn matches(&self, record: &TrialRecord) -> bool {
        if let Some(project) = &self.project {
            if record.project() != project {
                return false;
            }
        }
        if let Some(experiment) = &self.experiment {
            if record.experiment() != experiment {
                return false;
            }
        }
        if let Some(success) = self.success {
            if record.is_success() != success {
                return false;
            }
        }
        self.parameters
            .iter()
            .all(|(name, value)| record.parameter(name) == Some(value))
    }
}

/// Document-store seam for trial records.
///
/// Implementations must provide per-document atomic insert and update;
/// that is the unit of mutation the repository relies on (see the
/// concurrency notes on [`crate::trial::TrialRepository`]).
pub trait RecordStore: Send + Sync {
    /// Insert a record, assign its identity, and return it.
    ///
    /// Identities are never reused.
    fn insert(&self, record: TrialRecord) -> impl Future<Output = Result<String>> + Send;

    /// Replace the record stored under `id`.
    ///
    /// Fails with `NotFound` if the identity does not exist.
    fn update(
        &self,
        id: &str,
        record: TrialRecord,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Query records by exact match, with optional sort and limit.
    fn find(
        &self,
        query: &TrialQuery,
        sort: Sort,
        limit: Option<usize>,
    ) -> impl Future<Output = Result<Vec<TrialRecord>>> + Send;

    /// Fetch a single record by identity.
    ///
    /// Returns `None` if the identity does not exist.
    fn find_one(&self, id: &str) -> impl Future<Output = Result<Option<TrialRecord>>> + Send;
}

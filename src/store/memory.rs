//! In-memory record store implementation using `DashMap`.
//!
//! This is the default backend - data is lost on process restart. The
//! shard-per-key design gives per-document atomic insert and update, which
//! is all the repository requires: concurrent operations on different
//! trials never observe each other's intermediate state.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use super::{RecordStore, Sort, TrialQuery};
use crate::error::{Error, Result};
use crate::trial::TrialRecord;

/// In-memory record store backed by a lock-free concurrent hashmap.
///
/// Identities are assigned from a monotonic counter (`t-000001`, ...);
/// they are never reused, even after process-lifetime churn.
pub struct MemoryRecordStore {
    records: DashMap<String, TrialRecord>,
    next_id: AtomicU64,
}

impl MemoryRecordStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            next_id: AtomicU64::new(0),
        }
    }

    /// Create with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: DashMap::with_capacity(capacity),
            next_id: AtomicU64::new(0),
        }
    }

    /// Get the number of stored trials.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for MemoryRecordStore {
    async fn insert(&self, mut record: TrialRecord) -> Result<String> {
        let seq = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let id = format!("t-{seq:06}");
        record.assign_id(&id);
        self.records.insert(id.clone(), record);
        Ok(id)
    }

    async fn update(&self, id: &str, record: TrialRecord) -> Result<()> {
        match self.records.get_mut(id) {
            Some(mut entry) => {
                *entry = record;
                Ok(())
            }
            None => Err(Error::NotFound(format!("trial {id}"))),
        }
    }

    async fn find(
        &self,
        query: &TrialQuery,
        sort: Sort,
        limit: Option<usize>,
    ) -> Result<Vec<TrialRecord>> {
        let mut hits: Vec<TrialRecord> = self
            .records
            .iter()
            .filter(|entry| query.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();

        if sort == Sort::TimestampDesc {
            // Identity is the deterministic tie-break for equal timestamps.
            hits.sort_by(|a, b| {
                b.timestamp()
                    .cmp(&a.timestamp())
                    .then_with(|| b.id().cmp(a.id()))
            });
        }
        if let Some(limit) = limit {
            hits.truncate(limit);
        }
        Ok(hits)
    }

    async fn find_one(&self, id: &str) -> Result<Option<TrialRecord>> {
        Ok(self.records.get(id).map(|entry| entry.value().clone()))
    }
}

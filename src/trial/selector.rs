//! Selector aggregation - distinct parameter values across a population
//!
//! Drives "refine by parameter value" filter UIs: for every free parameter
//! seen in a trial population, collect the distinct values, normalized so
//! that numeric-looking spellings (`"2"`, `"2.0"`, `2`) collapse to one
//! numeric key while the original spelling stays available as a label.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::trial::{TrialRecord, Value};

/// Normalized comparison key for a selector value.
///
/// Numbers order before text; text orders lexicographically. `total_cmp`
/// keeps the ordering total for every finite float.
#[derive(Debug, Clone)]
enum SelectorKey {
    Number(f64),
    Text(String),
}

impl SelectorKey {
    fn from_value(value: &Value) -> Self {
        value
            .numeric_key()
            .map_or_else(|| Self::Text(value.to_string()), Self::Number)
    }

    fn to_value(&self) -> Value {
        match self {
            Self::Number(n) => Value::Number(*n),
            Self::Text(s) => Value::Text(s.clone()),
        }
    }
}

impl PartialEq for SelectorKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SelectorKey {}

impl PartialOrd for SelectorKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SelectorKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
        }
    }
}

/// Distinct value sets per free parameter, with display labels.
///
/// Built from a trial population the caller fetched (typically via
/// [`crate::trial::TrialRepository::find`]). Fields are independent: a
/// trial contributes to every field it carries a value for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectorSet {
    values: BTreeMap<String, Vec<Value>>,
    labels: BTreeMap<String, BTreeMap<String, String>>,
}

impl SelectorSet {
    /// Aggregate selectors over a trial population.
    ///
    /// Known quirk: when two raw spellings share a numeric key (`"2"` and
    /// `"2.0"`), the later-seen spelling overwrites the earlier one's
    /// label.
    #[must_use]
    pub fn from_trials(trials: &[TrialRecord]) -> Self {
        let mut buckets: BTreeMap<String, BTreeMap<SelectorKey, String>> = BTreeMap::new();
        for trial in trials {
            for (field, value) in trial.parameters() {
                buckets
                    .entry(field.clone())
                    .or_default()
                    .insert(SelectorKey::from_value(value), value.to_string());
            }
        }

        let mut values = BTreeMap::new();
        let mut labels = BTreeMap::new();
        for (field, entries) in buckets {
            let mut sequence = Vec::with_capacity(entries.len());
            let mut field_labels = BTreeMap::new();
            for (key, raw) in entries {
                let normalized = key.to_value();
                field_labels.insert(normalized.to_string(), raw);
                sequence.push(normalized);
            }
            values.insert(field.clone(), sequence);
            labels.insert(field, field_labels);
        }
        Self { values, labels }
    }

    /// Distinct values per field, sorted ascending by normalized key
    /// (numbers first, then text).
    #[must_use]
    pub const fn values(&self) -> &BTreeMap<String, Vec<Value>> {
        &self.values
    }

    /// Display labels per field: normalized display form to the raw
    /// spelling that produced it.
    #[must_use]
    pub const fn labels(&self) -> &BTreeMap<String, BTreeMap<String, String>> {
        &self.labels
    }

    /// Distinct values for a single field, if any trial carried it.
    #[must_use]
    pub fn field_values(&self, field: &str) -> Option<&[Value]> {
        self.values.get(field).map(Vec::as_slice)
    }

    /// Check whether the population carried no free parameters at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

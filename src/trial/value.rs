//! Tagged scalar values for free trial parameters.
//!
//! Free parameters are open-ended: the same condition may arrive as
//! `"2"`, `2.0`, or `true` depending on the client. `Value` keeps the
//! original representation while exposing a normalized numeric key for
//! sorting and selector aggregation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A free-parameter value: string, number, or boolean.
///
/// Serialized untagged, so JSON scalars map directly
/// (`"fast"` / `0.01` / `true`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean flag.
    Bool(bool),
    /// Numeric value (all JSON numbers widen to `f64`).
    Number(f64),
    /// Free-form text; may be a numeric-looking string like `"2.0"`.
    Text(String),
}

impl Value {
    /// Normalized numeric key, if this value represents a finite number.
    ///
    /// `Number(2.0)` and `Text("2")` both yield `Some(2.0)`, which is
    /// what lets selector aggregation collapse equivalent spellings.
    #[must_use]
    pub fn numeric_key(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.is_finite().then_some(*n),
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite()),
            Self::Bool(_) => None,
        }
    }

    /// Convert a JSON scalar into a `Value`.
    ///
    /// Returns `None` for `null`, arrays, and objects — trial parameters
    /// are scalar by contract.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Number(n) => n.as_f64().map(Self::Number),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Value {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_key_number() {
        assert_eq!(Value::Number(2.5).numeric_key(), Some(2.5));
    }

    #[test]
    fn test_numeric_key_numeric_text() {
        assert_eq!(Value::from("2").numeric_key(), Some(2.0));
        assert_eq!(Value::from("2.0").numeric_key(), Some(2.0));
        assert_eq!(Value::from(" 10 ").numeric_key(), Some(10.0));
    }

    #[test]
    fn test_numeric_key_non_numeric() {
        assert_eq!(Value::from("fast").numeric_key(), None);
        assert_eq!(Value::Bool(true).numeric_key(), None);
        assert_eq!(Value::Number(f64::NAN).numeric_key(), None);
        assert_eq!(Value::from("NaN").numeric_key(), None);
    }

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(
            Value::from_json(&serde_json::json!("x")),
            Some(Value::from("x"))
        );
        assert_eq!(
            Value::from_json(&serde_json::json!(3)),
            Some(Value::Number(3.0))
        );
        assert_eq!(
            Value::from_json(&serde_json::json!(false)),
            Some(Value::Bool(false))
        );
    }

    #[test]
    fn test_from_json_rejects_compound() {
        assert_eq!(Value::from_json(&serde_json::json!(null)), None);
        assert_eq!(Value::from_json(&serde_json::json!([1, 2])), None);
        assert_eq!(Value::from_json(&serde_json::json!({"a": 1})), None);
    }

    #[test]
    fn test_display_keeps_original_text() {
        assert_eq!(Value::from("2.0").to_string(), "2.0");
        assert_eq!(Value::Number(2.0).to_string(), "2");
        assert_eq!(Value::Bool(true).to_string(), "true");
    }

    #[test]
    fn test_untagged_serde_round_trip() {
        let json = serde_json::json!({"a": "2.0", "b": 3.5, "c": true});
        let parsed: std::collections::BTreeMap<String, Value> =
            serde_json::from_value(json).expect("deserialization failed");
        assert_eq!(parsed["a"], Value::from("2.0"));
        assert_eq!(parsed["b"], Value::Number(3.5));
        assert_eq!(parsed["c"], Value::Bool(true));
    }
}

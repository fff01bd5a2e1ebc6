//! State tree values
//!
//! [`StateValue`] is a JSON-like tree whose containers are reference counted.
//! Cloning a value never deep-copies: a clone shares every container with the
//! original. This is what gives the store structural sharing, and what lets
//! subscribers detect changes by identity via [`StateValue::same`].

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Mapping container of the state tree
pub type StateMap = BTreeMap<String, StateValue>;

/// A node in the global state tree
#[derive(Debug, Clone, PartialEq, Default)]
pub enum StateValue {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Arc<Vec<StateValue>>),
    Object(Arc<StateMap>),
}

impl StateValue {
    /// An empty mapping, the initial global state
    pub fn empty_object() -> Self {
        StateValue::Object(Arc::new(StateMap::new()))
    }

    /// An empty sequence
    pub fn empty_array() -> Self {
        StateValue::Array(Arc::new(Vec::new()))
    }

    /// Build a mapping from key/value pairs
    pub fn object<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<StateValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        StateValue::Object(Arc::new(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }

    /// Build a sequence from values
    pub fn array<V, I>(items: I) -> Self
    where
        V: Into<StateValue>,
        I: IntoIterator<Item = V>,
    {
        StateValue::Array(Arc::new(items.into_iter().map(Into::into).collect()))
    }

    /// Identity comparison.
    ///
    /// Containers are the same only if they are the very same allocation.
    /// Scalars carry no identity and compare by value.
    pub fn same(a: &StateValue, b: &StateValue) -> bool {
        match (a, b) {
            (StateValue::Array(x), StateValue::Array(y)) => Arc::ptr_eq(x, y),
            (StateValue::Object(x), StateValue::Object(y)) => Arc::ptr_eq(x, y),
            (StateValue::Array(_), _) | (StateValue::Object(_), _) => false,
            (_, StateValue::Array(_)) | (_, StateValue::Object(_)) => false,
            _ => a == b,
        }
    }

    /// Identity comparison for possibly-absent values
    pub fn same_opt(a: Option<&StateValue>, b: Option<&StateValue>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => StateValue::same(a, b),
            _ => false,
        }
    }

    /// Short name of the variant, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            StateValue::Null => "null",
            StateValue::Bool(_) => "bool",
            StateValue::Number(_) => "number",
            StateValue::String(_) => "string",
            StateValue::Array(_) => "array",
            StateValue::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, StateValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StateValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            StateValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StateValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StateValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[StateValue]> {
        match self {
            StateValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&StateMap> {
        match self {
            StateValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Field lookup on a mapping; `None` for anything else
    pub fn get(&self, key: &str) -> Option<&StateValue> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Length of a sequence or mapping
    pub fn len(&self) -> Option<usize> {
        match self {
            StateValue::Array(items) => Some(items.len()),
            StateValue::Object(map) => Some(map.len()),
            _ => None,
        }
    }

    /// A new mapping with `key` set to `value`, sharing every other field.
    ///
    /// Anything that is not a mapping is treated as an empty one.
    pub fn with_field(&self, key: impl Into<String>, value: impl Into<StateValue>) -> StateValue {
        let mut map = self.as_object().cloned().unwrap_or_default();
        map.insert(key.into(), value.into());
        StateValue::Object(Arc::new(map))
    }

    /// A new sequence with `value` appended, sharing every existing element.
    ///
    /// Anything that is not a sequence is treated as an empty one.
    pub fn with_pushed(&self, value: impl Into<StateValue>) -> StateValue {
        let mut items = self.as_array().map(<[StateValue]>::to_vec).unwrap_or_default();
        items.push(value.into());
        StateValue::Array(Arc::new(items))
    }

    /// The textual form used by `[prop=value]` selectors.
    ///
    /// Null and containers have no textual form and never match a selector.
    pub fn stringify_scalar(&self) -> Option<String> {
        match self {
            StateValue::String(s) => Some(s.clone()),
            StateValue::Bool(b) => Some(b.to_string()),
            StateValue::Number(n) => Some(number_to_string(n)),
            StateValue::Null | StateValue::Array(_) | StateValue::Object(_) => None,
        }
    }

    /// Deep conversion back to plain JSON
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            StateValue::Null => serde_json::Value::Null,
            StateValue::Bool(b) => serde_json::Value::Bool(*b),
            StateValue::Number(n) => serde_json::Value::Number(n.clone()),
            StateValue::String(s) => serde_json::Value::String(s.clone()),
            StateValue::Array(items) => {
                serde_json::Value::Array(items.iter().map(StateValue::to_json).collect())
            }
            StateValue::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

/// Integral floats print without a fraction, like `1.0` -> `1`
fn number_to_string(n: &Number) -> String {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 {
                return format!("{}", f as i128);
            }
        }
    }
    n.to_string()
}

impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl From<serde_json::Value> for StateValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => StateValue::Null,
            serde_json::Value::Bool(b) => StateValue::Bool(b),
            serde_json::Value::Number(n) => StateValue::Number(n),
            serde_json::Value::String(s) => StateValue::String(s),
            serde_json::Value::Array(items) => {
                StateValue::Array(Arc::new(items.into_iter().map(Into::into).collect()))
            }
            serde_json::Value::Object(map) => StateValue::Object(Arc::new(
                map.into_iter().map(|(k, v)| (k, v.into())).collect(),
            )),
        }
    }
}

impl From<&serde_json::Value> for StateValue {
    fn from(value: &serde_json::Value) -> Self {
        StateValue::from(value.clone())
    }
}

impl From<bool> for StateValue {
    fn from(b: bool) -> Self {
        StateValue::Bool(b)
    }
}

impl From<i64> for StateValue {
    fn from(n: i64) -> Self {
        StateValue::Number(n.into())
    }
}

impl From<i32> for StateValue {
    fn from(n: i32) -> Self {
        StateValue::Number(n.into())
    }
}

impl From<u64> for StateValue {
    fn from(n: u64) -> Self {
        StateValue::Number(n.into())
    }
}

impl From<&str> for StateValue {
    fn from(s: &str) -> Self {
        StateValue::String(s.to_string())
    }
}

impl From<String> for StateValue {
    fn from(s: String) -> Self {
        StateValue::String(s)
    }
}

impl From<Vec<StateValue>> for StateValue {
    fn from(items: Vec<StateValue>) -> Self {
        StateValue::Array(Arc::new(items))
    }
}

impl From<StateMap> for StateValue {
    fn from(map: StateMap) -> Self {
        StateValue::Object(Arc::new(map))
    }
}

impl Serialize for StateValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StateValue::Null => serializer.serialize_unit(),
            StateValue::Bool(b) => serializer.serialize_bool(*b),
            StateValue::Number(n) => n.serialize(serializer),
            StateValue::String(s) => serializer.serialize_str(s),
            StateValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            StateValue::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map.iter() {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for StateValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(StateValue::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clone_shares_containers() {
        let value = StateValue::from(json!({"a": [1, 2], "b": {"c": true}}));
        let copy = value.clone();
        assert!(StateValue::same(&value, &copy));
        assert!(StateValue::same(
            value.get("a").unwrap(),
            copy.get("a").unwrap()
        ));
    }

    #[test]
    fn test_equal_but_distinct_containers_are_not_same() {
        let a = StateValue::from(json!({"x": 1}));
        let b = StateValue::from(json!({"x": 1}));
        assert_eq!(a, b);
        assert!(!StateValue::same(&a, &b));
    }

    #[test]
    fn test_scalars_compare_by_value() {
        assert!(StateValue::same(&StateValue::from(3), &StateValue::from(3)));
        assert!(StateValue::same(&StateValue::from("x"), &StateValue::from("x")));
        assert!(!StateValue::same(&StateValue::from(3), &StateValue::from("3")));
        assert!(StateValue::same_opt(None, None));
        assert!(!StateValue::same_opt(Some(&StateValue::Null), None));
    }

    #[test]
    fn test_with_field_shares_untouched_fields() {
        let pipeline = StateValue::from(json!({"name": "p1", "branches": ["main"], "propX": 1}));
        let updated = pipeline.with_field("propX", 2);

        assert!(!StateValue::same(&pipeline, &updated));
        assert_eq!(updated.get("propX").and_then(StateValue::as_i64), Some(2));
        assert!(StateValue::same(
            pipeline.get("branches").unwrap(),
            updated.get("branches").unwrap()
        ));
    }

    #[test]
    fn test_with_pushed() {
        let empty = StateValue::empty_array();
        let one = empty.with_pushed("a");
        assert_eq!(empty.len(), Some(0));
        assert_eq!(one.as_array().unwrap(), &[StateValue::from("a")]);
    }

    #[test]
    fn test_stringify_scalar() {
        assert_eq!(StateValue::from("John Doe").stringify_scalar().as_deref(), Some("John Doe"));
        assert_eq!(StateValue::from(40).stringify_scalar().as_deref(), Some("40"));
        assert_eq!(StateValue::from(json!(1.0)).stringify_scalar().as_deref(), Some("1"));
        assert_eq!(StateValue::from(json!(1.5)).stringify_scalar().as_deref(), Some("1.5"));
        assert_eq!(StateValue::from(false).stringify_scalar().as_deref(), Some("false"));
        assert_eq!(StateValue::Null.stringify_scalar(), None);
        assert_eq!(StateValue::empty_object().stringify_scalar(), None);
    }

    #[test]
    fn test_json_round_trip_through_serde() {
        let source = json!({"pipelines": [{"name": "p1", "weather": 80}], "user": null});
        let value: StateValue = serde_json::from_value(source.clone()).unwrap();
        assert_eq!(serde_json::to_value(&value).unwrap(), source);
        assert_eq!(value.to_json(), source);
    }
}

//! Runtime value model for expression evaluation.
//!
//! # Design
//!
//! - `Value` — the closed set of runtime values a scope can yield
//! - `Lookup` — result of a synchronous, non-fetching lookup; the
//!   `NotLoaded` sentinel is distinct from a present `Value::Null`
//! - `ScopeObject` — capability of object-valued (relationship) data:
//!   cached and fetching member access plus its own display string
//!
//! Object values render through their *own* display string rather than
//! generic formatting, which is what makes relationship-aware rendering
//! recursive (`{room}` renders the room's display format, which may
//! itself reference further relationships).

use crate::error::EvalResult;
use futures::future::BoxFuture;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Runtime value yielded by scope resolution.
#[derive(Clone)]
pub enum Value {
    /// Present but empty; renders as the empty string
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value
    Number(f64),
    /// Text value
    String(String),
    /// Ordered sequence (array-literal arguments)
    Array(Vec<Value>),
    /// Ordered key/value map (object-literal arguments)
    Map(IndexMap<String, Value>),
    /// Object-valued relationship data
    Object(Arc<dyn ScopeObject>),
}

/// Result of a synchronous, non-fetching member lookup.
///
/// `NotLoaded` means the dependency has not been resolved yet; it is
/// deliberately distinct from `Loaded(Value::Null)` so UIs can tell
/// "still loading" apart from "loaded and empty".
#[derive(Debug, Clone)]
pub enum Lookup {
    /// Value is resolved and available
    Loaded(Value),
    /// Dependency has not been fetched yet
    NotLoaded,
}

/// Capability contract of object-valued data reachable from a scope.
///
/// Implemented by host data objects (or adapters around them); the
/// evaluator only ever talks to this trait.
pub trait ScopeObject: Send + Sync {
    /// Type name of this object in the host schema.
    fn type_name(&self) -> &str;

    /// Best-effort display string from already-resolved data.
    ///
    /// Returns `Lookup::NotLoaded` when the display format depends on
    /// data that has not been fetched.
    fn display_cached(&self) -> Lookup;

    /// Display string, fetching missing dependencies as needed.
    fn display_future(&self) -> BoxFuture<'_, EvalResult<String>>;

    /// Member access from already-resolved data (never fetches).
    fn get_cached(&self, name: &str) -> Lookup;

    /// Member access, fetching the relationship if necessary.
    fn get_future<'a>(&'a self, name: &'a str) -> BoxFuture<'a, EvalResult<Value>>;
}

impl Value {
    /// True for `Value::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Converts a JSON value into a runtime value.
    ///
    /// JSON objects become `Value::Map`; there is no JSON counterpart
    /// for relationship objects.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                Value::Array(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(members) => Value::Map(
                members
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Converts this value to JSON.
    ///
    /// Relationship objects carry host state that JSON cannot express;
    /// they serialize as their type name.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(members) => serde_json::Value::Object(
                members
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Value::Object(object) => serde_json::Value::String(object.type_name().to_string()),
        }
    }
}

/// Integral numbers serialize as JSON integers so `from_json` /
/// `to_json` round-trips; everything else goes through `from_f64`
/// (`NaN`/infinity have no JSON form and become null).
fn number_to_json(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        return serde_json::Value::Number(serde_json::Number::from(n as i64));
    }
    serde_json::Number::from_f64(n)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Array(items) => f.debug_tuple("Array").field(items).finish(),
            Value::Map(members) => f.debug_tuple("Map").field(members).finish(),
            Value::Object(object) => write!(f, "Object(<{}>)", object.type_name()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            // Objects compare by identity: two handles are equal iff
            // they point at the same host object.
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip() {
        let json: serde_json::Value = serde_json::json!({
            "name": "Room 1",
            "floor": 3,
            "active": true,
            "tags": ["a", "b"],
            "note": null,
        });
        let value = Value::from_json(&json);
        assert_eq!(value.to_json(), json);
    }

    #[test]
    fn test_integral_numbers_serialize_as_integers() {
        assert_eq!(Value::Number(3.0).to_json(), serde_json::json!(3));
        assert_eq!(Value::Number(3.25).to_json(), serde_json::json!(3.25));
        assert_eq!(Value::Number(f64::NAN).to_json(), serde_json::Value::Null);
    }

    #[test]
    fn test_map_preserves_member_order() {
        let json: serde_json::Value = serde_json::json!({"b": 1, "a": 2});
        let Value::Map(members) = Value::from_json(&json) else {
            panic!("expected map");
        };
        let keys: Vec<&str> = members.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_null_is_distinct_from_not_loaded() {
        let loaded = Lookup::Loaded(Value::Null);
        assert!(matches!(loaded, Lookup::Loaded(Value::Null)));
        assert!(matches!(Lookup::NotLoaded, Lookup::NotLoaded));
    }
}

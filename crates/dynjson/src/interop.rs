//! Conversions between runtime values and `serde_json::Value`.
//!
//! Relies on `serde_json`'s `preserve_order` feature so object keys keep
//! their order in both directions.

use crate::error::Result;
use crate::serializer::stringify;
use crate::value::{ArrayRef, ObjectRef, Value};

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::from(s.as_str()),
            serde_json::Value::Array(items) => {
                Value::Array(ArrayRef::from_values(items.iter().map(Value::from)))
            }
            serde_json::Value::Object(map) => Value::Object(ObjectRef::from_entries(
                map.iter().map(|(key, value)| (key, Value::from(value))),
            )),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from(&json)
    }
}

/// Converts a runtime value to `serde_json`, applying the same omission and
/// cycle rules as [`stringify`]. `Ok(None)` when the value has no textual form.
pub fn to_serde(value: &Value) -> Result<Option<serde_json::Value>> {
    match stringify(value)? {
        Some(text) => Ok(Some(serde_json::from_str(&text)?)),
        None => Ok(None),
    }
}

//! YAML rendering of the live documents for the preview pane.

use crate::error::Result;
use serde_json::Value;

/// Copy of `value` with null-valued mapping entries removed at every depth.
///
/// Nulls inside sequences are kept so list positions stay stable.
pub fn strip_nulls(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(strip_nulls).collect()),
        other => other.clone(),
    }
}

/// YAML text for one document. An empty mapping renders as an empty string.
pub fn to_yaml(doc: &Value) -> Result<String> {
    let cleaned = strip_nulls(doc);
    if cleaned.as_object().is_some_and(|m| m.is_empty()) {
        return Ok(String::new());
    }
    Ok(serde_yaml::to_string(&cleaned)?)
}

//! Dot-separated path access into JSON documents.

use crate::error::{EditorError, Result};
use serde_json::{Map, Value};

/// Split a path into segments. The empty path addresses the document root.
fn segments(path: &str) -> Result<Vec<&str>> {
    if path.is_empty() {
        return Ok(Vec::new());
    }
    let parts: Vec<&str> = path.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(EditorError::InvalidPath(path.to_string()));
    }
    Ok(parts)
}

fn array_index(node: &Value, segment: &str) -> Option<usize> {
    match node {
        Value::Array(items) => segment.parse::<usize>().ok().filter(|i| *i < items.len()),
        _ => None,
    }
}

/// Step into `segment`, creating a mapping on the way if needed.
///
/// Existing array elements are addressed by index; any other non-mapping
/// node is replaced with an empty mapping.
fn child_or_create<'a>(node: &'a mut Value, segment: &str) -> &'a mut Value {
    if let Some(index) = array_index(node, segment) {
        return &mut node[index];
    }
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    &mut node[segment]
}

/// Read the value at `path`, or `None` if any segment is missing.
pub fn get_value<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let parts = segments(path).ok()?;
    let mut current = doc;
    for segment in parts {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Mutable counterpart of [`get_value`].
pub fn get_value_mut<'a>(doc: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    let parts = segments(path).ok()?;
    let mut current = doc;
    for segment in parts {
        current = match current {
            Value::Object(map) => map.get_mut(segment)?,
            Value::Array(items) => items.get_mut(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Assign `value` at `path`, creating intermediate mappings.
pub fn set_value(doc: &mut Value, path: &str, value: Value) -> Result<()> {
    let parts = segments(path)?;
    let mut current = doc;
    for segment in parts {
        current = child_or_create(current, segment);
    }
    *current = value;
    Ok(())
}

/// Remove the key at `path`. Returns the removed value if it existed.
pub fn delete_value(doc: &mut Value, path: &str) -> Result<Option<Value>> {
    let parts = segments(path)?;
    let Some((leaf, parents)) = parts.split_last() else {
        return Err(EditorError::InvalidPath(path.to_string()));
    };

    let mut current = doc;
    for segment in parents {
        let next = match current {
            Value::Object(map) => map.get_mut(*segment),
            Value::Array(items) => match segment.parse::<usize>() {
                Ok(i) => items.get_mut(i),
                Err(_) => None,
            },
            _ => None,
        };
        match next {
            Some(node) => current = node,
            None => return Ok(None),
        }
    }

    Ok(match current {
        Value::Object(map) => map.shift_remove(*leaf),
        Value::Array(items) => match leaf.parse::<usize>() {
            Ok(i) if i < items.len() => Some(items.remove(i)),
            _ => None,
        },
        _ => None,
    })
}

/// Read a string leaf, falling back to `default`.
pub fn get_str<'a>(doc: &'a Value, path: &str, default: &'a str) -> &'a str {
    get_value(doc, path).and_then(Value::as_str).unwrap_or(default)
}

/// Read an integer leaf, falling back to `default`.
pub fn get_i64(doc: &Value, path: &str, default: i64) -> i64 {
    get_value(doc, path).and_then(Value::as_i64).unwrap_or(default)
}

/// Read a boolean leaf, falling back to `default`.
pub fn get_bool(doc: &Value, path: &str, default: bool) -> bool {
    get_value(doc, path).and_then(Value::as_bool).unwrap_or(default)
}

//! Loosely-typed JSON documents and the helpers every section shares.

mod path;

pub use path::*;

use serde_json::{Map, Value};

/// Key holding the store-assigned identifier.
pub const ID_KEY: &str = "_id";

/// Legacy identifier key some records still carry.
pub const LEGACY_ID_KEY: &str = "id";

/// Fields owned by the store; client-supplied values are discarded on write.
pub const SERVER_FIELDS: [&str; 3] = [ID_KEY, "createdAt", "updatedAt"];

/// Stable identifier of a record: `_id`, falling back to `id`.
///
/// Numeric ids are rendered as strings so legacy temporary ids still match.
pub fn document_id(doc: &Value) -> Option<String> {
    [ID_KEY, LEGACY_ID_KEY]
        .iter()
        .filter_map(|key| doc.get(*key))
        .find_map(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

/// True when a value counts as "not filled in": missing, null, or a string
/// that is empty after trimming.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}

/// Drop store-owned fields from an incoming body.
pub fn strip_server_fields(doc: &mut Value) {
    if let Value::Object(map) = doc {
        for key in SERVER_FIELDS {
            map.remove(key);
        }
    }
}

/// Apply a JSON merge patch (RFC 7396) to `target`.
///
/// Object members merge recursively, `null` removes a member, anything else
/// replaces the target wholesale.
pub fn merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(patch_map) = patch else {
        *target = patch.clone();
        return;
    };

    if !target.is_object() {
        *target = Value::Object(Map::new());
    }

    if let Value::Object(target_map) = target {
        for (key, value) in patch_map {
            if value.is_null() {
                target_map.remove(key);
            } else {
                merge_patch(
                    target_map.entry(key.clone()).or_insert(Value::Null),
                    value,
                );
            }
        }
    }
}

/// All string leaves of a document, skipping store-owned fields.
pub fn string_leaves(doc: &Value) -> Vec<&str> {
    let mut out = Vec::new();
    collect_strings(doc, &mut out, true);
    out
}

fn collect_strings<'a>(value: &'a Value, out: &mut Vec<&'a str>, top: bool) {
    match value {
        Value::String(s) => out.push(s),
        Value::Array(items) => items.iter().for_each(|v| collect_strings(v, out, false)),
        Value::Object(map) => {
            for (key, v) in map {
                if top && SERVER_FIELDS.contains(&key.as_str()) {
                    continue;
                }
                collect_strings(v, out, false);
            }
        }
        _ => {}
    }
}

//! Dot-delimited path access into JSON documents.
//!
//! `"hsc.ssc_years"` walks object keys; a numeric segment such as the `0` in
//! `"events.0.title"` indexes into an existing array. Missing intermediate
//! objects are created on write, arrays are never grown implicitly.

use serde_json::{Map, Value};

/// Failure to address a location inside a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("path is empty")]
    Empty,
    #[error("path `{0}` contains an empty segment")]
    EmptySegment(String),
    #[error("segment `{segment}` of `{path}` descends into a non-container value")]
    NotAContainer { path: String, segment: String },
    #[error("index {index} of `{path}` is out of bounds (len {len})")]
    IndexOutOfBounds {
        path: String,
        index: usize,
        len: usize,
    },
    #[error("segment `{segment}` of `{path}` is not a valid array index")]
    InvalidIndex { path: String, segment: String },
}

fn segments(path: &str) -> Result<Vec<&str>, PathError> {
    if path.is_empty() {
        return Err(PathError::Empty);
    }
    let parts: Vec<&str> = path.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(PathError::EmptySegment(path.to_string()));
    }
    Ok(parts)
}

/// Look up the value at `path`, if every segment exists.
pub fn get_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
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

/// Return a copy of `doc` with `value` stored at `path`.
pub fn set_path(doc: &Value, path: &str, value: Value) -> Result<Value, PathError> {
    let mut updated = doc.clone();
    set_path_mut(&mut updated, path, value)?;
    Ok(updated)
}

/// Store `value` at `path` in place, creating missing intermediate objects.
///
/// A `null` encountered mid-path is replaced by an empty object, the same as
/// a missing key.
pub fn set_path_mut(doc: &mut Value, path: &str, value: Value) -> Result<(), PathError> {
    let parts = segments(path)?;
    let (leaf, parents) = parts.split_last().ok_or(PathError::Empty)?;

    if doc.is_null() {
        *doc = Value::Object(Map::new());
    }

    let mut current = doc;
    for segment in parents {
        current = descend_or_create(current, path, segment)?;
    }

    match current {
        Value::Object(map) => {
            map.insert((*leaf).to_string(), value);
            Ok(())
        }
        Value::Array(items) => {
            let index = parse_index(path, leaf)?;
            let len = items.len();
            let slot = items.get_mut(index).ok_or(PathError::IndexOutOfBounds {
                path: path.to_string(),
                index,
                len,
            })?;
            *slot = value;
            Ok(())
        }
        _ => Err(PathError::NotAContainer {
            path: path.to_string(),
            segment: (*leaf).to_string(),
        }),
    }
}

/// Remove and return the value at `path`. Array elements are spliced out.
pub fn remove_path(doc: &mut Value, path: &str) -> Option<Value> {
    let parts = segments(path).ok()?;
    let (leaf, parents) = parts.split_last()?;

    let mut current = doc;
    for segment in parents {
        current = match current {
            Value::Object(map) => map.get_mut(*segment)?,
            Value::Array(items) => items.get_mut(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    match current {
        Value::Object(map) => map.remove(*leaf),
        Value::Array(items) => {
            let index = leaf.parse::<usize>().ok()?;
            (index < items.len()).then(|| items.remove(index))
        }
        _ => None,
    }
}

fn descend_or_create<'a>(
    current: &'a mut Value,
    path: &str,
    segment: &str,
) -> Result<&'a mut Value, PathError> {
    match current {
        Value::Object(map) => {
            let child = map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if child.is_null() {
                *child = Value::Object(Map::new());
            }
            Ok(child)
        }
        Value::Array(items) => {
            let index = parse_index(path, segment)?;
            let len = items.len();
            items.get_mut(index).ok_or(PathError::IndexOutOfBounds {
                path: path.to_string(),
                index,
                len,
            })
        }
        _ => Err(PathError::NotAContainer {
            path: path.to_string(),
            segment: segment.to_string(),
        }),
    }
}

fn parse_index(path: &str, segment: &str) -> Result<usize, PathError> {
    segment.parse().map_err(|_| PathError::InvalidIndex {
        path: path.to_string(),
        segment: segment.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn admission_form() -> Value {
        json!({
            "name": "Rahim",
            "hsc": { "hsc_gpa": "5.00", "hsc_years": "2024" },
            "ssc": { "ssc_gpa": "4.80" },
            "events": [ { "title": "Orientation" }, { "title": "Exam" } ]
        })
    }

    #[test]
    fn test_set_then_get_returns_value_and_keeps_siblings() {
        let doc = admission_form();
        let updated = set_path(&doc, "hsc.ssc_years", json!("2022")).unwrap();

        assert_eq!(get_path(&updated, "hsc.ssc_years"), Some(&json!("2022")));
        assert_eq!(updated["hsc"]["hsc_gpa"], "5.00");
        assert_eq!(updated["hsc"]["hsc_years"], "2024");
        assert_eq!(updated["ssc"], doc["ssc"]);
        assert_eq!(updated["events"], doc["events"]);
        assert_eq!(updated["name"], doc["name"]);
        // the source document is untouched
        assert!(get_path(&doc, "hsc.ssc_years").is_none());
    }

    #[test]
    fn test_set_creates_missing_intermediates() {
        let doc = json!({ "name": "x" });
        let updated = set_path(&doc, "guardian.address.city", json!("Dhaka")).unwrap();
        assert_eq!(updated["guardian"]["address"]["city"], "Dhaka");
        assert_eq!(updated["name"], "x");

        let from_null = set_path(&json!({ "head": null }), "head.name", json!("Dr. Karim")).unwrap();
        assert_eq!(from_null["head"]["name"], "Dr. Karim");
    }

    #[test]
    fn test_array_index_segments() {
        let doc = admission_form();
        let updated = set_path(&doc, "events.1.title", json!("Final Exam")).unwrap();
        assert_eq!(updated["events"][0]["title"], "Orientation");
        assert_eq!(updated["events"][1]["title"], "Final Exam");

        let err = set_path(&doc, "events.5.title", json!("x")).unwrap_err();
        assert_eq!(
            err,
            PathError::IndexOutOfBounds {
                path: "events.5.title".to_string(),
                index: 5,
                len: 2
            }
        );
        assert!(matches!(
            set_path(&doc, "events.first", json!(1)),
            Err(PathError::InvalidIndex { .. })
        ));
    }

    #[test]
    fn test_invalid_paths() {
        let doc = admission_form();
        assert_eq!(set_path(&doc, "", json!(1)), Err(PathError::Empty));
        assert!(matches!(
            set_path(&doc, "hsc..gpa", json!(1)),
            Err(PathError::EmptySegment(_))
        ));
        assert!(matches!(
            set_path(&doc, "name.first", json!("R")),
            Err(PathError::NotAContainer { .. })
        ));
        assert!(get_path(&doc, "name.first").is_none());
    }

    #[test]
    fn test_remove_path() {
        let mut doc = admission_form();
        assert_eq!(remove_path(&mut doc, "hsc.hsc_gpa"), Some(json!("5.00")));
        assert!(get_path(&doc, "hsc.hsc_gpa").is_none());
        assert_eq!(doc["hsc"]["hsc_years"], "2024");

        assert_eq!(
            remove_path(&mut doc, "events.0"),
            Some(json!({ "title": "Orientation" }))
        );
        assert_eq!(doc["events"], json!([{ "title": "Exam" }]));
        assert!(remove_path(&mut doc, "missing.key").is_none());
    }
}

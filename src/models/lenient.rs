//! Field deserializers that read stored documents the way the validator
//! accepts them: text fields may hold numbers or be null.

use serde::de::{Deserializer, Error};
use serde::Deserialize;
use serde_json::Value;

fn text_of(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

pub(crate) fn string<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Value::deserialize(de).map(text_of)
}

fn list_of(value: Value) -> Result<Vec<String>, String> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items.into_iter().map(text_of).collect()),
        other => Err(format!("expected a list, found {other}")),
    }
}

pub(crate) fn string_list<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<String>, D::Error> {
    list_of(Value::deserialize(de)?).map_err(D::Error::custom)
}

pub(crate) fn string_rows<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<Vec<String>>, D::Error> {
    match Value::deserialize(de)? {
        Value::Null => Ok(Vec::new()),
        Value::Array(rows) => rows
            .into_iter()
            .map(|row| list_of(row).map_err(D::Error::custom))
            .collect(),
        other => Err(D::Error::custom(format!("expected a list of rows, found {other}"))),
    }
}

/// Non-negative integer from a number or numeric string; anything else is 0.
pub(crate) fn order<'de, D: Deserializer<'de>>(de: D) -> Result<u32, D::Error> {
    let n = match Value::deserialize(de)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(n.and_then(|n| u32::try_from(n).ok()).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "string")]
        label: String,
        #[serde(default, deserialize_with = "string_rows")]
        cells: Vec<Vec<String>>,
        #[serde(default, deserialize_with = "order")]
        order: u32,
    }

    #[test]
    fn test_numbers_and_nulls_read_as_text() {
        let row: Row = serde_json::from_value(json!({
            "label": 2026,
            "cells": [["Admission", 15000], [null, true]],
            "order": "3"
        }))
        .unwrap();
        assert_eq!(row.label, "2026");
        assert_eq!(row.cells, vec![vec!["Admission", "15000"], vec!["", "true"]]);
        assert_eq!(row.order, 3);

        let row: Row = serde_json::from_value(json!({ "label": null, "order": "soon" })).unwrap();
        assert_eq!(row.label, "");
        assert!(row.cells.is_empty());
        assert_eq!(row.order, 0);
    }

    #[test]
    fn test_non_list_rows_are_rejected() {
        assert!(serde_json::from_value::<Row>(json!({ "cells": "x" })).is_err());
        assert!(serde_json::from_value::<Row>(json!({ "cells": ["x"] })).is_err());
    }
}

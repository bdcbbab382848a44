//! Required-field rules and the report they produce.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{get_path, is_blank};

/// One constraint of a section's shape descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Value present and, if a string, not blank.
    Required(&'static str),
    /// Value is an array with at least one element.
    NonEmptyList(&'static str),
    /// Every element of the list at `list` has `field` filled in.
    EachRequired {
        list: &'static str,
        field: &'static str,
    },
    /// When present and non-blank, value is one of `allowed`. `*` in `path`
    /// stands for every element of a list.
    OneOf {
        path: &'static str,
        allowed: &'static [&'static str],
    },
    /// Every row of `rows` has exactly as many cells as `headers`.
    RowsMatchHeaders {
        headers: &'static str,
        rows: &'static str,
    },
}

/// Outcome of checking a document against its section's rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub field_errors: BTreeMap<String, String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.field_errors.is_empty()
    }

    pub fn add(&mut self, path: impl Into<String>, reason: impl Into<String>) {
        self.field_errors.entry(path.into()).or_insert_with(|| reason.into());
    }

    /// One-line summary listing the offending paths.
    pub fn summary(&self) -> String {
        let paths: Vec<&str> = self.field_errors.keys().map(String::as_str).collect();
        format!("Invalid or missing fields: {}", paths.join(", "))
    }
}

/// Check `doc` against every rule, collecting all failures.
pub fn check(rules: &[Rule], doc: &Value) -> ValidationReport {
    let mut report = ValidationReport::default();

    for rule in rules {
        match rule {
            Rule::Required(path) => {
                if is_blank(get_path(doc, path)) {
                    report.add(*path, "is required");
                }
            }
            Rule::NonEmptyList(path) => match get_path(doc, path) {
                Some(Value::Array(items)) if !items.is_empty() => {}
                _ => report.add(*path, "must contain at least one entry"),
            },
            Rule::EachRequired { list, field } => {
                if let Some(Value::Array(items)) = get_path(doc, list) {
                    for (i, item) in items.iter().enumerate() {
                        if is_blank(get_path(item, field)) {
                            report.add(format!("{list}.{i}.{field}"), "is required");
                        }
                    }
                }
            }
            Rule::OneOf { path, allowed } => check_one_of(doc, path, allowed, &mut report),
            Rule::RowsMatchHeaders { headers, rows } => {
                let width = match get_path(doc, headers) {
                    Some(Value::Array(h)) => h.len(),
                    _ => 0,
                };
                match get_path(doc, rows) {
                    None | Some(Value::Null) => {}
                    Some(Value::Array(rows_list)) => {
                        for (i, row) in rows_list.iter().enumerate() {
                            let cells = row.as_array().map(Vec::len);
                            if cells != Some(width) {
                                report.add(
                                    format!("{rows}.{i}"),
                                    format!("must have {width} cells"),
                                );
                            }
                        }
                    }
                    Some(_) => report.add(*rows, "must be a list of rows"),
                }
            }
        }
    }

    report
}

fn check_one_of(doc: &Value, path: &str, allowed: &[&str], report: &mut ValidationReport) {
    if let Some((list, field)) = path.split_once(".*.") {
        if let Some(Value::Array(items)) = get_path(doc, list) {
            for (i, item) in items.iter().enumerate() {
                let concrete = format!("{list}.{i}.{field}");
                check_value_in(get_path(item, field), &concrete, allowed, report);
            }
        }
        return;
    }
    check_value_in(get_path(doc, path), path, allowed, report);
}

fn check_value_in(value: Option<&Value>, path: &str, allowed: &[&str], report: &mut ValidationReport) {
    if is_blank(value) {
        return;
    }
    let ok = value
        .and_then(Value::as_str)
        .map(|s| allowed.contains(&s))
        .unwrap_or(false);
    if !ok {
        report.add(path, format!("must be one of: {}", allowed.join(", ")));
    }
}

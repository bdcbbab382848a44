//! In-memory list of homogeneous records, keyed by stable id.

use std::cmp::Ordering;

use serde_json::Value;

use super::ClientError;
use crate::document::{document_id, get_path, set_path_mut, ID_KEY};

/// Prefix of ids handed out before the server assigns a real one.
pub const TEMP_ID_PREFIX: &str = "tmp-";

pub fn is_temporary_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordList {
    records: Vec<Value>,
    next_temp: u64,
}

impl RecordList {
    pub fn new(records: Vec<Value>) -> Self {
        Self {
            records,
            next_temp: 1,
        }
    }

    pub fn records(&self) -> &[Value] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.position(id).map(|i| &self.records[i])
    }

    /// Append a copy of `template` under a fresh temporary id.
    pub fn add_from_template(&mut self, template: &Value) -> String {
        let mut record = template.clone();
        let id = self.next_temporary_id();
        if let Value::Object(map) = &mut record {
            map.insert(ID_KEY.to_string(), Value::String(id.clone()));
        }
        self.records.push(record);
        id
    }

    /// Append a record as-is.
    pub fn push(&mut self, record: Value) {
        self.records.push(record);
    }

    /// Set one field of the record `id`.
    pub fn update_field(&mut self, id: &str, path: &str, value: Value) -> Result<(), ClientError> {
        let index = self.position_or_err(id)?;
        set_path_mut(&mut self.records[index], path, value)?;
        Ok(())
    }

    /// Swap the record `id` for `record`. The new record may carry a different
    /// id, as when a temporary id is replaced by the server's.
    pub fn replace(&mut self, id: &str, record: Value) -> Result<(), ClientError> {
        let index = self.position_or_err(id)?;
        self.records[index] = record;
        Ok(())
    }

    /// Remove the record `id`, keeping every other record in place.
    pub fn remove(&mut self, id: &str) -> Option<Value> {
        self.position(id).map(|i| self.records.remove(i))
    }

    /// Records whose value at `path` equals `value` exactly.
    pub fn filter_by(&self, path: &str, value: &Value) -> Vec<&Value> {
        self.records
            .iter()
            .filter(|r| get_path(r, path) == Some(value))
            .collect()
    }

    /// Display ordering by the value at `path`; storage order is untouched.
    /// Records missing the field sort last.
    pub fn sorted_by(&self, path: &str) -> Vec<&Value> {
        let mut view: Vec<&Value> = self.records.iter().collect();
        view.sort_by(|a, b| compare_values(get_path(a, path), get_path(b, path)));
        view
    }

    /// Distinct values found at `path`, in first-seen order (filter tab labels).
    pub fn distinct(&self, path: &str) -> Vec<&Value> {
        let mut seen: Vec<&Value> = Vec::new();
        for value in self.records.iter().filter_map(|r| get_path(r, path)) {
            if !value.is_null() && !seen.contains(&value) {
                seen.push(value);
            }
        }
        seen
    }

    fn next_temporary_id(&mut self) -> String {
        self.next_temp = self.next_temp.max(1);
        loop {
            let id = format!("{}{}", TEMP_ID_PREFIX, self.next_temp);
            self.next_temp += 1;
            if self.position(&id).is_none() {
                return id;
            }
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|r| document_id(r).as_deref() == Some(id))
    }

    fn position_or_err(&self, id: &str) -> Result<usize, ClientError> {
        self.position(id)
            .ok_or_else(|| ClientError::UnknownRecord(id.to_string()))
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

//! Modal editing of one record through a private copy.

use serde_json::Value;

use crate::document::{document_id, get_path, set_path_mut, PathError};
use crate::schema::{Section, ValidationReport};

/// A record opened for editing. Changes stay in the draft until committed;
/// dropping or cancelling the session leaves the list untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    original: Option<Value>,
    draft: Value,
}

impl EditSession {
    /// Edit an existing record.
    pub fn open(record: &Value) -> Self {
        Self {
            original: Some(record.clone()),
            draft: record.clone(),
        }
    }

    /// Start a new record from a template.
    pub fn new_record(template: &Value) -> Self {
        Self {
            original: None,
            draft: template.clone(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.original.is_none()
    }

    /// Id of the record being edited; `None` for new records.
    pub fn record_id(&self) -> Option<String> {
        self.original.as_ref().and_then(document_id)
    }

    pub fn draft(&self) -> &Value {
        &self.draft
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        get_path(&self.draft, path)
    }

    pub fn set(&mut self, path: &str, value: Value) -> Result<(), PathError> {
        set_path_mut(&mut self.draft, path, value)
    }

    /// Whether the draft differs from what was opened.
    pub fn is_dirty(&self) -> bool {
        self.original.as_ref() != Some(&self.draft)
    }

    /// Discard the draft.
    pub fn cancel(self) {}

    /// Validate the draft against the section's rules and hand it back.
    pub fn commit(self, section: Section) -> Result<Value, ValidationReport> {
        let report = section.validate(&self.draft);
        if report.is_valid() {
            Ok(self.draft)
        } else {
            Err(report)
        }
    }
}

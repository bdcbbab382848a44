//! In-memory `DocumentApi` for editor tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{ClientError, DocumentApi, UploadFile};
use crate::document::{document_id, merge_patch, ID_KEY};
use crate::schema::{Section, Storage};

#[derive(Default)]
struct FakeState {
    collections: HashMap<Section, Vec<Value>>,
    singletons: HashMap<Section, Value>,
    failures: Vec<String>,
    fail_sections: Vec<Section>,
    calls: usize,
    next_id: u64,
}

#[derive(Default)]
pub(crate) struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    /// Store documents as if created earlier; ids are assigned here.
    pub fn seed(&self, section: Section, docs: Vec<Value>) {
        let mut state = self.state.lock().unwrap();
        for mut doc in docs {
            state.next_id += 1;
            let id = format!("seed-{}", state.next_id);
            doc[ID_KEY] = Value::String(id);
            state.collections.entry(section).or_default().push(doc);
        }
    }

    pub fn seed_singleton(&self, section: Section, doc: Value) {
        self.state.lock().unwrap().singletons.insert(section, doc);
    }

    /// Make the next request fail with `message`.
    pub fn fail_next(&self, message: &str) {
        self.state.lock().unwrap().failures.push(message.to_string());
    }

    /// Make every write to `section` fail.
    pub fn fail_section(&self, section: Section) {
        self.state.lock().unwrap().fail_sections.push(section);
    }

    pub fn stored(&self, section: Section) -> Vec<Value> {
        self.state
            .lock()
            .unwrap()
            .collections
            .get(&section)
            .cloned()
            .unwrap_or_default()
    }

    pub fn singleton(&self, section: Section) -> Value {
        self.state
            .lock()
            .unwrap()
            .singletons
            .get(&section)
            .cloned()
            .unwrap_or_else(|| Value::Object(Default::default()))
    }

    /// Number of requests received.
    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }

    fn begin(&self, section: Option<Section>) -> Result<std::sync::MutexGuard<'_, FakeState>, ClientError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        if !state.failures.is_empty() {
            let message = state.failures.remove(0);
            return Err(ClientError::Application {
                status: Some(500),
                message,
            });
        }
        if let Some(section) = section {
            if state.fail_sections.contains(&section) {
                return Err(ClientError::Application {
                    status: Some(500),
                    message: format!("{} is unavailable", section),
                });
            }
        }
        Ok(state)
    }
}

#[async_trait]
impl DocumentApi for FakeApi {
    async fn list(&self, section: Section) -> Result<Vec<Value>, ClientError> {
        let state = self.begin(None)?;
        Ok(state.collections.get(&section).cloned().unwrap_or_default())
    }

    async fn fetch(&self, section: Section) -> Result<Value, ClientError> {
        let state = self.begin(None)?;
        Ok(state
            .singletons
            .get(&section)
            .cloned()
            .unwrap_or_else(|| Value::Object(Default::default())))
    }

    async fn create(&self, section: Section, doc: &Value) -> Result<Value, ClientError> {
        let mut state = self.begin(Some(section))?;
        state.next_id += 1;
        let mut stored = doc.clone();
        stored[ID_KEY] = Value::String(format!("srv-{}", state.next_id));
        state.collections.entry(section).or_default().push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, section: Section, doc: &Value) -> Result<Value, ClientError> {
        let mut state = self.begin(Some(section))?;
        if section.storage() == Storage::Singleton {
            state.singletons.insert(section, doc.clone());
            return Ok(doc.clone());
        }
        let id = document_id(doc).ok_or_else(|| ClientError::Application {
            status: Some(400),
            message: "Body must include _id".to_string(),
        })?;
        let slot = state
            .collections
            .get_mut(&section)
            .and_then(|docs| docs.iter_mut().find(|d| document_id(d).as_deref() == Some(id.as_str())))
            .ok_or_else(|| ClientError::Application {
                status: Some(404),
                message: format!("{} document {} not found", section, id),
            })?;
        *slot = doc.clone();
        Ok(doc.clone())
    }

    async fn patch(&self, section: Section, patch: &Value) -> Result<Value, ClientError> {
        let mut state = self.begin(Some(section))?;
        let target = state
            .singletons
            .entry(section)
            .or_insert_with(|| Value::Object(Default::default()));
        merge_patch(target, patch);
        Ok(target.clone())
    }

    async fn delete(&self, section: Section, id: &str) -> Result<(), ClientError> {
        let mut state = self.begin(Some(section))?;
        let docs = state.collections.entry(section).or_default();
        let before = docs.len();
        docs.retain(|d| document_id(d).as_deref() != Some(id));
        if docs.len() == before {
            return Err(ClientError::Application {
                status: Some(404),
                message: format!("{} document {} not found", section, id),
            });
        }
        Ok(())
    }

    async fn upload(&self, folder: &str, file: UploadFile) -> Result<String, ClientError> {
        let _state = self.begin(None)?;
        Ok(format!("/uploads/{}/{}", folder, file.file_name))
    }
}

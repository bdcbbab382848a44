//! Per-item persistence for one section with optimistic local updates.

use serde_json::Value;

use super::{ClientError, DocumentApi, EditSession, RecordList, UploadFile};
use crate::document::ID_KEY;
use crate::schema::{Section, Storage};

fn expect_storage(section: Section, wanted: Storage) -> Result<(), ClientError> {
    match section.storage() {
        found if found == wanted => Ok(()),
        found => Err(ClientError::WrongStorage { section, found }),
    }
}

/// Owns the local copy of one section's records and keeps it in step with
/// the server, one request per change.
///
/// Each change is applied locally first. If the request fails the list is
/// restored to the snapshot taken just before the change.
pub struct SectionEditor<A> {
    api: A,
    section: Section,
    records: RecordList,
}

impl<A: DocumentApi> SectionEditor<A> {
    pub fn new(api: A, section: Section) -> Self {
        Self {
            api,
            section,
            records: RecordList::default(),
        }
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn records(&self) -> &RecordList {
        &self.records
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Replace the local list with the server's.
    pub async fn load(&mut self) -> Result<(), ClientError> {
        expect_storage(self.section, Storage::Collection)?;
        let docs = self.api.list(self.section).await?;
        self.records = RecordList::new(docs);
        Ok(())
    }

    /// Open a blank record built from the section template.
    pub fn begin_add(&self) -> EditSession {
        EditSession::new_record(&self.section.template())
    }

    /// Open a copy of an existing record.
    pub fn begin_edit(&self, id: &str) -> Result<EditSession, ClientError> {
        self.records
            .get(id)
            .map(EditSession::open)
            .ok_or_else(|| ClientError::UnknownRecord(id.to_string()))
    }

    /// Validate and create a record built outside a session.
    pub async fn create(&mut self, record: Value) -> Result<Value, ClientError> {
        let report = self.section.validate(&record);
        if !report.is_valid() {
            return Err(ClientError::Validation(report));
        }
        self.persist_create(record).await
    }

    /// Validate and persist a session. Returns the record as stored.
    pub async fn save(&mut self, session: EditSession) -> Result<Value, ClientError> {
        let existing_id = session.record_id();
        let draft = session.commit(self.section).map_err(ClientError::Validation)?;

        match existing_id {
            Some(id) if !super::is_temporary_id(&id) => self.persist_update(&id, draft).await,
            _ => self.persist_create(draft).await,
        }
    }

    /// Delete a record by id.
    pub async fn delete(&mut self, id: &str) -> Result<(), ClientError> {
        let snapshot = self.records.clone();
        self.records
            .remove(id)
            .ok_or_else(|| ClientError::UnknownRecord(id.to_string()))?;

        if let Err(e) = self.api.delete(self.section, id).await {
            tracing::warn!(section = %self.section, id = %id, "delete failed, rolling back: {}", e);
            self.records = snapshot;
            return Err(e);
        }
        Ok(())
    }

    /// Upload a file and put its URL into the session's `field`.
    ///
    /// Only the draft changes; the record is stored when the session is saved.
    pub async fn attach_upload(
        &self,
        session: &mut EditSession,
        field: &str,
        folder: &str,
        file: UploadFile,
    ) -> Result<String, ClientError> {
        let url = self.api.upload(folder, file).await?;
        session.set(field, Value::String(url.clone()))?;
        Ok(url)
    }

    async fn persist_create(&mut self, mut draft: Value) -> Result<Value, ClientError> {
        let snapshot = self.records.clone();
        if let Value::Object(map) = &mut draft {
            map.remove(ID_KEY);
        }
        let temp_id = self.records.add_from_template(&draft);

        match self.api.create(self.section, &draft).await {
            Ok(stored) => {
                self.records.replace(&temp_id, stored.clone())?;
                Ok(stored)
            }
            Err(e) => {
                tracing::warn!(section = %self.section, "create failed, rolling back: {}", e);
                self.records = snapshot;
                Err(e)
            }
        }
    }

    async fn persist_update(&mut self, id: &str, draft: Value) -> Result<Value, ClientError> {
        let snapshot = self.records.clone();
        self.records.replace(id, draft.clone())?;

        match self.api.update(self.section, &draft).await {
            Ok(stored) => {
                self.records.replace(id, stored.clone())?;
                Ok(stored)
            }
            Err(e) => {
                tracing::warn!(section = %self.section, id = %id, "update failed, rolling back: {}", e);
                self.records = snapshot;
                Err(e)
            }
        }
    }
}

/// Keeps the one document of a singleton section (site info, call to
/// action, admission settings) in step with the server.
///
/// Saving replaces the stored document. On failure the local copy goes back
/// to what it was before the save.
pub struct SingletonEditor<A> {
    api: A,
    section: Section,
    document: Value,
}

impl<A: DocumentApi> SingletonEditor<A> {
    pub fn new(api: A, section: Section) -> Self {
        Self {
            api,
            section,
            document: section.template(),
        }
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Replace the local document with the server's.
    pub async fn load(&mut self) -> Result<(), ClientError> {
        expect_storage(self.section, Storage::Singleton)?;
        self.document = self.api.fetch(self.section).await?;
        Ok(())
    }

    /// Open a copy of the document.
    pub fn begin_edit(&self) -> EditSession {
        EditSession::open(&self.document)
    }

    /// Validate and store a session. Returns the document as stored.
    pub async fn save(&mut self, session: EditSession) -> Result<Value, ClientError> {
        expect_storage(self.section, Storage::Singleton)?;
        let draft = session.commit(self.section).map_err(ClientError::Validation)?;
        let snapshot = std::mem::replace(&mut self.document, draft.clone());

        match self.api.update(self.section, &draft).await {
            Ok(stored) => {
                self.document = stored.clone();
                Ok(stored)
            }
            Err(e) => {
                tracing::warn!(section = %self.section, "save failed, rolling back: {}", e);
                self.document = snapshot;
                Err(e)
            }
        }
    }

    /// Upload a file and put its URL into the session's `field`.
    pub async fn attach_upload(
        &self,
        session: &mut EditSession,
        field: &str,
        folder: &str,
        file: UploadFile,
    ) -> Result<String, ClientError> {
        let url = self.api.upload(folder, file).await?;
        session.set(field, Value::String(url.clone()))?;
        Ok(url)
    }
}

//! Generic document editor driven by the dashboard.
//!
//! One implementation serves every section: a [`RecordList`] keyed by stable
//! id, an [`EditSession`] bound to a copy of one record, and a
//! [`SectionEditor`] that persists each change as its own request and rolls
//! back to the pre-change snapshot when the request fails. Singleton sections
//! get the same treatment from [`SingletonEditor`].

mod aggregate;
mod client;
mod list;
mod session;
mod sync;

#[cfg(test)]
pub(crate) mod fake;

pub use aggregate::*;
pub use client::*;
pub use list::*;
pub use session::*;
pub use sync::*;

use async_trait::async_trait;
use serde_json::Value;

use crate::document::PathError;
use crate::schema::{Section, Storage, ValidationReport};

/// Everything that can go wrong while editing or persisting a record.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never produced a response envelope.
    #[error("request failed: {0}")]
    Transport(String),
    /// The server answered with `success: false`.
    #[error("{message}")]
    Application { status: Option<u16>, message: String },
    /// Required fields missing. Raised locally before any request, or relayed
    /// from the server's field errors.
    #[error("{}", .0.summary())]
    Validation(ValidationReport),
    #[error("record {0} is not in the list")]
    UnknownRecord(String),
    /// The editor kind does not match how the section is stored.
    #[error("{section} is a {found:?} section")]
    WrongStorage { section: Section, found: Storage },
    #[error(transparent)]
    Path(#[from] PathError),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        tracing::warn!("Transport error: {}", err);
        ClientError::Transport(err.to_string())
    }
}

/// A file picked in a form, ready to send to the upload endpoint.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime: Option<String>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
            mime: None,
        }
    }
}

/// The REST surface as seen by an editor.
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// All documents of a collection section.
    async fn list(&self, section: Section) -> Result<Vec<Value>, ClientError>;
    /// The document of a singleton section.
    async fn fetch(&self, section: Section) -> Result<Value, ClientError>;
    /// Create a record; the answer carries the server-assigned `_id`.
    async fn create(&self, section: Section, doc: &Value) -> Result<Value, ClientError>;
    /// Replace the record named by the body's `_id`, or a singleton whole.
    async fn update(&self, section: Section, doc: &Value) -> Result<Value, ClientError>;
    /// Merge-patch a singleton.
    async fn patch(&self, section: Section, patch: &Value) -> Result<Value, ClientError>;
    async fn delete(&self, section: Section, id: &str) -> Result<(), ClientError>;
    /// Upload a file and return its public URL.
    async fn upload(&self, folder: &str, file: UploadFile) -> Result<String, ClientError>;
}

//! `DocumentApi` over HTTP with `reqwest`.

use async_trait::async_trait;
use reqwest::{multipart, RequestBuilder};
use serde_json::Value;

use super::{ClientError, DocumentApi, UploadFile};
use crate::auth::API_KEY_HEADER;
use crate::errors::codes;
use crate::models::ResponseEnvelope;
use crate::schema::{Section, ValidationReport};

/// HTTP client for the site's REST surface.
#[derive(Debug, Clone)]
pub struct CmsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl CmsClient {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    /// Send the dashboard key with every request.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    /// Send a request and unwrap the envelope, mapping failures onto
    /// [`ClientError`].
    async fn send(&self, request: RequestBuilder) -> Result<ResponseEnvelope, ClientError> {
        let request = match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        let envelope: ResponseEnvelope = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(_) => {
                // Non-envelope bodies come from the framework (e.g. malformed JSON rejections).
                return Err(ClientError::Application {
                    status: Some(status.as_u16()),
                    message: if text.is_empty() {
                        status.to_string()
                    } else {
                        text
                    },
                });
            }
        };

        if envelope.success {
            return Ok(envelope);
        }

        if let Some(error) = &envelope.error {
            if error.code == codes::VALIDATION_ERROR {
                if let Some(field_errors) = &error.field_errors {
                    return Err(ClientError::Validation(ValidationReport {
                        field_errors: field_errors.clone(),
                    }));
                }
            }
        }

        Err(ClientError::Application {
            status: Some(status.as_u16()),
            message: envelope.failure_message(),
        })
    }

    async fn send_for_data(&self, request: RequestBuilder) -> Result<Value, ClientError> {
        Ok(self.send(request).await?.data.unwrap_or(Value::Null))
    }

    /// Whether the configured key grants dashboard access.
    pub async fn check_auth(&self) -> Result<bool, ClientError> {
        let data = self.send_for_data(self.http.get(self.url("auth/check"))).await?;
        Ok(data["authenticated"].as_bool().unwrap_or(false))
    }

    /// Fetch one collection document by id.
    pub async fn get(&self, section: Section, id: &str) -> Result<Value, ClientError> {
        self.send_for_data(self.http.get(self.url(&format!("{}/{}", section.slug(), id))))
            .await
    }

    /// Site search; returns the raw result list.
    pub async fn search(&self, query: &str, section: Option<Section>) -> Result<Vec<Value>, ClientError> {
        let mut params = vec![("q", query.to_string())];
        if let Some(section) = section {
            params.push(("section", section.slug().to_string()));
        }
        let data = self
            .send_for_data(self.http.get(self.url("search")).query(&params))
            .await?;
        Ok(data["results"].as_array().cloned().unwrap_or_default())
    }
}

#[async_trait]
impl DocumentApi for CmsClient {
    async fn list(&self, section: Section) -> Result<Vec<Value>, ClientError> {
        match self.send_for_data(self.http.get(self.url(section.slug()))).await? {
            Value::Array(docs) => Ok(docs),
            other => Err(ClientError::Application {
                status: None,
                message: format!("{} returned {} instead of a list", section, kind_of(&other)),
            }),
        }
    }

    async fn fetch(&self, section: Section) -> Result<Value, ClientError> {
        self.send_for_data(self.http.get(self.url(section.slug()))).await
    }

    async fn create(&self, section: Section, doc: &Value) -> Result<Value, ClientError> {
        self.send_for_data(self.http.post(self.url(section.slug())).json(doc))
            .await
    }

    async fn update(&self, section: Section, doc: &Value) -> Result<Value, ClientError> {
        self.send_for_data(self.http.put(self.url(section.slug())).json(doc))
            .await
    }

    async fn patch(&self, section: Section, patch: &Value) -> Result<Value, ClientError> {
        self.send_for_data(self.http.patch(self.url(section.slug())).json(patch))
            .await
    }

    async fn delete(&self, section: Section, id: &str) -> Result<(), ClientError> {
        self.send(self.http.delete(self.url(section.slug())).query(&[("id", id)]))
            .await?;
        Ok(())
    }

    async fn upload(&self, folder: &str, file: UploadFile) -> Result<String, ClientError> {
        let mut part = multipart::Part::bytes(file.bytes).file_name(file.file_name);
        if let Some(mime) = &file.mime {
            part = part.mime_str(mime)?;
        }
        let form = multipart::Form::new()
            .text("folder", folder.to_string())
            .part("file", part);

        let envelope = self.send(self.http.post(self.url("upload")).multipart(form)).await?;
        envelope.url.ok_or_else(|| ClientError::Application {
            status: None,
            message: "upload response carried no url".to_string(),
        })
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

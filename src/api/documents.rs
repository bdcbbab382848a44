//! Generic section endpoints shared by every content area.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use super::{parse_section, success, ApiResponse, ApiResult};
use crate::document::document_id;
use crate::errors::AppError;
use crate::schema::{Section, Storage};
use crate::AppState;

/// `?id=` parameter of delete requests.
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

/// GET /api/{section} - List a collection or fetch a singleton.
pub async fn list_documents(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Value> {
    let section = parse_section(&slug)?;

    match section.storage() {
        Storage::Collection => success(Value::Array(state.repo.list(section).await?)),
        Storage::Singleton => success(state.repo.get_singleton(section).await?),
    }
}

/// GET /api/{section}/{id} - Get a single document.
pub async fn get_document(
    State(state): State<AppState>,
    Path((slug, id)): Path<(String, String)>,
) -> ApiResult<Value> {
    let section = collection(&slug)?;

    match state.repo.get(section, &id).await? {
        Some(doc) => success(doc),
        None => Err(AppError::NotFound(format!("{} document {} not found", section, id))),
    }
}

/// POST /api/{section} - Create a document (or replace a singleton).
pub async fn create_document(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Value> {
    let section = parse_section(&slug)?;
    validated(section, &body)?;

    if section.storage() == Storage::Singleton {
        let doc = state.repo.put_singleton(section, body).await?;
        return Ok(ApiResponse::new(doc).with_message("Saved"));
    }

    let doc = state.repo.create(section, body).await?;
    reindex(&state, section, &doc).await;
    tracing::info!(section = %section, "document created");
    Ok(ApiResponse::new(doc).with_message("Created"))
}

/// PUT /api/{section} - Replace a document identified by the body's `_id`.
pub async fn update_document(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Value> {
    let section = parse_section(&slug)?;
    validated(section, &body)?;

    if section.storage() == Storage::Singleton {
        let doc = state.repo.put_singleton(section, body).await?;
        return Ok(ApiResponse::new(doc).with_message("Saved"));
    }

    let id = body_id(&body)?;
    let doc = state.repo.replace(section, &id, body).await?;
    reindex(&state, section, &doc).await;
    Ok(ApiResponse::new(doc).with_message("Updated"))
}

/// PATCH /api/{section} - Merge-patch a singleton, or the document named by `_id`.
pub async fn patch_document(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(patch): Json<Value>,
) -> ApiResult<Value> {
    let section = parse_section(&slug)?;
    if !patch.is_object() {
        return Err(AppError::BadRequest("Patch body must be a JSON object".to_string()));
    }

    if section.storage() == Storage::Singleton {
        let doc = state.repo.patch_singleton(section, &patch).await?;
        return Ok(ApiResponse::new(doc).with_message("Saved"));
    }

    let id = body_id(&patch)?;
    let doc = state.repo.patch(section, &id, &patch).await?;
    reindex(&state, section, &doc).await;
    Ok(ApiResponse::new(doc).with_message("Updated"))
}

/// DELETE /api/{section}?id=<id> - Delete a document by id.
pub async fn delete_document(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<IdQuery>,
) -> ApiResult<()> {
    let section = collection(&slug)?;
    let id = query
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Query parameter id is required".to_string()))?;

    state.repo.delete(section, &id).await?;
    if let Err(e) = state.search.remove_document(&id).await {
        tracing::warn!("Failed to remove document from index: {}", e);
    }

    tracing::info!(section = %section, id = %id, "document deleted");
    Ok(ApiResponse::new(()).with_message("Deleted"))
}

fn collection(slug: &str) -> Result<Section, AppError> {
    let section = parse_section(slug)?;
    if section.storage() != Storage::Collection {
        return Err(AppError::NotFound(format!("{} is a single document", section)));
    }
    Ok(section)
}

fn validated(section: Section, body: &Value) -> Result<(), AppError> {
    let report = section.validate(body);
    if report.is_valid() {
        Ok(())
    } else {
        tracing::debug!(section = %section, errors = ?report.field_errors, "validation failed");
        Err(AppError::Validation(report))
    }
}

fn body_id(body: &Value) -> Result<String, AppError> {
    document_id(body).ok_or_else(|| AppError::BadRequest("Body must include _id".to_string()))
}

async fn reindex(state: &AppState, section: Section, doc: &Value) {
    if let Err(e) = state.search.index_document(section, doc).await {
        tracing::warn!("Failed to index document: {}", e);
    }
}

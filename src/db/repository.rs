//! Database repository for document CRUD operations.
//!
//! Bodies are stored without the store-owned fields; `_id`, `createdAt` and
//! `updatedAt` are stitched back in on every read.

use chrono::Utc;
use serde_json::{Map, Value};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::document::{merge_patch, strip_server_fields, ID_KEY};
use crate::errors::AppError;
use crate::schema::Section;

/// Database repository for all document operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== COLLECTION OPERATIONS ====================

    /// List every document of a section in creation order.
    pub async fn list(&self, section: Section) -> Result<Vec<Value>, AppError> {
        let rows = sqlx::query(
            "SELECT id, body, created_at, updated_at FROM documents WHERE section = ? ORDER BY seq",
        )
        .bind(section.slug())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(document_from_row).collect()
    }

    /// Get a document by ID.
    pub async fn get(&self, section: Section, id: &str) -> Result<Option<Value>, AppError> {
        let row = sqlx::query(
            "SELECT id, body, created_at, updated_at FROM documents WHERE section = ? AND id = ?",
        )
        .bind(section.slug())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(document_from_row).transpose()
    }

    /// Create a new document, assigning it a fresh `_id`.
    pub async fn create(&self, section: Section, mut body: Value) -> Result<Value, AppError> {
        strip_server_fields(&mut body);
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let body_json = serde_json::to_string(&body)?;

        sqlx::query(
            "INSERT INTO documents (id, section, body, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(section.slug())
        .bind(&body_json)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        tracing::debug!(section = %section, id = %id, "document created");
        Ok(with_server_fields(body, Some(&id), Some(&now), &now))
    }

    /// Replace a document's body wholesale. Last write wins.
    pub async fn replace(&self, section: Section, id: &str, mut body: Value) -> Result<Value, AppError> {
        strip_server_fields(&mut body);
        let now = Utc::now().to_rfc3339();
        let body_json = serde_json::to_string(&body)?;

        let row = sqlx::query(
            "UPDATE documents SET body = ?, updated_at = ? WHERE section = ? AND id = ? RETURNING created_at",
        )
        .bind(&body_json)
        .bind(&now)
        .bind(section.slug())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(section, id))?;

        let created_at: String = row.get("created_at");
        Ok(with_server_fields(body, Some(id), Some(&created_at), &now))
    }

    /// Apply a JSON merge patch to one document inside a transaction.
    ///
    /// The merged result is validated against the section's rules before it
    /// is written.
    pub async fn patch(&self, section: Section, id: &str, patch: &Value) -> Result<Value, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT body, created_at FROM documents WHERE section = ? AND id = ?")
            .bind(section.slug())
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| not_found(section, id))?;

        let mut body = parse_body(row.get("body"))?;
        let created_at: String = row.get("created_at");
        let mut patch = patch.clone();
        strip_server_fields(&mut patch);
        merge_patch(&mut body, &patch);

        let report = section.validate(&body);
        if !report.is_valid() {
            return Err(AppError::Validation(report));
        }

        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE documents SET body = ?, updated_at = ? WHERE section = ? AND id = ?")
            .bind(serde_json::to_string(&body)?)
            .bind(&now)
            .bind(section.slug())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(with_server_fields(body, Some(id), Some(&created_at), &now))
    }

    /// Delete a document.
    pub async fn delete(&self, section: Section, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM documents WHERE section = ? AND id = ?")
            .bind(section.slug())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(section, id));
        }

        tracing::debug!(section = %section, id = %id, "document deleted");
        Ok(())
    }

    /// Every searchable document, for rebuilding the search index.
    pub async fn list_searchable(&self) -> Result<Vec<(Section, Value)>, AppError> {
        let mut all = Vec::new();
        for section in Section::ALL.into_iter().filter(Section::is_searchable) {
            for doc in self.list(section).await? {
                all.push((section, doc));
            }
        }
        Ok(all)
    }

    // ==================== SINGLETON OPERATIONS ====================

    /// Get a singleton document; an empty object if it was never written.
    pub async fn get_singleton(&self, section: Section) -> Result<Value, AppError> {
        let row = sqlx::query("SELECT body, updated_at FROM singletons WHERE section = ?")
            .bind(section.slug())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let updated_at: String = row.get("updated_at");
                Ok(with_server_fields(parse_body(row.get("body"))?, None, None, &updated_at))
            }
            None => Ok(Value::Object(Map::new())),
        }
    }

    /// Replace a singleton document.
    pub async fn put_singleton(&self, section: Section, mut body: Value) -> Result<Value, AppError> {
        strip_server_fields(&mut body);
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"INSERT INTO singletons (section, body, updated_at) VALUES (?, ?, ?)
               ON CONFLICT(section) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at"#,
        )
        .bind(section.slug())
        .bind(serde_json::to_string(&body)?)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(with_server_fields(body, None, None, &now))
    }

    /// Merge-patch a singleton, so one dashboard section never clobbers another.
    pub async fn patch_singleton(&self, section: Section, patch: &Value) -> Result<Value, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT body FROM singletons WHERE section = ?")
            .bind(section.slug())
            .fetch_optional(&mut *tx)
            .await?;

        let mut body = match row {
            Some(row) => parse_body(row.get("body"))?,
            None => Value::Object(Map::new()),
        };
        let mut patch = patch.clone();
        strip_server_fields(&mut patch);
        merge_patch(&mut body, &patch);

        let report = section.validate(&body);
        if !report.is_valid() {
            return Err(AppError::Validation(report));
        }

        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"INSERT INTO singletons (section, body, updated_at) VALUES (?, ?, ?)
               ON CONFLICT(section) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at"#,
        )
        .bind(section.slug())
        .bind(serde_json::to_string(&body)?)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(with_server_fields(body, None, None, &now))
    }
}

// ==================== ROW MAPPING ====================

fn not_found(section: Section, id: &str) -> AppError {
    AppError::NotFound(format!("{} document {} not found", section, id))
}

fn parse_body(raw: String) -> Result<Value, AppError> {
    serde_json::from_str(&raw)
        .map_err(|e| AppError::Internal(format!("Stored document is not valid JSON: {}", e)))
}

fn document_from_row(row: &SqliteRow) -> Result<Value, AppError> {
    let id: String = row.get("id");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");
    let body = parse_body(row.get("body"))?;
    Ok(with_server_fields(body, Some(&id), Some(&created_at), &updated_at))
}

fn with_server_fields(
    body: Value,
    id: Option<&str>,
    created_at: Option<&str>,
    updated_at: &str,
) -> Value {
    let mut map = match body {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    };
    if let Some(id) = id {
        map.insert(ID_KEY.to_string(), Value::String(id.to_string()));
    }
    if let Some(created_at) = created_at {
        map.insert("createdAt".to_string(), Value::String(created_at.to_string()));
    }
    map.insert("updatedAt".to_string(), Value::String(updated_at.to_string()));
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use serde_json::json;
    use tempfile::TempDir;

    async fn repo() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("test.sqlite")).await.unwrap();
        (Repository::new(pool), temp_dir)
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_discards_client_id() {
        let (repo, _dir) = repo().await;
        let created = repo
            .create(Section::News, json!({ "_id": "tmp-1", "title": "Convocation" }))
            .await
            .unwrap();

        let id = created["_id"].as_str().unwrap();
        assert_ne!(id, "tmp-1");
        assert_eq!(created["title"], "Convocation");
        assert!(created["createdAt"].is_string());

        let fetched = repo.get(Section::News, id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        // sections are isolated
        assert!(repo.get(Section::Faculty, id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_keeps_creation_order() {
        let (repo, _dir) = repo().await;
        for title in ["first", "second", "third"] {
            repo.create(Section::News, json!({ "title": title })).await.unwrap();
        }
        let titles: Vec<String> = repo
            .list(Section::News)
            .await
            .unwrap()
            .iter()
            .map(|d| d["title"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_replace_and_delete() {
        let (repo, _dir) = repo().await;
        let created = repo.create(Section::Alumni, json!({ "name": "A" })).await.unwrap();
        let id = created["_id"].as_str().unwrap().to_string();

        let replaced = repo
            .replace(Section::Alumni, &id, json!({ "name": "B", "batch": "2019" }))
            .await
            .unwrap();
        assert_eq!(replaced["name"], "B");
        assert_eq!(replaced["createdAt"], created["createdAt"]);

        repo.delete(Section::Alumni, &id).await.unwrap();
        assert!(repo.list(Section::Alumni).await.unwrap().is_empty());
        assert!(matches!(
            repo.delete(Section::Alumni, &id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            repo.replace(Section::Alumni, &id, json!({ "name": "C" })).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_patch_validates_merged_document() {
        let (repo, _dir) = repo().await;
        let created = repo
            .create(Section::Faculty, json!({ "name": "Dr. K", "designation": "Lecturer", "department": "CSE" }))
            .await
            .unwrap();
        let id = created["_id"].as_str().unwrap();

        let patched = repo
            .patch(Section::Faculty, id, &json!({ "designation": "Professor" }))
            .await
            .unwrap();
        assert_eq!(patched["designation"], "Professor");
        assert_eq!(patched["department"], "CSE");

        let rejected = repo.patch(Section::Faculty, id, &json!({ "department": null })).await;
        assert!(matches!(rejected, Err(AppError::Validation(_))));
        let unchanged = repo.get(Section::Faculty, id).await.unwrap().unwrap();
        assert_eq!(unchanged["department"], "CSE");
    }

    #[tokio::test]
    async fn test_singleton_patch_leaves_other_keys() {
        let (repo, _dir) = repo().await;
        assert_eq!(repo.get_singleton(Section::Homepage).await.unwrap(), json!({}));

        repo.put_singleton(
            Section::Homepage,
            json!({ "testimonialsTitle": "Voices", "benefits": ["Scholarships"] }),
        )
        .await
        .unwrap();
        let patched = repo
            .patch_singleton(Section::Homepage, &json!({ "benefits": ["Labs"] }))
            .await
            .unwrap();

        assert_eq!(patched["testimonialsTitle"], "Voices");
        assert_eq!(patched["benefits"], json!(["Labs"]));
        assert!(patched.get("_id").is_none());
    }

    #[tokio::test]
    async fn test_admissions_are_not_searchable() {
        let (repo, _dir) = repo().await;
        repo.create(Section::News, json!({ "title": "Open day" })).await.unwrap();
        repo.create(Section::Admissions, json!({ "applicantName": "R" })).await.unwrap();

        let all = repo.list_searchable().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].0, Section::News);
    }
}

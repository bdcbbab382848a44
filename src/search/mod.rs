//! Tantivy-based site search.
//!
//! Indexes every searchable collection document with a boosted title field
//! and a catch-all body field.

use std::path::Path;
use std::sync::Arc;
use tantivy::collector::{Count, TopDocs};
use tantivy::query::{BooleanQuery, BoostQuery, Occur, QueryParser, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, Schema, Value as _, STORED, STRING, TEXT};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use tokio::sync::RwLock;

use serde_json::Value;

use crate::document::{document_id, string_leaves};
use crate::errors::AppError;
use crate::schema::Section;

const BOOST_TITLE: f32 = 5.0;
const BOOST_BODY: f32 = 1.0;

/// Keys whose value names the document, in order of preference.
const TITLE_KEYS: [&str; 4] = ["title", "name", "month", "label"];

/// Search hit pointing back into the store.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub section: Section,
    pub doc_id: String,
    pub score: f32,
}

/// One page of hits plus the number of matches across all pages.
#[derive(Debug, Clone, Default)]
pub struct SearchHits {
    pub total: usize,
    pub results: Vec<SearchResult>,
}

struct SearchFields {
    doc_id: Field,
    section: Field,
    title: Field,
    body: Field,
}

/// Tantivy search index for site documents.
pub struct SearchIndex {
    index: Index,
    reader: IndexReader,
    writer: Arc<RwLock<IndexWriter>>,
    fields: SearchFields,
}

impl SearchIndex {
    /// Create or open a search index at the specified path.
    pub fn open(index_path: &Path) -> Result<Self, AppError> {
        std::fs::create_dir_all(index_path)
            .map_err(|e| AppError::Search(format!("Failed to create index directory: {}", e)))?;

        let mut schema_builder = Schema::builder();
        let doc_id = schema_builder.add_text_field("doc_id", STRING | STORED);
        let section = schema_builder.add_text_field("section", STRING | STORED);
        let title = schema_builder.add_text_field("title", TEXT);
        let body = schema_builder.add_text_field("body", TEXT);
        let schema = schema_builder.build();

        let fields = SearchFields {
            doc_id,
            section,
            title,
            body,
        };

        let index = Index::open_in_dir(index_path)
            .or_else(|_| Index::create_in_dir(index_path, schema.clone()))
            .map_err(|e| AppError::Search(format!("Failed to open/create index: {}", e)))?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()
            .map_err(|e| AppError::Search(format!("Failed to create reader: {}", e)))?;

        let writer = index
            .writer(50_000_000) // 50MB buffer
            .map_err(|e| AppError::Search(format!("Failed to create writer: {}", e)))?;

        Ok(Self {
            index,
            reader,
            writer: Arc::new(RwLock::new(writer)),
            fields,
        })
    }

    /// Rebuild the entire index.
    pub async fn rebuild(&self, docs: &[(Section, Value)]) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;

        writer.delete_all_documents()?;
        for (section, doc) in docs {
            if let Some(entry) = self.create_document(*section, doc) {
                writer.add_document(entry)?;
            }
        }
        writer.commit()?;
        self.reader.reload()?;

        tracing::info!("Search index rebuilt with {} documents", docs.len());
        Ok(())
    }

    /// Index (or re-index) a single document. Non-searchable sections are ignored.
    pub async fn index_document(&self, section: Section, doc: &Value) -> Result<(), AppError> {
        if !section.is_searchable() {
            return Ok(());
        }
        let Some(entry) = self.create_document(section, doc) else {
            return Ok(());
        };

        let mut writer = self.writer.write().await;
        if let Some(id) = document_id(doc) {
            writer.delete_term(Term::from_field_text(self.fields.doc_id, &id));
        }
        writer.add_document(entry)?;
        writer.commit()?;
        self.reader.reload()?;

        Ok(())
    }

    /// Remove a document from the index.
    pub async fn remove_document(&self, doc_id: &str) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;
        writer.delete_term(Term::from_field_text(self.fields.doc_id, doc_id));
        writer.commit()?;
        self.reader.reload()?;
        Ok(())
    }

    /// Search documents, optionally restricted to one section.
    pub fn search(
        &self,
        query_str: &str,
        section: Option<Section>,
        limit: usize,
        offset: usize,
    ) -> Result<SearchHits, AppError> {
        if query_str.trim().is_empty() || limit == 0 {
            return Ok(SearchHits::default());
        }

        let searcher = self.reader.searcher();

        let mut text_queries: Vec<(Occur, Box<dyn tantivy::query::Query>)> = Vec::new();
        for (field, boost) in [(self.fields.title, BOOST_TITLE), (self.fields.body, BOOST_BODY)] {
            let field_parser = QueryParser::for_index(&self.index, vec![field]);
            let (field_query, _errors) = field_parser.parse_query_lenient(query_str);
            text_queries.push((Occur::Should, Box::new(BoostQuery::new(field_query, boost))));
        }

        let mut combined: Vec<(Occur, Box<dyn tantivy::query::Query>)> =
            vec![(Occur::Must, Box::new(BooleanQuery::new(text_queries)))];
        if let Some(section) = section {
            let term = Term::from_field_text(self.fields.section, section.slug());
            combined.push((
                Occur::Must,
                Box::new(TermQuery::new(term, IndexRecordOption::Basic)),
            ));
        }
        let query = BooleanQuery::new(combined);

        let (total, top_docs) = searcher
            .search(&query, &(Count, TopDocs::with_limit(limit + offset)))
            .map_err(|e| AppError::Search(format!("Search failed: {}", e)))?;

        let results = top_docs
            .into_iter()
            .skip(offset)
            .take(limit)
            .filter_map(|(score, doc_address)| {
                let stored: TantivyDocument = searcher.doc(doc_address).ok()?;
                let doc_id = stored.get_first(self.fields.doc_id)?.as_str()?.to_string();
                let section = stored
                    .get_first(self.fields.section)?
                    .as_str()?
                    .parse()
                    .ok()?;
                Some(SearchResult {
                    section,
                    doc_id,
                    score,
                })
            })
            .collect();

        Ok(SearchHits { total, results })
    }

    fn create_document(&self, section: Section, doc: &Value) -> Option<TantivyDocument> {
        let id = document_id(doc)?;
        let title_key = TITLE_KEYS.iter().find(|k| doc.get(**k).is_some_and(Value::is_string));
        let title = title_key
            .and_then(|k| doc.get(*k))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let body = string_leaves(doc)
            .into_iter()
            .filter(|s| !s.starts_with("http") && !s.starts_with('/'))
            .collect::<Vec<_>>()
            .join(" ");

        Some(doc!(
            self.fields.doc_id => id,
            self.fields.section => section.slug(),
            self.fields.title => title,
            self.fields.body => body
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_title_matches_rank_first() {
        let temp_dir = TempDir::new().unwrap();
        let index = SearchIndex::open(temp_dir.path()).unwrap();

        let docs = vec![
            (
                Section::News,
                json!({ "_id": "n1", "title": "Annual sports week", "description": "Football and cricket" }),
            ),
            (
                Section::Programs,
                json!({ "_id": "p1", "title": "BSc in Computer Science", "overview": ["Includes a sports analytics elective"] }),
            ),
        ];
        index.rebuild(&docs).await.unwrap();

        let hits = index.search("sports", None, 10, 0).unwrap();
        assert_eq!(hits.total, 2);
        assert_eq!(hits.results.len(), 2);
        assert_eq!(hits.results[0].doc_id, "n1");

        let programs_only = index.search("sports", Some(Section::Programs), 10, 0).unwrap();
        assert_eq!(programs_only.results.len(), 1);
        assert_eq!(programs_only.results[0].section, Section::Programs);
    }

    #[tokio::test]
    async fn test_total_counts_every_match_not_the_page() {
        let temp_dir = TempDir::new().unwrap();
        let index = SearchIndex::open(temp_dir.path()).unwrap();
        let docs: Vec<_> = (1..=3)
            .map(|i| (Section::News, json!({ "_id": format!("n{i}"), "title": format!("Seminar {i}") })))
            .collect();
        index.rebuild(&docs).await.unwrap();

        let first = index.search("seminar", None, 1, 0).unwrap();
        assert_eq!(first.total, 3);
        assert_eq!(first.results.len(), 1);

        let last = index.search("seminar", None, 2, 2).unwrap();
        assert_eq!(last.total, 3);
        assert_eq!(last.results.len(), 1);

        assert_eq!(index.search("seminar", None, 0, 0).unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_reindex_and_remove() {
        let temp_dir = TempDir::new().unwrap();
        let index = SearchIndex::open(temp_dir.path()).unwrap();

        index
            .index_document(Section::News, &json!({ "_id": "n1", "title": "Library closed" }))
            .await
            .unwrap();
        index
            .index_document(Section::News, &json!({ "_id": "n1", "title": "Library reopens" }))
            .await
            .unwrap();
        assert_eq!(index.search("closed", None, 10, 0).unwrap().total, 0);
        assert_eq!(index.search("reopens", None, 10, 0).unwrap().results.len(), 1);

        index.remove_document("n1").await.unwrap();
        assert!(index.search("library", None, 10, 0).unwrap().results.is_empty());
    }

    #[tokio::test]
    async fn test_admissions_never_indexed() {
        let temp_dir = TempDir::new().unwrap();
        let index = SearchIndex::open(temp_dir.path()).unwrap();
        index
            .index_document(Section::Admissions, &json!({ "_id": "a1", "applicantName": "Rahim" }))
            .await
            .unwrap();
        assert_eq!(index.search("rahim", None, 10, 0).unwrap().total, 0);
        assert!(index.search("", None, 10, 0).unwrap().results.is_empty());
    }
}

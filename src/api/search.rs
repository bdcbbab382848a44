//! Site search endpoint.

use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{parse_section, success, ApiResult};
use crate::AppState;

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Search query string.
    pub q: String,
    /// Restrict hits to one section slug.
    #[serde(default)]
    pub section: Option<String>,
    /// Maximum number of results (default: 20).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Offset for pagination (default: 0).
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    20
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<SearchResultItem>,
    /// Matches across all pages.
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultItem {
    pub section: String,
    pub document: Value,
    pub score: f32,
}

/// Maximum number of search results allowed.
const MAX_SEARCH_LIMIT: usize = 100;

/// GET /api/search - Search site content.
pub async fn search_documents(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> ApiResult<SearchResponse> {
    let limit = params.limit.min(MAX_SEARCH_LIMIT);
    let section = params.section.as_deref().map(parse_section).transpose()?;

    let hits = state.search.search(&params.q, section, limit, params.offset)?;

    // Hits whose document vanished in the meantime are skipped.
    let mut results = Vec::new();
    for hit in hits.results {
        if let Ok(Some(document)) = state.repo.get(hit.section, &hit.doc_id).await {
            results.push(SearchResultItem {
                section: hit.section.slug().to_string(),
                document,
                score: hit.score,
            });
        }
    }

    success(SearchResponse {
        results,
        total: hits.total,
        limit,
        offset: params.offset,
    })
}

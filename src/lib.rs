//! Campus CMS backend
//!
//! Document store and REST surface for the public campus website and its
//! admin dashboard, plus the generic document editor the dashboard drives.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod document;
pub mod editor;
pub mod errors;
pub mod models;
pub mod public;
pub mod schema;
pub mod search;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use config::Config;
use db::Repository;
use search::SearchIndex;

/// Multipart framing allowance on top of the file size limit.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub search: Arc<SearchIndex>,
    pub config: Arc<Config>,
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let psk = state.config.api_psk.clone();
    let upload_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD;

    let api_routes = Router::new()
        .route("/auth/check", get(api::auth_check))
        .route("/search", get(api::search_documents))
        .route(
            "/upload",
            post(api::upload_file).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/{section}",
            get(api::list_documents)
                .post(api::create_document)
                .put(api::update_document)
                .patch(api::patch_document)
                .delete(api::delete_document),
        )
        .route("/{section}/{id}", get(api::get_document))
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    let health_routes = Router::new().route("/health", get(health_check));

    let mut router = Router::new().nest("/api", api_routes).merge(health_routes);

    // Uploads are served locally unless they point at an external host.
    if state.config.public_url.starts_with('/') && state.config.public_url.len() > 1 {
        router = router.nest_service(
            &state.config.public_url,
            ServeDir::new(&state.config.upload_dir),
        );
    }

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

//! Dashboard login check.

use axum::{extract::State, http::HeaderMap};
use serde::Serialize;

use super::{success, ApiResult};
use crate::auth::is_authenticated;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct AuthStatus {
    pub authenticated: bool,
}

/// GET /api/auth/check - Report whether the presented key grants dashboard access.
pub async fn auth_check(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<AuthStatus> {
    success(AuthStatus {
        authenticated: is_authenticated(state.config.api_psk.as_deref(), &headers),
    })
}

//! PSK-based authentication for dashboard writes.
//!
//! Reads are public except for sections that accept public forms, whose
//! submissions only the dashboard may read. Writes need the admin key, except
//! submissions to those sections. Uploads are let through here and
//! checked by the upload handler, which knows the target folder. Keys are
//! compared in constant time.

use axum::{
    extract::Request,
    http::{header, HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::errors::AppError;
use crate::schema::Section;

/// Header name for the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

const API_PREFIX: &str = "api";
const UPLOAD_SEGMENT: &str = "upload";

/// PSK authentication layer function that takes the expected PSK as a parameter.
pub async fn psk_auth_layer(
    expected_psk: Option<String>,
    request: Request,
    next: Next,
) -> Response {
    // If no PSK is configured, allow all requests (dev mode)
    let Some(expected) = expected_psk else {
        return next.run(request).await;
    };

    if is_public_request(request.method(), request.uri().path()) {
        return next.run(request).await;
    }

    match presented_key(request.headers()) {
        Some(provided) if constant_time_compare(&provided, &expected) => next.run(request).await,
        Some(_) => AppError::Unauthorized("Invalid API key".to_string()).into_response(),
        None => AppError::Unauthorized("Missing or invalid API key".to_string()).into_response(),
    }
}

/// Whether the headers carry the expected key. No key configured means open access.
pub fn is_authenticated(expected_psk: Option<&str>, headers: &HeaderMap) -> bool {
    match (expected_psk, presented_key(headers)) {
        (None, _) => true,
        (Some(expected), Some(provided)) => constant_time_compare(&provided, expected),
        (Some(_), None) => false,
    }
}

/// Key from `x-api-key`, else from `Authorization: Bearer`.
fn presented_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
        })
        .map(|s| s.to_string())
}

/// Safe methods, uploads, and form submissions to public sections.
///
/// Sections that take public submissions hold personal data, so reading
/// them needs the key even though posting to them does not.
fn is_public_request(method: &Method, path: &str) -> bool {
    let segments: Vec<&str> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .skip_while(|s| *s == API_PREFIX)
        .collect();
    let section = segments.first().and_then(|s| s.parse::<Section>().ok());
    let takes_submissions = section.is_some_and(|s| s.accepts_public_submissions());

    match *method {
        Method::OPTIONS => true,
        Method::GET | Method::HEAD => !takes_submissions,
        Method::POST => match segments.as_slice() {
            [UPLOAD_SEGMENT] => true,
            [_] => takes_submissions,
            _ => false,
        },
        _ => false,
    }
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

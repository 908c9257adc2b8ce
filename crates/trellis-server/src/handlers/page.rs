//! Page lookup endpoint.
//!
//! Resolves a URL path to a document and returns its metadata and raw
//! markdown body as JSON. Served both at `GET /api/page?path=...` and for any
//! non-API path that was not redirected.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use trellis_site::{FoundBy, Resolution};

use crate::error::ServerError;
use crate::handlers::{decode_path, is_api_path};
use crate::middleware::redirect::RoutedPage;
use crate::state::AppState;

/// Query string of GET /api/page.
#[derive(Deserialize)]
pub(crate) struct PageQuery {
    /// URL path to resolve (already percent-decoded by the extractor).
    path: Option<String>,
}

/// Response for a resolved page.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageResponse {
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    author: String,
    created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reading_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    word_count: Option<u32>,
    tags: Vec<String>,
    /// Raw markdown body.
    body: String,
    slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_name: Option<String>,
    /// Requested path, normalized.
    path: String,
    found_by: FoundBy,
}

impl From<Resolution> for PageResponse {
    fn from(resolution: Resolution) -> Self {
        let Resolution {
            document,
            path,
            found_by,
        } = resolution;
        let data = document.data;
        Self {
            title: data.title,
            description: data.description,
            author: data.author,
            created_at: data.created_at,
            updated_at: data.updated_at,
            reading_time: data.reading_time,
            word_count: data.word_count,
            tags: data.tags,
            body: document.body,
            slug: document.slug,
            page_name: data.page_name,
            path,
            found_by,
        }
    }
}

/// Handle GET /api/page?path=...
pub(crate) async fn get_page(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PageQuery>, QueryRejection>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let Query(query) = query.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    let path = query
        .path
        .filter(|p| !p.trim().is_empty())
        .ok_or(ServerError::MissingParameter("path"))?;
    page_response(&state, state.site.resolve(&path)?, &headers)
}

/// Handle any other GET request as a page lookup of the request path.
///
/// Uses the resolution left by the redirect middleware when present.
pub(crate) async fn get_page_by_uri(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    routed: Option<Extension<RoutedPage>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    if is_api_path(uri.path()) {
        return Err(ServerError::RouteNotFound(uri.path().to_owned()));
    }
    let resolution = match routed {
        Some(Extension(RoutedPage(resolution))) => resolution?,
        None => state.site.resolve(&decode_path(uri.path()))?,
    };
    page_response(&state, resolution, &headers)
}

/// Build the JSON response for a resolved page, honoring `If-None-Match`.
fn page_response(
    state: &AppState,
    resolution: Resolution,
    headers: &HeaderMap,
) -> Result<Response, ServerError> {
    tracing::debug!(path = %resolution.path, slug = %resolution.document.slug, found_by = %resolution.found_by, "Serving page");

    let etag = compute_etag(
        &state.version,
        &resolution.document.slug,
        &resolution.document.body,
    );

    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && if_none_match.as_bytes() == etag.as_bytes()
    {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    Ok((
        [
            (header::ETAG, etag),
            (header::CACHE_CONTROL, "private, max-age=60".to_owned()),
        ],
        Json(PageResponse::from(resolution)),
    )
        .into_response())
}

/// Compute `ETag` from version, slug and body.
///
/// Uses MD5 hash truncated to 64 bits (16 hex chars) - sufficient for
/// cache invalidation with negligible collision probability.
fn compute_etag(version: &str, slug: &str, body: &str) -> String {
    let hash = Md5::digest(format!("{version}:{slug}:{body}").as_bytes());
    format!("\"{}\"", &hex::encode(hash)[..16])
}

//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use trellis_site::{ResolveError, SiteError};
use trellis_storage::StorageError;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ServerError {
    /// Required query parameter missing or blank.
    #[error("Missing {0} parameter")]
    MissingParameter(&'static str),

    /// Malformed query string.
    #[error("{0}")]
    BadRequest(String),

    /// No route under `/api/` matches.
    #[error("Route not found: {0}")]
    RouteNotFound(String),

    /// Path did not resolve to a document.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Content store failure.
    #[error("Server error: {0}")]
    Storage(#[from] StorageError),
}

impl From<SiteError> for ServerError {
    fn from(e: SiteError) -> Self {
        match e {
            SiteError::Storage(e) => Self::Storage(e),
            SiteError::Resolve(e) => Self::Resolve(e),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::MissingParameter(_) | Self::BadRequest(_) => (
                StatusCode::BAD_REQUEST,
                json!({"error": self.to_string()}),
            ),
            Self::RouteNotFound(path) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Not found", "path": path}),
            ),
            Self::Resolve(ResolveError::PageNotFound {
                requested_path,
                available_menu_paths,
            }) => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": "Page not found",
                    "requestedPath": requested_path,
                    "availableMenuPaths": available_menu_paths,
                }),
            ),
            Self::Resolve(ResolveError::ContentMissing {
                label,
                path,
                has_index,
            }) => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": "Page content not found",
                    "menuItem": {"label": label, "path": path, "hasIndex": has_index},
                }),
            ),
            Self::Resolve(ResolveError::DocumentMissing { slug }) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Page file not found", "targetSlug": slug}),
            ),
            Self::Storage(e) => {
                tracing::error!(error = %e, "Content store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": self.to_string()}),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

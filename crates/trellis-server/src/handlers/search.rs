//! Search API endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use serde::Deserialize;
use trellis_site::SearchHit;

use crate::error::ServerError;
use crate::state::AppState;

/// Query string of GET /api/search.
#[derive(Deserialize)]
pub(crate) struct SearchQuery {
    q: Option<String>,
}

/// Handle GET /api/search.
///
/// A missing or blank query returns an empty list.
pub(crate) async fn get_search(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<SearchHit>>, ServerError> {
    let Query(query) = query.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    let Some(q) = query.q.filter(|q| !q.trim().is_empty()) else {
        return Ok(Json(Vec::new()));
    };
    Ok(Json(state.site.search(&q)?))
}

//! Menu API endpoint.
//!
//! Returns the menu tree, rebuilt from the content store on every request.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use trellis_site::MenuNode;

use crate::error::ServerError;
use crate::state::AppState;

/// Response for GET /api/menu.
#[derive(Serialize)]
pub(crate) struct MenuResponse {
    /// Top-level sections.
    items: Vec<MenuNode>,
}

/// Handle GET /api/menu.
pub(crate) async fn get_menu(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MenuResponse>, ServerError> {
    let items = state.site.menu()?;
    Ok(Json(MenuResponse { items }))
}

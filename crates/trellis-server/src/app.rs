//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::{redirect, security};
use crate::state::AppState;

/// Create the application router.
///
/// # Arguments
///
/// * `state` - Shared application state
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        .route("/api/health", get(handlers::health::get_health))
        .route("/api/menu", get(handlers::menu::get_menu))
        .route("/api/page", get(handlers::page::get_page))
        .route("/api/search", get(handlers::search::get_search));

    Router::new()
        .merge(api_routes)
        // Any other path is a page lookup
        .fallback(handlers::page::get_page_by_uri)
        .layer(axum::middleware::from_fn_with_state(
            Arc::clone(&state),
            redirect::redirect,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(security::content_type_options_layer())
                .layer(security::frame_options_layer())
                .layer(security::referrer_policy_layer()),
        )
        .with_state(state)
}

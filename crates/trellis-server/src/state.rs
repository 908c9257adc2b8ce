//! Application state.
//!
//! Shared state for all request handlers.

use trellis_site::Site;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Menu, resolution and search over the content store.
    pub(crate) site: Site,
    /// Application version, reported by the health check and mixed into ETags.
    pub(crate) version: String,
}

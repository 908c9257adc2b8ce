//! HTTP server for trellis.
//!
//! This crate provides a native Rust HTTP server using axum, serving:
//! - `GET /api/page?path=...`: page lookup by URL path
//! - `GET /api/search?q=...`: metadata search
//! - `GET /api/menu`: menu tree
//! - `GET /api/health`: liveness and version
//!
//! Every other path goes through the redirect middleware (configured rules,
//! external rules, then the fallback for unresolvable paths) and, if not
//! redirected, is answered like a page lookup of that path.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use trellis_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         host: "127.0.0.1".to_owned(),
//!         port: 4321,
//!         source_dir: PathBuf::from("content"),
//!         settings_path: PathBuf::from("content/site.toml"),
//!         search_limit: 20,
//!         version: "1.0.0".to_owned(),
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use state::AppState;
use trellis_site::Site;
use trellis_storage::Storage;
use trellis_storage_fs::FsStorage;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Content source directory.
    pub source_dir: PathBuf,
    /// Site settings file (main menu, redirects).
    pub settings_path: PathBuf,
    /// Maximum number of search hits.
    pub search_limit: usize,
    /// Application version (reported by the health check, part of ETags).
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 4321,
            source_dir: PathBuf::from("content"),
            settings_path: PathBuf::from("content/site.toml"),
            search_limit: trellis_site::DEFAULT_LIMIT,
            version: String::new(),
        }
    }
}

/// Run the server.
///
/// # Arguments
///
/// * `config` - Server configuration
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let storage: Arc<dyn Storage> = Arc::new(FsStorage::new(config.source_dir.clone()));
    let site = Site::new(storage, config.settings_path.clone()).with_search_limit(config.search_limit);

    let state = Arc::new(AppState {
        site,
        version: config.version.clone(),
    });

    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(
        address = %addr,
        source_dir = %config.source_dir.display(),
        "Starting server"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from trellis config.
///
/// # Arguments
///
/// * `config` - trellis configuration
/// * `version` - Application version
#[must_use]
pub fn server_config_from_config(config: &trellis_config::Config, version: String) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        source_dir: config.content_resolved.source_dir.clone(),
        settings_path: config.content_resolved.settings_path.clone(),
        search_limit: config.search.max_results,
        version,
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_server_config_from_config() {
        let temp = tempfile::tempdir().unwrap();
        let config_path = temp.path().join("trellis.toml");
        std::fs::write(
            &config_path,
            "[server]\nport = 9000\n\n[content]\nsource_dir = \"docs\"\n\n[search]\nmax_results = 5\n",
        )
        .unwrap();
        let config = trellis_config::Config::load(Some(&config_path), None).unwrap();

        let server = server_config_from_config(&config, "0.1.0".to_owned());

        assert_eq!(server.host, "127.0.0.1");
        assert_eq!(server.port, 9000);
        assert_eq!(server.source_dir, temp.path().join("docs"));
        assert_eq!(server.settings_path, temp.path().join("docs/site.toml"));
        assert_eq!(server.search_limit, 5);
        assert_eq!(server.version, "0.1.0");
    }

    #[test]
    fn test_default_server_config() {
        let config = ServerConfig::default();

        assert_eq!(config.port, 4321);
        assert_eq!(config.source_dir, Path::new("content"));
    }
}

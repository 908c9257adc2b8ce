//! CLI command implementations.

pub(crate) mod menu;
pub(crate) mod resolve;
pub(crate) mod serve;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use trellis_config::{CliSettings, Config};
use trellis_site::Site;
use trellis_storage_fs::FsStorage;

use crate::error::CliError;

pub(crate) use menu::MenuArgs;
pub(crate) use resolve::ResolveArgs;
pub(crate) use serve::ServeArgs;

/// Content location arguments shared by the offline commands.
#[derive(Args)]
pub(crate) struct ContentArgs {
    /// Path to configuration file (default: auto-discover trellis.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Content source directory (overrides config).
    #[arg(short, long, env = "TRELLIS_SOURCE_DIR")]
    source_dir: Option<PathBuf>,
}

impl ContentArgs {
    /// Load configuration and build a [`Site`] over the filesystem content.
    pub(crate) fn site(&self) -> Result<Site, CliError> {
        let cli_settings = CliSettings {
            source_dir: self.source_dir.clone(),
            ..Default::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        Ok(site_from_config(&config))
    }
}

fn site_from_config(config: &Config) -> Site {
    let storage = Arc::new(FsStorage::new(config.content_resolved.source_dir.clone()));
    Site::new(storage, config.content_resolved.settings_path.clone())
        .with_search_limit(config.search.max_results)
}


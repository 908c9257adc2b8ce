//! Menu tree, path resolution, redirects and search for trellis.
//!
//! This crate provides:
//! - [`build_menu_tree`]: the three-level navigation tree built from the
//!   configured main sections and the visible documents
//! - [`resolve`]: URL path → document lookup with menu-tree, direct-file and
//!   index-page strategies
//! - [`should_redirect`]: redirect table classification
//! - [`search`]: metadata search with simple relevance scoring
//! - [`Site`]: all of the above over a [`Storage`](trellis_storage::Storage)
//!   backend, rebuilt on every call
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use trellis_site::Site;
//! use trellis_storage_fs::FsStorage;
//!
//! let storage = Arc::new(FsStorage::new(PathBuf::from("content")));
//! let site = Site::new(storage, PathBuf::from("content/site.toml"));
//!
//! let menu = site.menu()?;
//! let page = site.resolve("/react/guide/environment-setup")?;
//! # Ok(())
//! # }
//! ```

pub(crate) mod menu;
pub(crate) mod redirect;
pub(crate) mod resolve;
pub(crate) mod search;
mod site;

pub use menu::{Breadcrumb, MenuNode, breadcrumbs, build_menu_tree, collect_paths, find_menu_item_by_path};
pub use redirect::{
    Redirect, RedirectTarget, fallback_target, is_external_url, normalize_path, redirect_target,
    should_redirect,
};
pub use resolve::{FoundBy, ROOT_SLUG, ResolveError, Resolution, resolve};
pub use search::{DEFAULT_LIMIT, SearchHit, public_path, search};
pub use site::{Route, Site, SiteError};

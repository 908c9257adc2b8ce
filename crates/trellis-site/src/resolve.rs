//! Path resolution.
//!
//! Maps a requested URL path back to a document. The menu tree and the file
//! layout can diverge (a leaf published under its `pageName` is still stored
//! under its filename), so lookup tries several strategies in order:
//!
//! 1. Menu tree: a node with exactly this path.
//! 2. Direct file: for three-segment paths, a document in the same group whose
//!    filename or `pageName` equals the last segment.
//! 3. Index page: for two-segment paths, the `<a>/<b>/index` document.
//!    Failing that, the `<a>/<b>` document itself (direct file), which covers
//!    section pages hidden from the menu or shadowed by a sibling with the
//!    same `pageName`.
//!
//! The root path bypasses all of them and maps to `home/index`.

use std::fmt;

use serde::Serialize;
use trellis_storage::{Document, INDEX_SEGMENT};

use crate::menu::{MenuNode, collect_paths, find_menu_item_by_path};
use crate::redirect::normalize_path;

/// Slug served for the root path.
pub const ROOT_SLUG: &str = "home/index";

/// Strategy that located a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FoundBy {
    #[serde(rename = "menu-tree-search")]
    MenuTree,
    #[serde(rename = "direct-file-search")]
    DirectFile,
    #[serde(rename = "index-page-search")]
    IndexPage,
    #[serde(rename = "root-page")]
    Root,
}

impl FoundBy {
    /// Wire name of the strategy.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MenuTree => "menu-tree-search",
            Self::DirectFile => "direct-file-search",
            Self::IndexPage => "index-page-search",
            Self::Root => "root-page",
        }
    }
}

impl fmt::Display for FoundBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub document: Document,
    /// Normalized requested path.
    pub path: String,
    pub found_by: FoundBy,
}

/// Error returned when a path does not resolve to a document.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// No strategy matched.
    #[error("Page not found: {requested_path}")]
    PageNotFound {
        requested_path: String,
        /// Every path of the menu tree, pre-order.
        available_menu_paths: Vec<String>,
    },
    /// A menu node matched but has no backing document.
    #[error("Page content not found for menu item {path}")]
    ContentMissing {
        label: String,
        path: String,
        has_index: bool,
    },
    /// A menu node points at a slug that is not in the document snapshot.
    #[error("Page document not found: {slug}")]
    DocumentMissing { slug: String },
}

/// Resolve `requested_path` against a menu tree and a visible-document snapshot.
///
/// The function is pure: identical inputs give equal outputs.
///
/// # Errors
///
/// Returns [`ResolveError`] when no document matches.
pub fn resolve(
    tree: &[MenuNode],
    requested_path: &str,
    documents: &[Document],
) -> Result<Resolution, ResolveError> {
    let path = normalize_path(requested_path);
    let found = |document: &Document, found_by: FoundBy| -> Result<Resolution, ResolveError> {
        tracing::debug!(path = %path, slug = %document.slug, %found_by, "Resolved path");
        Ok(Resolution {
            document: document.clone(),
            path: path.clone(),
            found_by,
        })
    };

    if path == "/" {
        return match find_visible(documents, ROOT_SLUG) {
            Some(document) => found(document, FoundBy::Root),
            None => Err(not_found(tree, &path)),
        };
    }

    if let Some(node) = find_menu_item_by_path(tree, &path) {
        let Some(slug) = node.backing_slug() else {
            return Err(ResolveError::ContentMissing {
                label: node.label.clone(),
                path: node.path.clone(),
                has_index: node.has_index,
            });
        };
        return match find_visible(documents, slug) {
            Some(document) => found(document, FoundBy::MenuTree),
            None => Err(ResolveError::DocumentMissing {
                slug: slug.to_owned(),
            }),
        };
    }

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [section, group, name] => {
            let direct = documents.iter().find(|doc| {
                let slug: Vec<&str> = doc.segments().collect();
                doc.is_visible()
                    && slug.len() == 3
                    && slug[0] == *section
                    && slug[1] == *group
                    && (slug[2] == *name || doc.data.page_name.as_deref() == Some(*name))
            });
            if let Some(document) = direct {
                return found(document, FoundBy::DirectFile);
            }
        }
        [section, group] => {
            let slug = format!("{section}/{group}/{INDEX_SEGMENT}");
            if let Some(document) = find_visible(documents, &slug) {
                return found(document, FoundBy::IndexPage);
            }
            if let Some(document) = find_visible(documents, &format!("{section}/{group}")) {
                return found(document, FoundBy::DirectFile);
            }
        }
        _ => {}
    }

    tracing::debug!(path = %path, "Path did not resolve");
    Err(not_found(tree, &path))
}

fn find_visible<'a>(documents: &'a [Document], slug: &str) -> Option<&'a Document> {
    documents
        .iter()
        .find(|doc| doc.slug == slug && doc.is_visible())
}

fn not_found(tree: &[MenuNode], path: &str) -> ResolveError {
    ResolveError::PageNotFound {
        requested_path: path.to_owned(),
        available_menu_paths: collect_paths(tree),
    }
}

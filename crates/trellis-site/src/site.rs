//! Request-scoped site facade.
//!
//! [`Site`] ties a [`Storage`] backend to the site settings file. Every call
//! re-reads the settings and the visible documents, then runs the pure tree,
//! resolution and search functions on that snapshot. Nothing is cached across
//! calls, so content and settings edits show up on the next request.

use std::path::PathBuf;
use std::sync::Arc;

use trellis_config::SiteSettings;
use trellis_storage::{Document, Storage, StorageError};

use crate::menu::{Breadcrumb, MenuNode, breadcrumbs, build_menu_tree};
use crate::redirect::{RedirectTarget, fallback_target, normalize_path, should_redirect};
use crate::resolve::{ResolveError, Resolution, resolve};
use crate::search::{DEFAULT_LIMIT, SearchHit, search};

/// Error returned by [`Site`] lookups.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// Content store failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// Path did not resolve.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Menu, resolution, redirect and search over a content store.
pub struct Site {
    storage: Arc<dyn Storage>,
    settings_path: PathBuf,
    search_limit: usize,
}

/// Outcome of [`Site::route`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// A redirect rule or external rule matched.
    Redirect(RedirectTarget),
    /// The path did not resolve and the fallback redirect applies.
    Fallback(RedirectTarget),
    /// Resolution result, served as a page or a not-found error.
    Page(Result<Resolution, ResolveError>),
}

/// Settings and documents read for one request.
struct Snapshot {
    settings: SiteSettings,
    documents: Vec<Document>,
}

impl Snapshot {
    fn tree(&self) -> Vec<MenuNode> {
        build_menu_tree(&self.settings.main_sections(), &self.documents)
    }
}

impl Site {
    /// Create a site over `storage` with settings read from `settings_path`.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, settings_path: PathBuf) -> Self {
        Self {
            storage,
            settings_path,
            search_limit: DEFAULT_LIMIT,
        }
    }

    /// Set the maximum number of search hits.
    #[must_use]
    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }

    /// Current site settings, defaults on any failure.
    #[must_use]
    pub fn settings(&self) -> SiteSettings {
        SiteSettings::load_or_default(&self.settings_path)
    }

    fn snapshot(&self) -> Result<Snapshot, StorageError> {
        Ok(Snapshot {
            settings: self.settings(),
            documents: self.storage.list_visible()?,
        })
    }

    /// Build the menu tree.
    pub fn menu(&self) -> Result<Vec<MenuNode>, StorageError> {
        Ok(self.snapshot()?.tree())
    }

    /// Resolve a URL path to a document.
    pub fn resolve(&self, path: &str) -> Result<Resolution, SiteError> {
        let snapshot = self.snapshot()?;
        Ok(resolve(&snapshot.tree(), path, &snapshot.documents)?)
    }

    /// Ancestors of the menu node at `path`, root first.
    pub fn breadcrumbs(&self, path: &str) -> Result<Vec<Breadcrumb>, StorageError> {
        Ok(breadcrumbs(&self.menu()?, &normalize_path(path)))
    }

    /// Search visible documents.
    pub fn search(&self, query: &str) -> Result<Vec<SearchHit>, StorageError> {
        Ok(search(&self.storage.list_visible()?, query, self.search_limit))
    }

    /// Route a request path: configured redirects first, then resolution
    /// with the fallback redirect for paths that do not resolve.
    ///
    /// Redirect rules match `path` exactly (no trailing-slash
    /// normalization). Settings and documents are read once, so the
    /// returned [`Route::Page`] can be served without another lookup.
    pub fn route(&self, path: &str) -> Result<Route, StorageError> {
        let settings = self.settings();
        let redirects = settings.redirects();
        if let Some(redirect) = should_redirect(path, &redirects) {
            return Ok(Route::Redirect(redirect.into()));
        }

        let snapshot = Snapshot {
            settings,
            documents: self.storage.list_visible()?,
        };
        let resolution = resolve(&snapshot.tree(), path, &snapshot.documents);

        if let Err(e) = &resolution
            && let Some(target) = fallback_target(&redirects)
            && normalize_path(path) != normalize_path(target)
        {
            tracing::debug!(path, fallback = target, error = %e, "Applying fallback redirect");
            return Ok(Route::Fallback(RedirectTarget::temporary(target)));
        }

        Ok(Route::Page(resolution))
    }
}

#[cfg(test)]
mod tests {
    // Ensure Site is Send + Sync for use with Arc
    static_assertions::assert_impl_all!(super::Site: Send, Sync);

    use std::fs;
    use std::path::Path;

    use pretty_assertions::assert_eq;
    use trellis_storage::{MockStorage, PageData, StorageErrorKind};
    use trellis_storage_fs::FsStorage;

    use super::*;
    use crate::resolve::FoundBy;

    const SETTINGS: &str = r#"
[[main_menu]]
label = "Home"
value = "home"
order = 1

[[main_menu]]
label = "React"
value = "react"
order = 2

[[redirects.rules]]
from = "/"
to = "/home"
type = "temporary"
status = 302

[[redirects.rules]]
from = "/old"
to = "/react"
type = "permanent"

[[redirects.external]]
from = "/github"
to = "https://github.com/example"
"#;

    fn write_page(root: &Path, rel: &str, front_matter: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            path,
            format!("---\n{front_matter}\ncreatedAt: 2024-05-01\n---\n正文内容 body\n"),
        )
        .unwrap();
    }

    fn create_site(root: &Path) -> Site {
        fs::write(root.join("site.toml"), SETTINGS).unwrap();
        write_page(root, "home/index.md", "title: Home");
        write_page(root, "react/index.md", "title: React\norder: 1");
        write_page(root, "react/开始学习/index.md", "title: 开始学习\norder: 1");
        write_page(
            root,
            "react/开始学习/环境搭建.md",
            "title: React Environment Setup\npageName: environment-setup\norder: 2",
        );
        let storage = Arc::new(FsStorage::new(root.to_path_buf()));
        Site::new(storage, root.join("site.toml"))
    }

    #[test]
    fn test_menu_from_filesystem() {
        let temp = tempfile::tempdir().unwrap();
        let site = create_site(temp.path());

        let tree = site.menu().unwrap();

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[1].children[0].path, "/react/开始学习");
        assert_eq!(
            tree[1].children[0].children[0].path,
            "/react/开始学习/environment-setup"
        );
    }

    #[test]
    fn test_resolve_from_filesystem() {
        let temp = tempfile::tempdir().unwrap();
        let site = create_site(temp.path());

        let by_name = site.resolve("/react/开始学习/environment-setup").unwrap();
        assert_eq!(by_name.document.slug, "react/开始学习/环境搭建");
        assert_eq!(by_name.found_by, FoundBy::MenuTree);
        assert_eq!(by_name.document.data.word_count, Some(5));

        let by_file = site.resolve("/react/开始学习/环境搭建").unwrap();
        assert_eq!(by_file.found_by, FoundBy::DirectFile);

        let err = site.resolve("/react/missing").unwrap_err();
        assert!(matches!(
            err,
            SiteError::Resolve(ResolveError::PageNotFound { .. })
        ));
    }

    #[test]
    fn test_settings_changes_apply_without_restart() {
        let temp = tempfile::tempdir().unwrap();
        let site = create_site(temp.path());
        assert_eq!(site.menu().unwrap()[1].label, "React");

        fs::write(
            temp.path().join("site.toml"),
            "[[main_menu]]\nlabel = \"React 专区\"\nvalue = \"react\"\n",
        )
        .unwrap();

        assert_eq!(site.menu().unwrap()[0].label, "React 专区");
    }

    #[test]
    fn test_broken_settings_fall_back_to_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let site = create_site(temp.path());
        fs::write(temp.path().join("site.toml"), "not = [valid").unwrap();

        let values: Vec<String> = site.menu().unwrap().into_iter().map(|n| n.value).collect();

        assert_eq!(values, vec!["home", "react", "vue", "next"]);
    }

    #[test]
    fn test_route_redirect_rules() {
        let temp = tempfile::tempdir().unwrap();
        let site = create_site(temp.path());

        assert_eq!(
            site.route("/").unwrap(),
            Route::Redirect(RedirectTarget {
                location: "/home".to_owned(),
                status: 302,
                external: false,
            })
        );
        assert_eq!(
            site.route("/old").unwrap(),
            Route::Redirect(RedirectTarget {
                location: "/react".to_owned(),
                status: 301,
                external: false,
            })
        );
        assert!(matches!(
            site.route("/github").unwrap(),
            Route::Redirect(RedirectTarget { external: true, .. })
        ));
    }

    #[test]
    fn test_route_rules_match_exact_path() {
        let temp = tempfile::tempdir().unwrap();
        let site = create_site(temp.path());

        // "/old/" is not the rule's path; it does not resolve either
        assert_eq!(
            site.route("/old/").unwrap(),
            Route::Fallback(RedirectTarget::temporary("/home"))
        );
    }

    #[test]
    fn test_route_resolves_pages() {
        let temp = tempfile::tempdir().unwrap();
        let site = create_site(temp.path());

        let Route::Page(Ok(resolution)) = site.route("/react/开始学习/environment-setup").unwrap()
        else {
            panic!("expected a resolved page");
        };
        assert_eq!(resolution.document.slug, "react/开始学习/环境搭建");
        assert!(matches!(site.route("/home").unwrap(), Route::Page(Ok(_))));
    }

    #[test]
    fn test_route_fallback_for_unknown_paths_only() {
        let temp = tempfile::tempdir().unwrap();
        let site = create_site(temp.path());

        assert_eq!(
            site.route("/nowhere").unwrap(),
            Route::Fallback(RedirectTarget::temporary("/home"))
        );
        assert!(matches!(site.route("/react").unwrap(), Route::Page(Ok(_))));
    }

    #[test]
    fn test_route_fallback_skips_its_own_target() {
        let temp = tempfile::tempdir().unwrap();
        let site = create_site(temp.path());
        fs::remove_file(temp.path().join("home/index.md")).unwrap();

        assert!(matches!(
            site.route("/home").unwrap(),
            Route::Page(Err(ResolveError::ContentMissing { .. }))
        ));
    }

    #[test]
    fn test_route_fallback_disabled() {
        let temp = tempfile::tempdir().unwrap();
        let site = create_site(temp.path());
        fs::write(
            temp.path().join("site.toml"),
            "[redirects.fallback]\nenabled = false\n",
        )
        .unwrap();

        assert!(matches!(
            site.route("/nowhere").unwrap(),
            Route::Page(Err(ResolveError::PageNotFound { .. }))
        ));
    }

    #[test]
    fn test_breadcrumbs() {
        let temp = tempfile::tempdir().unwrap();
        let site = create_site(temp.path());

        let crumbs = site.breadcrumbs("/react/开始学习/environment-setup/").unwrap();

        let labels: Vec<&str> = crumbs.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["React", "开始学习"]);
    }

    #[test]
    fn test_search_with_limit() {
        let mut storage = MockStorage::new();
        for i in 0..5 {
            storage = storage.with_page(format!("react/p{i}"), "React page");
        }
        let site = Site::new(Arc::new(storage), PathBuf::from("/nonexistent/site.toml"))
            .with_search_limit(3);

        let hits = site.search("react").unwrap();

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].slug, "react/p0");
    }

    #[test]
    fn test_storage_failure_propagates() {
        let storage = MockStorage::new().with_failure(StorageErrorKind::Unavailable);
        let site = Site::new(Arc::new(storage), PathBuf::from("/nonexistent/site.toml"));

        assert!(site.menu().is_err());
        assert!(matches!(site.resolve("/react"), Err(SiteError::Storage(_))));
        assert!(site.search("react").is_err());
        assert!(site.route("/react").is_err());
    }

    #[test]
    fn test_mock_storage_default_sections() {
        let mut home = PageData::new("首页");
        home.order = 1;
        let storage = MockStorage::new()
            .with_document(Document::new("home/index", home, "welcome"))
            .with_page("vue/intro", "Vue Intro");
        let site = Site::new(Arc::new(storage), PathBuf::from("/nonexistent/site.toml"));

        let root = site.resolve("/").unwrap();
        assert_eq!(root.found_by, FoundBy::Root);
        assert_eq!(root.document.body, "welcome");
        assert_eq!(site.resolve("/vue/intro").unwrap().found_by, FoundBy::MenuTree);
    }
}

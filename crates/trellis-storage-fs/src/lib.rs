//! Filesystem storage implementation for the trellis engine.
//!
//! This crate provides [`FsStorage`], a filesystem-based implementation of the
//! [`Storage`](trellis_storage::Storage) trait. It handles:
//!
//! - Recursive directory scanning for markdown files
//! - Front matter parsing with mtime caching
//! - Direct slug lookups without a full scan
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use trellis_storage::Storage;
//! use trellis_storage_fs::FsStorage;
//!
//! let storage = FsStorage::new(PathBuf::from("content"));
//! for doc in storage.list_visible()? {
//!     println!("{}: {}", doc.slug, doc.data.title);
//! }
//! ```

mod scanner;

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::SystemTime;

use scanner::{DocumentRef, Scanner};
use trellis_storage::{Document, Storage, StorageError, StorageErrorKind, parse_document};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Parsed document cached against the file's modification time.
#[derive(Clone, Debug)]
struct CachedDocument {
    mtime: SystemTime,
    document: Document,
}

/// Filesystem storage implementation.
///
/// Scans a source directory recursively for markdown files with YAML front
/// matter. Uses mtime caching to avoid re-parsing unchanged files.
pub struct FsStorage {
    /// Root directory for document storage.
    source_dir: PathBuf,
    /// Scanner for document discovery.
    scanner: Scanner,
    /// Mtime cache keyed by absolute file path.
    mtime_cache: Mutex<HashMap<PathBuf, CachedDocument>>,
}

impl FsStorage {
    /// Create a new filesystem storage rooted at `source_dir`.
    #[must_use]
    pub fn new(source_dir: PathBuf) -> Self {
        Self {
            scanner: Scanner::new(source_dir.clone()),
            source_dir,
            mtime_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Root directory of the content collection.
    #[must_use]
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Reject slugs that could escape the source directory.
    fn validate_slug(slug: &str) -> Result<(), StorageError> {
        let bad = slug.is_empty()
            || slug
                .split('/')
                .any(|segment| segment.is_empty() || segment == "." || segment == "..")
            || slug.contains('\\');
        if bad {
            return Err(StorageError::new(StorageErrorKind::InvalidPath)
                .with_path(slug)
                .with_backend(BACKEND));
        }
        Ok(())
    }

    /// Load a document, reusing the cached parse when the mtime is unchanged.
    fn load(&self, doc_ref: &DocumentRef) -> Result<Document, StorageError> {
        let mtime = fs::metadata(&doc_ref.path)
            .and_then(|m| m.modified())
            .map_err(|e| StorageError::io(e, Some(doc_ref.path.clone())).with_backend(BACKEND))?;

        {
            let cache = self
                .mtime_cache
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(cached) = cache.get(&doc_ref.path).filter(|c| c.mtime == mtime) {
                return Ok(cached.document.clone());
            }
        }

        let raw = fs::read_to_string(&doc_ref.path)
            .map_err(|e| StorageError::io(e, Some(doc_ref.path.clone())).with_backend(BACKEND))?;
        let document = parse_document(&doc_ref.slug, &raw)
            .map_err(|e| e.with_path(&doc_ref.path).with_backend(BACKEND))?;

        self.mtime_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                doc_ref.path.clone(),
                CachedDocument {
                    mtime,
                    document: document.clone(),
                },
            );

        Ok(document)
    }

    /// Drop cache entries for files that no longer exist.
    fn prune_cache(&self, refs: &[DocumentRef]) {
        let live: HashSet<&Path> = refs.iter().map(|r| r.path.as_path()).collect();
        self.mtime_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|path, _| live.contains(path.as_path()));
    }
}

impl Storage for FsStorage {
    /// Scan the source directory.
    ///
    /// Files with unreadable or invalid front matter are skipped with a
    /// warning instead of failing the scan.
    fn scan(&self) -> Result<Vec<Document>, StorageError> {
        let refs = self.scanner.scan()?;

        let documents = refs
            .iter()
            .filter_map(|doc_ref| match self.load(doc_ref) {
                Ok(document) => Some(document),
                Err(e) => {
                    tracing::warn!(slug = %doc_ref.slug, error = %e, "Skipping document");
                    None
                }
            })
            .collect::<Vec<_>>();

        self.prune_cache(&refs);
        tracing::debug!(count = documents.len(), "Scanned content directory");

        Ok(documents)
    }

    fn get_by_slug(&self, slug: &str) -> Result<Option<Document>, StorageError> {
        Self::validate_slug(slug)?;

        let path = self.source_dir.join(format!("{slug}.md"));
        if !path.is_file() {
            return Ok(None);
        }

        let document = self.load(&DocumentRef {
            slug: slug.to_owned(),
            path,
        })?;
        Ok(document.is_visible().then_some(document))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn write_page(root: &Path, rel: &str, front_matter: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, format!("---\n{front_matter}\ncreatedAt: 2024-01-01\n---\nBody of {rel}\n")).unwrap();
    }

    #[test]
    fn test_scan_parses_documents() {
        let temp = tempfile::tempdir().unwrap();
        write_page(temp.path(), "react/index.md", "title: React\norder: 1");
        write_page(temp.path(), "react/guide/setup.md", "title: Setup\npageName: environment-setup");

        let storage = FsStorage::new(temp.path().to_path_buf());
        let docs = storage.scan().unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].slug, "react/guide/setup");
        assert_eq!(docs[0].data.page_name.as_deref(), Some("environment-setup"));
        assert_eq!(docs[1].slug, "react/index");
        assert_eq!(docs[1].data.order, 1);
        assert_eq!(docs[1].body, "Body of react/index.md\n");
    }

    #[test]
    fn test_scan_skips_invalid_front_matter() {
        let temp = tempfile::tempdir().unwrap();
        write_page(temp.path(), "react/good.md", "title: Good");
        fs::write(temp.path().join("react/bad.md"), "no front matter here").unwrap();

        let storage = FsStorage::new(temp.path().to_path_buf());
        let docs = storage.scan().unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].slug, "react/good");
    }

    #[test]
    fn test_scan_missing_source_dir() {
        let storage = FsStorage::new(PathBuf::from("/nonexistent/trellis/content"));

        assert!(storage.scan().unwrap().is_empty());
    }

    #[test]
    fn test_list_visible_excludes_drafts() {
        let temp = tempfile::tempdir().unwrap();
        write_page(temp.path(), "react/a.md", "title: A\norder: 5");
        write_page(temp.path(), "react/b.md", "title: B\ndraft: true");
        write_page(temp.path(), "react/c.md", "title: C\norder: 1");

        let storage = FsStorage::new(temp.path().to_path_buf());
        let slugs: Vec<String> = storage
            .list_visible()
            .unwrap()
            .into_iter()
            .map(|d| d.slug)
            .collect();

        assert_eq!(slugs, vec!["react/c", "react/a"]);
    }

    #[test]
    fn test_get_by_slug_reads_single_file() {
        let temp = tempfile::tempdir().unwrap();
        write_page(temp.path(), "react/开始学习/环境搭建.md", "title: 环境搭建");

        let storage = FsStorage::new(temp.path().to_path_buf());
        let doc = storage.get_by_slug("react/开始学习/环境搭建").unwrap().unwrap();

        assert_eq!(doc.data.title, "环境搭建");
        assert!(storage.get_by_slug("react/missing").unwrap().is_none());
    }

    #[test]
    fn test_get_by_slug_hides_unpublished() {
        let temp = tempfile::tempdir().unwrap();
        write_page(temp.path(), "react/wip.md", "title: WIP\npublished: false");

        let storage = FsStorage::new(temp.path().to_path_buf());

        assert!(storage.get_by_slug("react/wip").unwrap().is_none());
    }

    #[test]
    fn test_get_by_slug_rejects_traversal() {
        let storage = FsStorage::new(PathBuf::from("/content"));

        for slug in ["../etc/passwd", "react//x", "", "react/./x"] {
            let err = storage.get_by_slug(slug).unwrap_err();
            assert_eq!(err.kind, StorageErrorKind::InvalidPath, "slug {slug:?}");
        }
    }

    #[test]
    fn test_cache_reused_until_file_changes() {
        let temp = tempfile::tempdir().unwrap();
        write_page(temp.path(), "react/a.md", "title: First");

        let storage = FsStorage::new(temp.path().to_path_buf());
        assert_eq!(storage.scan().unwrap()[0].data.title, "First");
        assert_eq!(storage.mtime_cache.lock().unwrap().len(), 1);

        fs::remove_file(temp.path().join("react/a.md")).unwrap();
        assert!(storage.scan().unwrap().is_empty());
        assert!(storage.mtime_cache.lock().unwrap().is_empty());
    }
}

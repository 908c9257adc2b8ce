//! Storage trait and error types.
//!
//! Provides the core [`Storage`] trait for abstracting document listing and lookup,
//! along with [`StorageError`] for unified error handling across backends.
//!
//! # Slug Convention
//!
//! All slug parameters are store-internal identifiers, not public URLs:
//! - `"home/index"` - landing page of the `home` section
//! - `"react/demo"` - page directly under a section
//! - `"react/guide/setup"` - page inside a sub-section
//!
//! The public URL of a document may differ from its slug (see `pageName`).

use std::path::PathBuf;

use crate::document::Document;

/// Semantic error categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageErrorKind {
    /// Resource does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Invalid slug or path.
    InvalidPath,
    /// Front matter is missing or malformed.
    InvalidFrontMatter,
    /// Backend is temporarily unavailable.
    Unavailable,
    /// Operation timed out.
    Timeout,
    /// Other/unknown error category.
    Other,
}

/// Storage error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct StorageError {
    /// Semantic error category.
    pub kind: StorageErrorKind,
    /// Path context (if applicable).
    pub path: Option<PathBuf>,
    /// Backend identifier (e.g., "Fs", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    /// Create a new storage error.
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Downcast the source error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_ref()?.downcast_ref()
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(StorageErrorKind::NotFound).with_path(path)
    }

    /// Create a storage error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: Option<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => StorageErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => StorageErrorKind::PermissionDenied,
            std::io::ErrorKind::TimedOut => StorageErrorKind::Timeout,
            _ => StorageErrorKind::Other,
        };
        let mut error = Self::new(kind).with_source(err);
        if let Some(p) = path {
            error = error.with_path(p);
        }
        error
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (path: /foo/bar)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StorageErrorKind::NotFound => "Not found",
            StorageErrorKind::PermissionDenied => "Permission denied",
            StorageErrorKind::InvalidPath => "Invalid path",
            StorageErrorKind::InvalidFrontMatter => "Invalid front matter",
            StorageErrorKind::Unavailable => "Unavailable",
            StorageErrorKind::Timeout => "Timeout",
            StorageErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Content store abstraction.
///
/// Provides a unified interface for accessing documents regardless of backend.
/// Only [`scan`](Storage::scan) is required; the visibility filter and slug
/// lookup have default implementations on top of it.
pub trait Storage: Send + Sync {
    /// Scan and return all documents, drafts and unpublished ones included.
    ///
    /// Backends must return documents in a deterministic order: the order is
    /// the tie-breaker for equal `order` values further down the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if scanning fails (e.g., permission denied,
    /// backend unavailable).
    fn scan(&self) -> Result<Vec<Document>, StorageError>;

    /// Return visible documents sorted by `order` ascending.
    ///
    /// The sort is stable: documents with equal `order` keep scan order.
    fn list_visible(&self) -> Result<Vec<Document>, StorageError> {
        let mut documents: Vec<Document> = self
            .scan()?
            .into_iter()
            .filter(Document::is_visible)
            .collect();
        documents.sort_by_key(|doc| doc.data.order);
        Ok(documents)
    }

    /// Look up a visible document by slug.
    ///
    /// Returns `Ok(None)` when no visible document carries the slug.
    fn get_by_slug(&self, slug: &str) -> Result<Option<Document>, StorageError> {
        Ok(self
            .scan()?
            .into_iter()
            .find(|doc| doc.slug == slug && doc.is_visible()))
    }
}

//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem access.

use crate::document::{Document, PageData};
use crate::storage::{Storage, StorageError, StorageErrorKind};

/// Mock storage for testing.
///
/// Stores documents in memory, in insertion order. Use the builder methods
/// to configure the mock with test data.
///
/// # Example
///
/// ```ignore
/// use trellis_storage::{MockStorage, Storage};
///
/// let storage = MockStorage::new()
///     .with_page("react/index", "React")
///     .with_page("react/guide/setup", "Setup");
///
/// let docs = storage.list_visible().unwrap();
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    documents: Vec<Document>,
    failure: Option<StorageErrorKind>,
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fully specified document.
    #[must_use]
    pub fn with_document(mut self, document: Document) -> Self {
        self.documents.push(document);
        self
    }

    /// Add a document with default front matter and an empty body.
    #[must_use]
    pub fn with_page(self, slug: impl Into<String>, title: impl Into<String>) -> Self {
        self.with_document(Document::new(slug, PageData::new(title), ""))
    }

    /// Make every scan fail with the given error kind.
    #[must_use]
    pub fn with_failure(mut self, kind: StorageErrorKind) -> Self {
        self.failure = Some(kind);
        self
    }
}

impl Storage for MockStorage {
    fn scan(&self) -> Result<Vec<Document>, StorageError> {
        if let Some(kind) = self.failure {
            return Err(StorageError::new(kind).with_backend("Mock"));
        }
        Ok(self.documents.clone())
    }
}

//! Content store abstraction for the trellis engine.
//!
//! This crate provides a [`Storage`] trait for listing the documents of a
//! content collection and looking them up by slug. It also owns the document
//! model shared by every other crate:
//!
//! - [`Document`]: slug, front matter ([`PageData`]) and raw markdown body
//! - [`parse_document`]: front matter splitting and YAML parsing
//! - [`ReadingStats`]: reading-time and word-count estimation
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Storage`] trait with `scan()`, `list_visible()` and `get_by_slug()` methods
//! - [`MockStorage`] for testing (behind `mock` feature flag)
//!
//! The filesystem backend lives in `trellis-storage-fs`.
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

mod document;
#[cfg(feature = "mock")]
mod mock;
mod reading;
mod storage;

pub use document::{
    DEFAULT_ORDER, Document, FrontMatterError, INDEX_SEGMENT, PageData, parse_document,
    split_front_matter,
};
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use reading::ReadingStats;
pub use storage::{Storage, StorageError, StorageErrorKind};

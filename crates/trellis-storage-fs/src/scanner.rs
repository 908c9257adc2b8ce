//! Document discovery by filesystem walking.
//!
//! This module separates the discovery phase (finding files) from the parsing
//! phase (building Documents). The Scanner only identifies markdown files,
//! returning lightweight references for `FsStorage` to process.

use std::fs;
use std::path::{Path, PathBuf};

use trellis_storage::StorageError;

/// Markdown file extension.
const MARKDOWN_EXTENSION: &str = "md";

/// Reference to a document's source file.
///
/// Contains only the file location - no content is read at this stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DocumentRef {
    /// Slug derived from the relative path (e.g., "react/guide/setup").
    pub slug: String,
    /// Absolute path to the markdown file.
    pub path: PathBuf,
}

/// Discovers document references by walking the filesystem.
pub(crate) struct Scanner {
    source_dir: PathBuf,
}

impl Scanner {
    pub fn new(source_dir: PathBuf) -> Self {
        Self { source_dir }
    }

    /// Scan filesystem and return document references in path order.
    ///
    /// Returns an empty Vec if the source directory doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the source directory exists but cannot be read.
    /// Unreadable subdirectories are skipped with a warning.
    pub fn scan(&self) -> Result<Vec<DocumentRef>, StorageError> {
        let mut refs = Vec::new();
        if !self.source_dir.exists() {
            return Ok(refs);
        }

        let entries = read_sorted(&self.source_dir)
            .map_err(|e| StorageError::io(e, Some(self.source_dir.clone())))?;
        self.scan_entries(entries, "", &mut refs);
        Ok(refs)
    }

    fn scan_directory(&self, dir_path: &Path, slug_prefix: &str, refs: &mut Vec<DocumentRef>) {
        match read_sorted(dir_path) {
            Ok(entries) => self.scan_entries(entries, slug_prefix, refs),
            Err(e) => {
                tracing::warn!(path = %dir_path.display(), error = %e, "Skipping unreadable directory");
            }
        }
    }

    fn scan_entries(
        &self,
        entries: Vec<(PathBuf, bool)>,
        slug_prefix: &str,
        refs: &mut Vec<DocumentRef>,
    ) {
        for (path, is_dir) in entries {
            let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            // Skip hidden files/dirs
            if name.starts_with('.') {
                continue;
            }

            if is_dir {
                let child_prefix = join_slug(slug_prefix, &name);
                self.scan_directory(&path, &child_prefix, refs);
            } else if path.extension().is_some_and(|e| e == MARKDOWN_EXTENSION) {
                let stem = name
                    .strip_suffix(".md")
                    .unwrap_or(&name);
                refs.push(DocumentRef {
                    slug: join_slug(slug_prefix, stem),
                    path,
                });
            }
        }
    }
}

/// List a directory as `(path, is_dir)` pairs sorted by path.
fn read_sorted(dir: &Path) -> std::io::Result<Vec<(PathBuf, bool)>> {
    let mut entries: Vec<(PathBuf, bool)> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|e| {
            let is_dir = e.file_type().is_ok_and(|t| t.is_dir());
            (e.path(), is_dir)
        })
        .collect();
    entries.sort();
    Ok(entries)
}

fn join_slug(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_owned()
    } else {
        format!("{prefix}/{segment}")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn slugs(refs: &[DocumentRef]) -> Vec<&str> {
        refs.iter().map(|r| r.slug.as_str()).collect()
    }

    #[test]
    fn test_scan_missing_dir_is_empty() {
        let scanner = Scanner::new(PathBuf::from("/nonexistent/trellis/content"));

        assert!(scanner.scan().unwrap().is_empty());
    }

    #[test]
    fn test_scan_nested_markdown() {
        let temp = tempfile::tempdir().unwrap();
        touch(temp.path(), "react/index.md");
        touch(temp.path(), "react/guide/index.md");
        touch(temp.path(), "react/guide/setup.md");
        touch(temp.path(), "home/index.md");

        let refs = Scanner::new(temp.path().to_path_buf()).scan().unwrap();

        assert_eq!(
            slugs(&refs),
            vec!["home/index", "react/guide/index", "react/guide/setup", "react/index"]
        );
    }

    #[test]
    fn test_scan_skips_hidden_and_non_markdown() {
        let temp = tempfile::tempdir().unwrap();
        touch(temp.path(), ".drafts/secret.md");
        touch(temp.path(), "react/.hidden.md");
        touch(temp.path(), "react/logo.png");
        touch(temp.path(), "site.toml");
        touch(temp.path(), "react/demo.md");

        let refs = Scanner::new(temp.path().to_path_buf()).scan().unwrap();

        assert_eq!(slugs(&refs), vec!["react/demo"]);
    }

    #[test]
    fn test_scan_keeps_unicode_segments() {
        let temp = tempfile::tempdir().unwrap();
        touch(temp.path(), "react/开始学习/环境搭建.md");

        let refs = Scanner::new(temp.path().to_path_buf()).scan().unwrap();

        assert_eq!(slugs(&refs), vec!["react/开始学习/环境搭建"]);
    }
}

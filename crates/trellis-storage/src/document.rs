//! Document model and front matter parsing.
//!
//! A document is a markdown file with a `---`-delimited YAML front matter
//! block. The front matter deserializes into [`PageData`]; everything after
//! the closing delimiter is the body.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::reading::ReadingStats;
use crate::storage::{StorageError, StorageErrorKind};

/// Order assigned to documents and groups that do not declare one.
pub const DEFAULT_ORDER: i64 = 999;

/// Final slug segment marking a group's landing document.
pub const INDEX_SEGMENT: &str = "index";

const DEFAULT_AUTHOR: &str = "Fanmu";

const FRONT_MATTER_DELIMITER: &str = "---";

/// Front matter of a document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Public URL segment replacing the slug's last segment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_name: Option<String>,
    #[serde(default = "default_order")]
    pub order: i64,
    #[serde(default)]
    pub draft: bool,
    #[serde(default = "default_true")]
    pub published: bool,
    #[serde(deserialize_with = "deserialize_date")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_true")]
    pub show_in_menu: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_description: Option<String>,
    /// Estimated reading time in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u32>,
}

fn default_order() -> i64 {
    DEFAULT_ORDER
}

fn default_true() -> bool {
    true
}

fn default_author() -> String {
    DEFAULT_AUTHOR.to_owned()
}

impl PageData {
    /// Front matter with the given title and every other field at its default.
    ///
    /// `created_at` is the Unix epoch.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            page_name: None,
            order: DEFAULT_ORDER,
            draft: false,
            published: true,
            created_at: DateTime::default(),
            updated_at: None,
            author: default_author(),
            tags: Vec::new(),
            show_in_menu: true,
            menu_label: None,
            icon: None,
            seo_title: None,
            seo_description: None,
            reading_time: None,
            word_count: None,
        }
    }
}

/// Parse a date given either as RFC 3339 or as a bare `YYYY-MM-DD`.
fn parse_date(value: &str) -> Result<DateTime<Utc>, String> {
    let value = value.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    Err(format!(
        "invalid date `{value}`: expected YYYY-MM-DD or RFC 3339"
    ))
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(D::Error::custom)
}

fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| parse_date(&raw))
        .transpose()
        .map_err(D::Error::custom)
}

/// A content document: slug, front matter and markdown body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Document {
    /// Slash-delimited store identifier (e.g., "react/guide/setup").
    pub slug: String,
    pub data: PageData,
    /// Raw markdown after the front matter block.
    pub body: String,
}

impl Document {
    #[must_use]
    pub fn new(slug: impl Into<String>, data: PageData, body: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            data,
            body: body.into(),
        }
    }

    /// Slug segments in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.slug.split('/')
    }

    /// Number of slug segments.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// A document is visible when it is published and not a draft.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.data.published && !self.data.draft
    }

    /// Last slug segment (the source filename without extension).
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.slug.rsplit('/').next().unwrap_or(&self.slug)
    }

    /// True when the last slug segment is the `index` marker.
    #[must_use]
    pub fn is_index(&self) -> bool {
        self.file_name() == INDEX_SEGMENT
    }

    /// Menu label: `menuLabel`, then `title`.
    ///
    /// Empty strings count as absent.
    #[must_use]
    pub fn menu_label(&self) -> &str {
        self.data
            .menu_label
            .as_deref()
            .filter(|label| !label.is_empty())
            .unwrap_or(&self.data.title)
    }

    /// Public URL segment: `pageName`, then the slug's last segment.
    ///
    /// Empty strings count as absent.
    #[must_use]
    pub fn url_segment(&self) -> &str {
        self.data
            .page_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.file_name())
    }
}

/// Error raised while reading a front matter block.
#[derive(Debug, thiserror::Error)]
pub enum FrontMatterError {
    /// The file does not start with a `---` block.
    #[error("missing front matter block")]
    Missing,
    /// The block is not valid YAML for [`PageData`].
    #[error("{0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Split raw file content into `(front_matter, body)`.
///
/// Returns `None` if the content does not open with a `---` line or the block
/// is never closed.
#[must_use]
pub fn split_front_matter(raw: &str) -> Option<(&str, &str)> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let rest = raw.strip_prefix(FRONT_MATTER_DELIMITER)?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FRONT_MATTER_DELIMITER {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Parse a document from raw file content.
///
/// Reading time and word count are estimated from the body when the front
/// matter does not set them.
///
/// # Errors
///
/// Returns a [`StorageErrorKind::InvalidFrontMatter`] error when the front
/// matter is missing or does not deserialize.
pub fn parse_document(slug: &str, raw: &str) -> Result<Document, StorageError> {
    let invalid =
        |err: FrontMatterError| StorageError::new(StorageErrorKind::InvalidFrontMatter).with_source(err);

    let (front_matter, body) = split_front_matter(raw).ok_or_else(|| invalid(FrontMatterError::Missing))?;
    let mut data: PageData =
        serde_yaml::from_str(front_matter).map_err(|e| invalid(FrontMatterError::Yaml(e)))?;

    if data.reading_time.is_none() || data.word_count.is_none() {
        let stats = ReadingStats::estimate(body);
        data.reading_time.get_or_insert(stats.minutes);
        data.word_count.get_or_insert(stats.words);
    }

    Ok(Document::new(slug, data, body))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SETUP: &str = "---
title: 环境搭建
pageName: environment-setup
order: 2
createdAt: 2024-03-01
tags: [react, setup]
---
# 环境搭建

Install node first.
";

    #[test]
    fn test_parse_document_reads_front_matter() {
        let doc = parse_document("react/开始学习/环境搭建", SETUP).unwrap();

        assert_eq!(doc.slug, "react/开始学习/环境搭建");
        assert_eq!(doc.data.title, "环境搭建");
        assert_eq!(doc.data.page_name.as_deref(), Some("environment-setup"));
        assert_eq!(doc.data.order, 2);
        assert_eq!(doc.data.tags, vec!["react", "setup"]);
        assert_eq!(doc.data.created_at.to_rfc3339(), "2024-03-01T00:00:00+00:00");
        assert!(doc.body.starts_with("# 环境搭建"));
    }

    #[test]
    fn test_parse_document_applies_defaults() {
        let raw = "---\ntitle: Intro\ncreatedAt: 2024-01-01T08:30:00Z\n---\nBody";
        let doc = parse_document("react/intro", raw).unwrap();

        assert_eq!(doc.data.order, DEFAULT_ORDER);
        assert!(!doc.data.draft);
        assert!(doc.data.published);
        assert!(doc.data.show_in_menu);
        assert_eq!(doc.data.author, "Fanmu");
        assert!(doc.data.tags.is_empty());
        assert!(doc.data.updated_at.is_none());
    }

    #[test]
    fn test_parse_document_fills_reading_stats() {
        let doc = parse_document("react/intro", "---\ntitle: Intro\ncreatedAt: 2024-01-01\n---\none two three").unwrap();

        assert_eq!(doc.data.word_count, Some(3));
        assert_eq!(doc.data.reading_time, Some(1));
    }

    #[test]
    fn test_parse_document_keeps_declared_reading_stats() {
        let raw = "---\ntitle: Intro\ncreatedAt: 2024-01-01\nreadingTime: 7\nwordCount: 1400\n---\nshort";
        let doc = parse_document("react/intro", raw).unwrap();

        assert_eq!(doc.data.reading_time, Some(7));
        assert_eq!(doc.data.word_count, Some(1400));
    }

    #[test]
    fn test_parse_document_without_front_matter() {
        let err = parse_document("react/intro", "# Just markdown").unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::InvalidFrontMatter);
        assert!(matches!(
            err.downcast_source::<FrontMatterError>(),
            Some(FrontMatterError::Missing)
        ));
    }

    #[test]
    fn test_parse_document_missing_title() {
        let err = parse_document("react/intro", "---\ncreatedAt: 2024-01-01\n---\n").unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::InvalidFrontMatter);
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn test_parse_document_rejects_bad_date() {
        let err = parse_document("react/intro", "---\ntitle: X\ncreatedAt: yesterday\n---\n").unwrap_err();

        assert!(err.to_string().contains("invalid date"));
    }

    #[test]
    fn test_split_front_matter_crlf() {
        let (front, body) = split_front_matter("---\r\ntitle: X\r\n---\r\nbody").unwrap();

        assert_eq!(front, "title: X\r\n");
        assert_eq!(body, "body");
    }

    #[test]
    fn test_split_front_matter_unclosed() {
        assert!(split_front_matter("---\ntitle: X\n").is_none());
    }

    #[test]
    fn test_url_segment_precedence() {
        let mut data = PageData::new("Setup");
        let doc = Document::new("react/guide/setup", data.clone(), "");
        assert_eq!(doc.url_segment(), "setup");

        data.page_name = Some(String::new());
        let doc = Document::new("react/guide/setup", data.clone(), "");
        assert_eq!(doc.url_segment(), "setup");

        data.page_name = Some("environment-setup".to_owned());
        let doc = Document::new("react/guide/setup", data, "");
        assert_eq!(doc.url_segment(), "environment-setup");
    }

    #[test]
    fn test_menu_label_precedence() {
        let mut data = PageData::new("Long Title");
        assert_eq!(Document::new("a/b", data.clone(), "").menu_label(), "Long Title");

        data.menu_label = Some("Short".to_owned());
        assert_eq!(Document::new("a/b", data, "").menu_label(), "Short");
    }

    #[test]
    fn test_index_and_depth() {
        let doc = Document::new("react/guide/index", PageData::new("Guide"), "");

        assert!(doc.is_index());
        assert_eq!(doc.depth(), 3);
        assert_eq!(doc.segments().collect::<Vec<_>>(), vec!["react", "guide", "index"]);
        assert!(!Document::new("react/indexing", PageData::new("X"), "").is_index());
    }

    #[test]
    fn test_page_data_serializes_camel_case() {
        let mut data = PageData::new("Setup");
        data.page_name = Some("environment-setup".to_owned());

        let json = serde_json::to_value(&data).unwrap();

        assert_eq!(json["pageName"], "environment-setup");
        assert_eq!(json["showInMenu"], true);
        assert_eq!(json["createdAt"], "1970-01-01T00:00:00Z");
        assert!(json.get("menuLabel").is_none());
    }
}

//! Full-text search over document metadata.
//!
//! Every whitespace-separated term must appear (case-insensitively) in the
//! title, description, tags, author or slug. Matches are ranked by where the
//! terms hit; bodies are not searched.

use chrono::{DateTime, Utc};
use serde::Serialize;
use trellis_storage::{Document, INDEX_SEGMENT};

/// Default number of hits returned.
pub const DEFAULT_LIMIT: usize = 20;

const TITLE_EXACT_SCORE: u32 = 10;
const TITLE_MATCH_SCORE: u32 = 5;
const TAG_MATCH_SCORE: u32 = 3;
const DESCRIPTION_MATCH_SCORE: u32 = 2;

/// A search result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub tags: Vec<String>,
    /// Public path of the document.
    pub path: String,
    pub slug: String,
}

impl SearchHit {
    fn from_document(doc: &Document) -> Self {
        Self {
            title: doc.data.title.clone(),
            description: doc.data.description.clone(),
            author: doc.data.author.clone(),
            created_at: doc.data.created_at,
            tags: doc.data.tags.clone(),
            path: public_path(&doc.slug),
            slug: doc.slug.clone(),
        }
    }
}

/// Public path for a slug: index documents map to their group path.
///
/// `react/index` → `/react`, `react/guide/index` → `/react/guide`, anything
/// else → `/<slug>`.
#[must_use]
pub fn public_path(slug: &str) -> String {
    let segments: Vec<&str> = slug.split('/').collect();
    match segments.as_slice() {
        [section, INDEX_SEGMENT] => format!("/{section}"),
        [section, group, INDEX_SEGMENT] => format!("/{section}/{group}"),
        _ => format!("/{slug}"),
    }
}

/// Lowercased text every term must be found in.
fn haystack(doc: &Document) -> String {
    [
        doc.data.title.as_str(),
        doc.data.description.as_deref().unwrap_or_default(),
        doc.data.tags.join(" ").as_str(),
        doc.data.author.as_str(),
        doc.slug.replace('/', " ").as_str(),
    ]
    .join(" ")
    .to_lowercase()
}

fn score(doc: &Document, terms: &[String]) -> u32 {
    let title = doc.data.title.to_lowercase();
    let description = doc
        .data
        .description
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();
    let tags: Vec<String> = doc.data.tags.iter().map(|t| t.to_lowercase()).collect();

    terms
        .iter()
        .map(|term| {
            let mut points = 0;
            if title.contains(term.as_str()) {
                points += if title == *term {
                    TITLE_EXACT_SCORE
                } else {
                    TITLE_MATCH_SCORE
                };
            }
            if description.contains(term.as_str()) {
                points += DESCRIPTION_MATCH_SCORE;
            }
            if tags.iter().any(|tag| tag.contains(term.as_str())) {
                points += TAG_MATCH_SCORE;
            }
            points
        })
        .sum()
}

/// Search visible, menu-listed documents.
///
/// Returns at most `limit` hits by descending score; equal scores keep
/// document order. A blank query returns nothing.
#[must_use]
pub fn search(documents: &[Document], query: &str, limit: usize) -> Vec<SearchHit> {
    let terms: Vec<String> = query.to_lowercase().split_whitespace().map(str::to_owned).collect();
    if terms.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(u32, &Document)> = documents
        .iter()
        .filter(|doc| doc.is_visible() && doc.data.show_in_menu)
        .filter(|doc| {
            let text = haystack(doc);
            terms.iter().all(|term| text.contains(term.as_str()))
        })
        .map(|doc| (score(doc, &terms), doc))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    tracing::debug!(query, matches = scored.len(), "Search completed");

    scored
        .into_iter()
        .take(limit)
        .map(|(_, doc)| SearchHit::from_document(doc))
        .collect()
}

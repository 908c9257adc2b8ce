//! Menu tree construction.
//!
//! The tree has at most three levels, mirroring the slug layout of the
//! content store:
//!
//! - `react/index` → landing page of the `react` section
//! - `react/demo` → leaf directly under the section
//! - `react/guide/index` → landing page of the `guide` group
//! - `react/guide/setup` → leaf inside the `guide` group
//!
//! Leaf paths use the document's `pageName` when set, so a file named in one
//! script can be published under a stable ASCII URL.
//!
//! Sections keep their configured label and order even when an index
//! document exists; only groups take label and order from their index.

use std::collections::HashMap;

use serde::Serialize;
use trellis_config::MainSectionConfig;
use trellis_storage::{DEFAULT_ORDER, Document};

/// Node of the navigation menu.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuNode {
    pub label: String,
    /// Key of the node among its siblings (section value, group key, or
    /// leaf URL segment).
    pub value: String,
    /// Canonical URL path (e.g., "/react/guide/environment-setup").
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub order: i64,
    pub children: Vec<MenuNode>,
    /// Whether the node has a landing (`index`) document.
    pub has_index: bool,
    #[serde(skip)]
    pub index_document: Option<Document>,
    /// Slug of the document backing this node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_slug: Option<String>,
}

impl MenuNode {
    fn group(label: &str, value: &str, path: String, order: i64) -> Self {
        Self {
            label: label.to_owned(),
            value: value.to_owned(),
            path,
            icon: None,
            order,
            children: Vec::new(),
            has_index: false,
            index_document: None,
            resolved_slug: None,
        }
    }

    fn leaf(document: &Document, path: String) -> Self {
        Self {
            label: document.menu_label().to_owned(),
            value: document.url_segment().to_owned(),
            path,
            icon: document.data.icon.clone(),
            order: document.data.order,
            children: Vec::new(),
            has_index: false,
            index_document: None,
            resolved_slug: Some(document.slug.clone()),
        }
    }

    /// Attach a landing document.
    fn set_index(&mut self, document: &Document) {
        self.has_index = true;
        self.resolved_slug = Some(document.slug.clone());
        self.index_document = Some(document.clone());
    }

    /// Slug of the backing document: the explicit slug, else the index
    /// document's slug.
    #[must_use]
    pub fn backing_slug(&self) -> Option<&str> {
        self.resolved_slug
            .as_deref()
            .or_else(|| self.index_document.as_ref().map(|doc| doc.slug.as_str()))
    }
}

/// Ancestor entry of a menu node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub label: String,
    pub path: String,
}

/// Groups keyed by value, kept in first-seen order.
///
/// A key seen for the first time creates its node; later documents with the
/// same key update that node in place.
#[derive(Default)]
struct GroupMap {
    nodes: Vec<MenuNode>,
    index: HashMap<String, usize>,
}

impl GroupMap {
    fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    fn insert(&mut self, key: &str, node: MenuNode) {
        self.index.insert(key.to_owned(), self.nodes.len());
        self.nodes.push(node);
    }

    fn get_or_insert_with(&mut self, key: &str, make: impl FnOnce() -> MenuNode) -> &mut MenuNode {
        let idx = match self.index.get(key) {
            Some(&idx) => idx,
            None => {
                self.insert(key, make());
                self.nodes.len() - 1
            }
        };
        &mut self.nodes[idx]
    }

    fn into_sorted(self) -> Vec<MenuNode> {
        let mut nodes = self.nodes;
        for node in &mut nodes {
            node.children.sort_by_key(|child| child.order);
        }
        nodes.sort_by_key(|node| node.order);
        nodes
    }
}

/// Build the menu tree from section configuration and documents.
///
/// Only visible documents are used. Documents are ordered by `order` (stable)
/// before grouping, and every sibling list is sorted by `order` (stable), so
/// equal orders keep input order.
///
/// Documents with a single slug segment or more than three are not part of
/// the menu and are skipped.
///
/// Section pages (two segments) are keyed by their URL segment, so when two
/// of them share a `pageName` only the first becomes a leaf. The other stays
/// reachable through its own slug path (see [`resolve`](crate::resolve::resolve)).
#[must_use]
pub fn build_menu_tree(sections: &[MainSectionConfig], documents: &[Document]) -> Vec<MenuNode> {
    let mut visible: Vec<&Document> = documents.iter().filter(|doc| doc.is_visible()).collect();
    visible.sort_by_key(|doc| doc.data.order);

    let mut sections: Vec<&MainSectionConfig> = sections.iter().collect();
    sections.sort_by_key(|section| section.order);

    let tree: Vec<MenuNode> = sections
        .into_iter()
        .map(|section| build_section(section, &visible))
        .collect();

    tracing::debug!(sections = tree.len(), documents = visible.len(), "Built menu tree");
    tree
}

fn build_section(section: &MainSectionConfig, documents: &[&Document]) -> MenuNode {
    let mut node = MenuNode {
        icon: section.icon.clone(),
        ..MenuNode::group(
            &section.label,
            &section.value,
            format!("/{}", section.value),
            section.order,
        )
    };

    let mut groups = GroupMap::default();

    for &doc in documents {
        let segments: Vec<&str> = doc.segments().collect();
        if segments[0] != section.value {
            continue;
        }

        match segments.as_slice() {
            [_, _] if doc.is_index() => {
                if !node.has_index {
                    node.set_index(doc);
                }
            }
            [section_key, _] => {
                if !doc.data.show_in_menu {
                    continue;
                }
                let key = doc.url_segment();
                if !groups.contains(key) {
                    groups.insert(key, MenuNode::leaf(doc, format!("/{section_key}/{key}")));
                }
            }
            [section_key, group_key, _] => {
                let group = groups.get_or_insert_with(group_key, || {
                    MenuNode::group(
                        group_key,
                        group_key,
                        format!("/{section_key}/{group_key}"),
                        DEFAULT_ORDER,
                    )
                });
                if doc.is_index() {
                    group.set_index(doc);
                    group.label = doc.menu_label().to_owned();
                    group.order = doc.data.order;
                } else if doc.data.show_in_menu {
                    let path = format!("/{section_key}/{group_key}/{}", doc.url_segment());
                    group.children.push(MenuNode::leaf(doc, path));
                }
            }
            _ => {
                tracing::debug!(slug = %doc.slug, depth = segments.len(), "Document outside menu depth, skipped");
            }
        }
    }

    node.children = groups.into_sorted();
    node
}

/// Find the node whose path equals `path` (depth-first, pre-order).
#[must_use]
pub fn find_menu_item_by_path<'a>(tree: &'a [MenuNode], path: &str) -> Option<&'a MenuNode> {
    tree.iter().find_map(|node| {
        if node.path == path {
            Some(node)
        } else {
            find_menu_item_by_path(&node.children, path)
        }
    })
}

/// All node paths in pre-order.
#[must_use]
pub fn collect_paths(tree: &[MenuNode]) -> Vec<String> {
    fn walk(nodes: &[MenuNode], out: &mut Vec<String>) {
        for node in nodes {
            out.push(node.path.clone());
            walk(&node.children, out);
        }
    }

    let mut paths = Vec::new();
    walk(tree, &mut paths);
    paths
}

/// Ancestors of the node at `path`, root first, excluding the node itself.
///
/// Returns an empty list when no node has that path.
#[must_use]
pub fn breadcrumbs(tree: &[MenuNode], path: &str) -> Vec<Breadcrumb> {
    fn walk<'a>(nodes: &'a [MenuNode], path: &str, trail: &mut Vec<&'a MenuNode>) -> bool {
        for node in nodes {
            if node.path == path {
                return true;
            }
            trail.push(node);
            if walk(&node.children, path, trail) {
                return true;
            }
            trail.pop();
        }
        false
    }

    let mut trail = Vec::new();
    if !walk(tree, path, &mut trail) {
        return Vec::new();
    }
    trail
        .into_iter()
        .map(|node| Breadcrumb {
            label: node.label.clone(),
            path: node.path.clone(),
        })
        .collect()
}

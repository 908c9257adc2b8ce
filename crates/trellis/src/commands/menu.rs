//! `trellis menu` command implementation.

use clap::Args;
use trellis_site::MenuNode;

use super::ContentArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the menu command.
#[derive(Args)]
pub(crate) struct MenuArgs {
    #[command(flatten)]
    content: ContentArgs,

    /// Print the tree as JSON (same shape as `GET /api/menu`).
    #[arg(long)]
    json: bool,
}

impl MenuArgs {
    /// Execute the menu command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or the content store fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let tree = self.content.site()?.menu()?;

        if self.json {
            let json = serde_json::to_string_pretty(&serde_json::json!({ "items": tree }))?;
            output.result(&json);
            return Ok(());
        }

        for line in render_tree(&tree) {
            output.result(&line);
        }
        Ok(())
    }
}

/// Render the tree as indented lines: `label  path [slug]`.
fn render_tree(tree: &[MenuNode]) -> Vec<String> {
    fn walk(nodes: &[MenuNode], depth: usize, lines: &mut Vec<String>) {
        for node in nodes {
            let slug = node
                .backing_slug()
                .map_or_else(|| "(no content)".to_owned(), |slug| format!("[{slug}]"));
            lines.push(format!(
                "{}{}  {}  {slug}",
                "  ".repeat(depth),
                node.label,
                node.path
            ));
            walk(&node.children, depth + 1, lines);
        }
    }

    let mut lines = Vec::new();
    walk(tree, 0, &mut lines);
    lines
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use trellis_config::MainSectionConfig;
    use trellis_site::build_menu_tree;
    use trellis_storage::{Document, PageData};

    use super::*;

    fn section(label: &str, value: &str, order: i64) -> MainSectionConfig {
        MainSectionConfig {
            label: label.to_owned(),
            value: value.to_owned(),
            icon: None,
            order,
        }
    }

    #[test]
    fn test_render_tree_indents_children() {
        let documents = vec![
            Document::new("react/index", PageData::new("React"), ""),
            Document::new("react/hooks", PageData::new("Hooks"), ""),
        ];
        let tree = build_menu_tree(
            &[section("React", "react", 1), section("Vue", "vue", 2)],
            &documents,
        );

        let lines = render_tree(&tree);

        assert_eq!(
            lines,
            vec![
                "React  /react  [react/index]".to_owned(),
                "  Hooks  /react/hooks  [react/hooks]".to_owned(),
                "Vue  /vue  (no content)".to_owned(),
            ]
        );
    }

    #[test]
    fn test_render_empty_tree() {
        assert!(render_tree(&[]).is_empty());
    }
}

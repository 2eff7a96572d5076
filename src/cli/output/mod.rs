//! Output formatting and display utilities
//!
//! This module handles:
//! - Rendering the workspace tree as indented text
//! - Formatting case lines with their bound keys
//! - Colored status lines for success, notices and warnings

use crate::cli::config::OutputDefaults;
use crate::cli::workspace::tree::{TreeItem, TreeNode};
use crate::cli::workspace::Workspace;
use crate::core::Case;
use colored::Colorize;

/// Formatting switches taken from the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputStyle {
    pub color: bool,
    pub show_commands: bool,
}

impl Default for OutputStyle {
    fn default() -> Self {
        Self {
            color: true,
            show_commands: true,
        }
    }
}

impl From<&OutputDefaults> for OutputStyle {
    fn from(defaults: &OutputDefaults) -> Self {
        Self {
            color: defaults.color,
            show_commands: defaults.show_commands,
        }
    }
}

impl OutputStyle {
    pub fn plain() -> Self {
        Self {
            color: false,
            ..Self::default()
        }
    }

    fn paint(&self, text: &str, f: impl Fn(&str) -> colored::ColoredString) -> String {
        if self.color {
            f(text).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn success(&self, message: &str) -> String {
        self.paint(message, |t| t.green())
    }

    pub fn notice(&self, message: &str) -> String {
        self.paint(message, |t| t.cyan())
    }

    pub fn warning(&self, message: &str) -> String {
        self.paint(message, |t| t.yellow())
    }

    pub fn heading(&self, message: &str) -> String {
        self.paint(message, |t| t.bold())
    }

    pub fn key_label(&self, key: &str) -> String {
        self.paint(key, |t| t.magenta())
    }

    /// One case as `name  command [key]`
    pub fn case_line(&self, case: &Case, key: Option<&str>) -> String {
        let mut line = self.paint(&case.name, |t| t.bright_white());
        if self.show_commands {
            line.push_str("  ");
            line.push_str(&self.paint(&case.command, |t| t.dimmed()));
        }
        if let Some(key) = key {
            line.push(' ');
            line.push_str(&self.paint(&format!("[{}]", key), |t| t.magenta()));
        }
        line
    }

    fn item_line(&self, item: &TreeItem) -> String {
        let label = match item.context {
            "lastTasks" | "favorites" | "catalog" | "customFolder" => self.heading(&item.label),
            "package" => self.paint(&item.label, |t| t.cyan()),
            "command" => self.paint(&item.label, |t| t.green()),
            _ => self.paint(&item.label, |t| t.bright_white()),
        };
        match (&item.description, item.collapsible) {
            (Some(description), false) if self.show_commands => {
                format!("{}  {}", label, self.paint(description, |t| t.dimmed()))
            }
            _ => label,
        }
    }
}

/// Render the whole workspace tree, fully expanded, two spaces per level
pub fn render_tree(workspace: &Workspace, style: &OutputStyle) -> String {
    let mut out = String::new();
    for node in workspace.children(None) {
        render_node(workspace, style, &node, 0, &mut out);
    }
    out
}

fn render_node(
    workspace: &Workspace,
    style: &OutputStyle,
    node: &TreeNode,
    depth: usize,
    out: &mut String,
) {
    let item = workspace.tree_item(node);
    out.push_str(&"  ".repeat(depth));
    out.push_str(&style.item_line(&item));
    out.push('\n');

    for child in workspace.children(Some(node)) {
        render_node(workspace, style, &child, depth + 1, out);
    }
}

/// Numbered case list, or `empty` when there is nothing to show
pub fn render_cases<'a>(
    cases: impl IntoIterator<Item = &'a Case>,
    workspace: &Workspace,
    style: &OutputStyle,
    empty: &str,
) -> String {
    let lines: Vec<String> = cases
        .into_iter()
        .enumerate()
        .map(|(i, case)| {
            format!(
                "{:>3}. {}",
                i + 1,
                style.case_line(case, workspace.keybindings().key_for(case))
            )
        })
        .collect();

    if lines.is_empty() {
        format!("{}\n", style.notice(empty))
    } else {
        lines.join("\n") + "\n"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::keybindings::MemoryKeybindingConfig;
    use crate::cli::workspace::WorkspaceOptions;
    use crate::core::storage::MemoryStore;
    use crate::runtime::StaticToolLister;
    use std::sync::Arc;

    async fn workspace() -> Workspace {
        let mut ws = Workspace::load(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryKeybindingConfig::default()),
            WorkspaceOptions::default(),
        )
        .await
        .unwrap();
        ws.refresh(&StaticToolLister::new("ruff v0.4.1\n- ruff\n"))
            .await
            .unwrap();
        ws
    }

    #[test]
    fn test_case_line_plain() {
        let style = OutputStyle::plain();
        let case = Case::new("lint", "ruff check .");
        assert_eq!(style.case_line(&case, None), "lint  ruff check .");
        assert_eq!(
            style.case_line(&case, Some("ctrl+1")),
            "lint  ruff check . [ctrl+1]"
        );

        let terse = OutputStyle {
            show_commands: false,
            ..style
        };
        assert_eq!(terse.case_line(&case, None), "lint");
    }

    #[tokio::test]
    async fn test_render_tree_plain() {
        let ws = workspace().await;
        let rendered = render_tree(&ws, &OutputStyle::plain());
        assert_eq!(
            rendered,
            "Last Tasks\nFavorites\nUV Tool List\n  ruff v0.4.1\n    ruff\n      --help  ruff --help\n"
        );
    }

    #[tokio::test]
    async fn test_render_search_results() {
        let mut ws = workspace().await;
        ws.search("help");
        let rendered = render_tree(&ws, &OutputStyle::plain());
        assert_eq!(rendered, "--help  ruff --help\n");
    }

    #[tokio::test]
    async fn test_render_cases_numbers_and_keys() {
        let mut ws = workspace().await;
        let case = Case::new("--help", "ruff --help");
        ws.bind_key("ctrl+h", &case).await.unwrap();

        let rendered = render_cases([&case], &ws, &OutputStyle::plain(), "nothing");
        assert_eq!(rendered, "  1. --help  ruff --help [ctrl+h]\n");

        let empty: [&Case; 0] = [];
        assert_eq!(
            render_cases(empty, &ws, &OutputStyle::plain(), "nothing"),
            "nothing\n"
        );
    }
}

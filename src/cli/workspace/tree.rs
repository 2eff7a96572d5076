//! Read-only tree view over a [`Workspace`]
//!
//! The root holds "Last Tasks", "Favorites", one node per custom folder and
//! the catalog. While a search is active the root holds the hits instead and
//! no node has children.

use super::Workspace;
use crate::cli::search::SearchHit;
use crate::core::{Case, CaseRole};

pub const CATALOG_LABEL: &str = "UV Tool List";
pub const LAST_TASKS_LABEL: &str = "Last Tasks";
pub const FAVORITES_LABEL: &str = "Favorites";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    LastTasks,
    Favorites,
    Folder(usize),
    Catalog,
    Package(usize),
    Command { package: usize, command: usize },
    Case(Case),
    Hit(SearchHit),
}

/// Display data for one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeItem {
    pub label: String,
    pub description: Option<String>,
    /// Context value consumers key their actions on
    pub context: &'static str,
    pub collapsible: bool,
}

impl Workspace {
    /// Children of `parent`, or the root nodes when `parent` is `None`
    pub fn children(&self, parent: Option<&TreeNode>) -> Vec<TreeNode> {
        if let Some(hits) = self.search_results() {
            return match parent {
                None => hits.iter().cloned().map(TreeNode::Hit).collect(),
                Some(_) => Vec::new(),
            };
        }

        match parent {
            None => {
                let mut roots = vec![TreeNode::LastTasks, TreeNode::Favorites];
                roots.extend((0..self.folders().folders().len()).map(TreeNode::Folder));
                roots.push(TreeNode::Catalog);
                roots
            }
            Some(TreeNode::LastTasks) => self
                .history()
                .entries()
                .iter()
                .cloned()
                .map(TreeNode::Case)
                .collect(),
            Some(TreeNode::Favorites) => self
                .favorites()
                .entries()
                .iter()
                .cloned()
                .map(TreeNode::Case)
                .collect(),
            Some(TreeNode::Folder(index)) => self
                .folders()
                .folders()
                .get(*index)
                .map(|folder| {
                    folder
                        .cases
                        .iter()
                        .cloned()
                        .map(|data| TreeNode::Case(Case::from(data)))
                        .collect()
                })
                .unwrap_or_default(),
            Some(TreeNode::Catalog) => (0..self.catalog().packages.len())
                .map(TreeNode::Package)
                .collect(),
            Some(TreeNode::Package(package)) => self
                .catalog()
                .packages
                .get(*package)
                .map(|p| {
                    (0..p.commands.len())
                        .map(|command| TreeNode::Command {
                            package: *package,
                            command,
                        })
                        .collect()
                })
                .unwrap_or_default(),
            Some(TreeNode::Command { package, command }) => self
                .catalog()
                .packages
                .get(*package)
                .and_then(|p| p.commands.get(*command))
                .map(|c| {
                    self.cases()
                        .cases_for(&c.key)
                        .iter()
                        .cloned()
                        .map(TreeNode::Case)
                        .collect()
                })
                .unwrap_or_default(),
            Some(TreeNode::Case(_)) | Some(TreeNode::Hit(_)) => Vec::new(),
        }
    }

    /// Display data for `node`
    pub fn tree_item(&self, node: &TreeNode) -> TreeItem {
        match node {
            TreeNode::LastTasks => section(LAST_TASKS_LABEL, "lastTasks"),
            TreeNode::Favorites => section(FAVORITES_LABEL, "favorites"),
            TreeNode::Catalog => section(CATALOG_LABEL, "catalog"),
            TreeNode::Folder(index) => {
                let name = self
                    .folders()
                    .folders()
                    .get(*index)
                    .map(|f| f.folder_name.clone())
                    .unwrap_or_default();
                TreeItem {
                    label: name,
                    description: None,
                    context: "customFolder",
                    collapsible: true,
                }
            }
            TreeNode::Package(index) => TreeItem {
                label: self
                    .catalog()
                    .packages
                    .get(*index)
                    .map(|p| p.label.clone())
                    .unwrap_or_default(),
                description: None,
                context: "package",
                collapsible: true,
            },
            TreeNode::Command { package, command } => TreeItem {
                label: self
                    .catalog()
                    .packages
                    .get(*package)
                    .and_then(|p| p.commands.get(*command))
                    .map(|c| c.label.clone())
                    .unwrap_or_default(),
                description: None,
                context: "command",
                collapsible: true,
            },
            TreeNode::Case(case) => self.case_item(case),
            TreeNode::Hit(SearchHit::Command { label, package, .. }) => TreeItem {
                label: label.clone(),
                description: Some(package.clone()),
                context: "command",
                collapsible: false,
            },
            TreeNode::Hit(SearchHit::Case { case, .. }) => self.case_item(case),
        }
    }

    fn case_item(&self, case: &Case) -> TreeItem {
        let role = match case.role {
            CaseRole::Plain if self.favorites().contains(case) => CaseRole::Favorite,
            role => role,
        };
        let description = match self.keybindings().key_for(case) {
            Some(key) => format!("{} [{}]", case.command, key),
            None => case.command.clone(),
        };
        TreeItem {
            label: case.name.clone(),
            description: Some(description),
            context: role.context_value(),
            collapsible: false,
        }
    }
}

fn section(label: &str, context: &'static str) -> TreeItem {
    TreeItem {
        label: label.to_string(),
        description: None,
        context,
        collapsible: true,
    }
}

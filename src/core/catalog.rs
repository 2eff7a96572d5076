//! Tool catalog
//!
//! Parses the line-oriented output of `uv tool list` into a two-level tree:
//!
//! ```text
//! requests v2.31.0      <- package header: "<name> v<major>.<minor>.<patch>"
//! - pip-install         <- command of the most recent package
//! demo v1.0.0
//! - run
//! ```
//!
//! Commands refer to their package by index, and a command's [`CommandKey`] is
//! derived from the package *name* (the header without its version), so the
//! cases attached to a tool survive an upgrade.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

static PACKAGE_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^-\s].*?) v\d+\.\d+\.\d+").expect("package header pattern is valid")
});

const COMMAND_PREFIX: &str = "- ";

/// Addressing key of a command's case list: `<package name>::<command label>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandKey(String);

impl CommandKey {
    pub fn new(package_name: &str, command_label: &str) -> Self {
        Self(format!("{}::{}", package_name, command_label))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The command label part of the key
    pub fn command_label(&self) -> &str {
        self.0
            .split_once("::")
            .map(|(_, command)| command)
            .unwrap_or(&self.0)
    }
}

impl From<String> for CommandKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for CommandKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for CommandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A package header from the listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Full header line, e.g. `requests v2.31.0`
    pub label: String,
    /// Header without the version, e.g. `requests`
    pub name: String,
    pub commands: Vec<CatalogCommand>,
}

/// An executable exposed by a package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogCommand {
    pub label: String,
    /// Index of the owning package in [`Catalog::packages`]
    pub package: usize,
    pub key: CommandKey,
}

/// The package/command tree. Rebuilt on every refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub packages: Vec<Package>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Every command in traversal order
    pub fn commands(&self) -> impl Iterator<Item = &CatalogCommand> {
        self.packages.iter().flat_map(|p| p.commands.iter())
    }

    pub fn command_count(&self) -> usize {
        self.packages.iter().map(|p| p.commands.len()).sum()
    }

    pub fn package_of(&self, command: &CatalogCommand) -> Option<&Package> {
        self.packages.get(command.package)
    }

    /// Look up a command by package name (or full label) and command label
    pub fn find_command(&self, package: &str, command: &str) -> Option<&CatalogCommand> {
        self.packages
            .iter()
            .filter(|p| p.name == package || p.label == package)
            .flat_map(|p| p.commands.iter())
            .find(|c| c.label == command)
    }

    /// Keys produced by more than one command
    pub fn duplicate_keys(&self) -> Vec<CommandKey> {
        let mut seen: HashMap<&CommandKey, usize> = HashMap::new();
        let mut duplicates = Vec::new();
        for command in self.commands() {
            let count = seen.entry(&command.key).or_insert(0);
            *count += 1;
            if *count == 2 {
                duplicates.push(command.key.clone());
            }
        }
        duplicates
    }
}

/// Parse `uv tool list` output into a catalog
pub fn parse_listing(text: &str) -> Catalog {
    let mut packages: Vec<Package> = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(captures) = PACKAGE_HEADER.captures(line) {
            let name = captures
                .get(1)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| line.to_string());
            packages.push(Package {
                label: line.to_string(),
                name,
                commands: Vec::new(),
            });
        } else if line.starts_with(COMMAND_PREFIX) {
            if let Some(index) = packages.len().checked_sub(1) {
                let package = &mut packages[index];
                let label = line.trim_start_matches('-').trim_start().to_string();
                let key = CommandKey::new(&package.name, &label);
                package.commands.push(CatalogCommand {
                    label,
                    package: index,
                    key,
                });
            }
        }
    }

    Catalog { packages }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const LISTING: &str = "requests v2.31.0\n- pip-install\ndemo v1.0.0\n- run\n";

    #[test]
    fn test_parse_two_packages() {
        let catalog = parse_listing(LISTING);
        assert_eq!(catalog.packages.len(), 2);
        assert_eq!(catalog.packages[0].label, "requests v2.31.0");
        assert_eq!(catalog.packages[0].name, "requests");
        assert_eq!(catalog.packages[0].commands[0].label, "pip-install");
        assert_eq!(catalog.packages[1].label, "demo v1.0.0");
        assert_eq!(catalog.packages[1].commands[0].label, "run");
        assert_eq!(catalog.packages[1].commands[0].package, 1);
    }

    #[test]
    fn test_command_key_uses_package_name() {
        let catalog = parse_listing(LISTING);
        let command = &catalog.packages[0].commands[0];
        assert_eq!(command.key.as_str(), "requests::pip-install");
        assert_eq!(command.key.command_label(), "pip-install");

        let upgraded = parse_listing("requests v2.32.3\n- pip-install\n");
        assert_eq!(upgraded.packages[0].commands[0].key, command.key);
    }

    #[test]
    fn test_ignores_noise_and_orphan_commands() {
        let text = "warning: something\n- orphan\n\nruff v0.4.1\n  - ruff  \nnot a header\n";
        let catalog = parse_listing(text);
        assert_eq!(catalog.packages.len(), 1);
        assert_eq!(catalog.packages[0].commands.len(), 1);
        assert_eq!(catalog.packages[0].commands[0].label, "ruff");
    }

    #[test]
    fn test_header_with_extras() {
        let catalog = parse_listing("black v24.1.0 [required: >=24]\n- black\n- blackd\n");
        assert_eq!(catalog.packages[0].name, "black");
        assert_eq!(catalog.command_count(), 2);
        assert!(catalog.find_command("black", "blackd").is_some());
        assert!(catalog
            .find_command("black v24.1.0 [required: >=24]", "black")
            .is_some());
    }

    #[test]
    fn test_empty_listing() {
        let catalog = parse_listing("");
        assert!(catalog.is_empty());
        assert_eq!(catalog.command_count(), 0);
    }

    #[test]
    fn test_duplicate_keys_are_reported() {
        let catalog = parse_listing("tool v1.0.0\n- run\ntool v2.0.0\n- run\n- other\n");
        assert_eq!(catalog.duplicate_keys(), vec![CommandKey::from("tool::run")]);
    }

    proptest! {
        #[test]
        fn prop_commands_attach_to_nearest_header(
            packages in prop::collection::vec(
                ("[a-z]{1,8}", prop::collection::vec("[a-z][a-z-]{0,10}", 0..5)),
                0..6,
            )
        ) {
            let mut text = String::new();
            for (i, (name, commands)) in packages.iter().enumerate() {
                text.push_str(&format!("{} v{}.0.{}\n", name, i, i));
                for command in commands {
                    text.push_str(&format!("- {}\n", command));
                }
            }

            let catalog = parse_listing(&text);
            prop_assert_eq!(catalog.packages.len(), packages.len());
            for (parsed, (name, commands)) in catalog.packages.iter().zip(packages.iter()) {
                prop_assert_eq!(&parsed.name, name);
                let labels: Vec<&str> = parsed.commands.iter().map(|c| c.label.as_str()).collect();
                let expected: Vec<&str> = commands.iter().map(String::as_str).collect();
                prop_assert_eq!(labels, expected);
            }
        }
    }
}

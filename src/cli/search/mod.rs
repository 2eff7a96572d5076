//! Substring search over the catalog and its cases
//!
//! Matching is case-insensitive on command labels, case names and case command
//! strings. Hits come back in catalog order, each command ahead of its cases.
//! History and favorites are not searched.

use crate::cli::cases::CaseStore;
use crate::core::{Case, Catalog, CommandKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchHit {
    Command {
        key: CommandKey,
        label: String,
        package: String,
    },
    Case {
        key: CommandKey,
        case: Case,
    },
}

impl SearchHit {
    pub fn key(&self) -> &CommandKey {
        match self {
            Self::Command { key, .. } | Self::Case { key, .. } => key,
        }
    }
}

/// Search the catalog and the cases attached to it.
/// A blank term matches nothing; otherwise the term is matched as typed,
/// surrounding spaces included.
pub fn search(catalog: &Catalog, cases: &CaseStore, term: &str) -> Vec<SearchHit> {
    if term.trim().is_empty() {
        return Vec::new();
    }
    let needle = term.to_lowercase();

    let mut hits = Vec::new();
    for package in &catalog.packages {
        for command in &package.commands {
            if command.label.to_lowercase().contains(&needle) {
                hits.push(SearchHit::Command {
                    key: command.key.clone(),
                    label: command.label.clone(),
                    package: package.label.clone(),
                });
            }
            hits.extend(
                cases
                    .cases_for(&command.key)
                    .iter()
                    .filter(|case| case.matches_lowercase(&needle))
                    .map(|case| SearchHit::Case {
                        key: command.key.clone(),
                        case: case.clone(),
                    }),
            );
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parse_listing;
    use crate::core::storage::MemoryStore;
    use std::sync::Arc;

    async fn seeded() -> (Catalog, CaseStore) {
        let catalog = parse_listing("foo v1.0.0\n- foo\nhttpie v3.2.2\n- http\n- https\n");
        let mut cases = CaseStore::load(Arc::new(MemoryStore::new())).await;
        cases.seed_defaults(&catalog).await.unwrap();
        cases
            .add_case(&CommandKey::from("httpie::http"), "Get Example", "http GET example.org")
            .await
            .unwrap();
        (catalog, cases)
    }

    #[tokio::test]
    async fn test_help_term_finds_seeded_case() {
        let (catalog, cases) = seeded().await;
        let hits = search(&catalog, &cases, "help");

        assert!(hits.contains(&SearchHit::Case {
            key: CommandKey::from("foo::foo"),
            case: Case::new("--help", "foo --help"),
        }));
        assert_eq!(hits.len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_term_returns_nothing() {
        let (catalog, cases) = seeded().await;
        assert!(search(&catalog, &cases, "zzz-nothing").is_empty());
        assert!(search(&catalog, &cases, "   ").is_empty());
    }

    #[tokio::test]
    async fn test_commands_precede_their_cases() {
        let (catalog, cases) = seeded().await;
        let hits = search(&catalog, &cases, "HTTP");

        let order: Vec<String> = hits
            .iter()
            .map(|hit| match hit {
                SearchHit::Command { label, .. } => format!("cmd:{}", label),
                SearchHit::Case { case, .. } => format!("case:{}", case.command),
            })
            .collect();
        assert_eq!(
            order,
            vec![
                "cmd:http",
                "case:http --help",
                "case:http GET example.org",
                "cmd:https",
                "case:https --help",
            ]
        );
    }

    #[tokio::test]
    async fn test_surrounding_spaces_are_part_of_the_term() {
        let (catalog, cases) = seeded().await;

        // " --help" only occurs inside the command strings, never at a name start
        let hits = search(&catalog, &cases, " --help");
        assert_eq!(hits.len(), 3);
        assert!(hits.iter().all(|hit| matches!(hit, SearchHit::Case { .. })));

        assert!(search(&catalog, &cases, "http ").iter().all(|hit| match hit {
            SearchHit::Case { case, .. } => case.command.starts_with("http "),
            SearchHit::Command { .. } => false,
        }));
        assert_eq!(search(&catalog, &cases, "http ").len(), 2);
    }

    #[tokio::test]
    async fn test_case_name_match_is_case_insensitive() {
        let (catalog, cases) = seeded().await;
        let hits = search(&catalog, &cases, "get example");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].key(), &CommandKey::from("httpie::http"));
    }
}

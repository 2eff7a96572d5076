//! Case storage
//!
//! This module handles:
//! - Mapping each command key to its ordered list of cases
//! - Seeding a `--help` case for every command of a fresh catalog
//! - Persisting the whole mapping after every mutation

use crate::cli::error::{InteractiveError, Result};
use crate::core::storage::{self, KeyValueStore, StorageKey};
use crate::core::{Case, CaseData, CaseRole, Catalog, CommandKey};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Persisted (and exported) form of one case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseEntry {
    pub command_key: CommandKey,
    #[serde(flatten)]
    pub case: CaseData,
}

impl CaseEntry {
    pub fn new(command_key: CommandKey, case: CaseData) -> Self {
        Self { command_key, case }
    }
}

/// Cases attached to catalog commands
pub struct CaseStore {
    store: Arc<dyn KeyValueStore>,
    lists: Vec<(CommandKey, Vec<Case>)>,
}

impl CaseStore {
    /// Load the persisted cases. Missing or undecodable data loads empty.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let entries: Vec<CaseEntry> = storage::load_or_default(&*store, StorageKey::Cases).await;
        let mut case_store = Self {
            store,
            lists: Vec::new(),
        };
        case_store.fill(entries);
        debug!(cases = case_store.len(), "case store loaded");
        case_store
    }

    /// Cases of a command, in insertion order
    pub fn cases_for(&self, key: &CommandKey) -> &[Case] {
        self.lists
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, cases)| cases.as_slice())
            .unwrap_or(&[])
    }

    /// Append a case to a command and persist
    pub async fn add_case(
        &mut self,
        key: &CommandKey,
        name: impl Into<String>,
        command: impl Into<String>,
    ) -> Result<()> {
        let case = Case::new(name, command);
        if case.name.trim().is_empty() || case.command.trim().is_empty() {
            return Err(InteractiveError::invalid_input(
                "Case name and command must not be empty",
            ));
        }

        info!(key = %key, case = %case, "adding case");
        self.list_mut(key).push(case);
        self.persist().await
    }

    /// Remove the first case matching `case` by (name, command).
    ///
    /// Returns the key of the command it was removed from, or `None` when no
    /// command holds the pair. If several commands hold it, only the first in
    /// store order loses it.
    pub async fn delete_case(&mut self, case: &Case) -> Result<Option<CommandKey>> {
        let mut removed_from = None;
        for (key, cases) in self.lists.iter_mut() {
            if let Some(index) = cases.iter().position(|c| c.same_pair(case)) {
                cases.remove(index);
                removed_from = Some(key.clone());
                break;
            }
        }

        match removed_from {
            Some(key) => {
                info!(key = %key, case = %case, "deleted case");
                self.lists.retain(|(_, cases)| !cases.is_empty());
                self.persist().await?;
                Ok(Some(key))
            }
            None => Ok(None),
        }
    }

    /// Give every catalog command a `--help` case when the store is empty.
    ///
    /// Returns the number of cases created.
    pub async fn seed_defaults(&mut self, catalog: &Catalog) -> Result<usize> {
        if !self.is_empty() || catalog.is_empty() {
            return Ok(0);
        }

        let mut seen = HashSet::new();
        for command in catalog.commands() {
            if seen.insert(command.key.clone()) {
                self.list_mut(&command.key)
                    .push(Case::help_for(&command.label));
            }
        }

        let created = seen.len();
        if created > 0 {
            info!(created, "seeded default cases");
            self.persist().await?;
        }
        Ok(created)
    }

    pub fn is_empty(&self) -> bool {
        self.lists.iter().all(|(_, cases)| cases.is_empty())
    }

    /// Total number of cases across all commands
    pub fn len(&self) -> usize {
        self.lists.iter().map(|(_, cases)| cases.len()).sum()
    }

    /// Flat list in persisted order
    pub fn entries(&self) -> Vec<CaseEntry> {
        self.lists
            .iter()
            .flat_map(|(key, cases)| {
                cases
                    .iter()
                    .map(move |c| CaseEntry::new(key.clone(), c.to_data()))
            })
            .collect()
    }

    /// Every distinct (name, command) pair
    pub fn all_cases(&self) -> Vec<CaseData> {
        let mut seen = HashSet::new();
        self.lists
            .iter()
            .flat_map(|(_, cases)| cases.iter())
            .map(Case::to_data)
            .filter(|data| seen.insert(data.clone()))
            .collect()
    }

    /// Replace the whole store and persist
    pub async fn replace_all(&mut self, entries: Vec<CaseEntry>) -> Result<()> {
        self.lists.clear();
        self.fill(entries);
        self.persist().await
    }

    fn fill(&mut self, entries: Vec<CaseEntry>) {
        for entry in entries {
            let case = Case::from_data(entry.case, CaseRole::Plain);
            self.list_mut(&entry.command_key).push(case);
        }
    }

    fn list_mut(&mut self, key: &CommandKey) -> &mut Vec<Case> {
        let index = match self.lists.iter().position(|(k, _)| k == key) {
            Some(index) => index,
            None => {
                self.lists.push((key.clone(), Vec::new()));
                self.lists.len() - 1
            }
        };
        &mut self.lists[index].1
    }

    async fn persist(&self) -> Result<()> {
        storage::save(&*self.store, StorageKey::Cases, &self.entries()).await?;
        Ok(())
    }
}

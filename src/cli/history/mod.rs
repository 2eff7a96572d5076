//! Recently run cases
//!
//! This module handles:
//! - Recording executed cases, most recent first
//! - Deduplicating by (name, command) so a re-run moves the entry to the front
//! - Capping the list at [`HISTORY_CAPACITY`] entries

use crate::cli::error::Result;
use crate::core::storage::{self, KeyValueStore, StorageKey};
use crate::core::{Case, CaseData, CaseRole};
use std::sync::Arc;
use tracing::debug;

/// Maximum number of remembered cases
pub const HISTORY_CAPACITY: usize = 10;

/// History store service with persistent storage
pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
    entries: Vec<Case>,
}

impl HistoryStore {
    /// Load the persisted history
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let data: Vec<CaseData> = storage::load_or_default(&*store, StorageKey::LastTasks).await;
        let mut history = Self {
            store,
            entries: Vec::new(),
        };
        history.fill(data);
        history
    }

    /// Entries, most recent first
    pub fn entries(&self) -> &[Case] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a run: move an equal entry (or insert a new one) to the front
    pub async fn record(&mut self, case: &Case) -> Result<()> {
        if let Some(index) = self.entries.iter().position(|e| e.same_pair(case)) {
            self.entries.remove(index);
        }

        self.entries
            .insert(0, case.clone().with_role(CaseRole::LastTask));
        self.entries.truncate(HISTORY_CAPACITY);

        debug!(case = %case, len = self.entries.len(), "recorded run");
        self.save_entries().await
    }

    /// Remove an entry. Returns whether one was removed.
    pub async fn remove(&mut self, case: &Case) -> Result<bool> {
        match self.entries.iter().position(|e| e.same_pair(case)) {
            Some(index) => {
                self.entries.remove(index);
                self.save_entries().await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Clear all history data
    pub async fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.save_entries().await
    }

    /// Serialized entries, most recent first
    pub fn to_data(&self) -> Vec<CaseData> {
        self.entries.iter().map(Case::to_data).collect()
    }

    /// Replace the whole history and persist
    pub async fn replace_all(&mut self, data: Vec<CaseData>) -> Result<()> {
        self.entries.clear();
        self.fill(data);
        self.save_entries().await
    }

    // Private helper methods

    fn fill(&mut self, data: Vec<CaseData>) {
        for item in data {
            let case = Case::from_data(item, CaseRole::LastTask);
            if self.entries.len() < HISTORY_CAPACITY
                && !self.entries.iter().any(|e| e.same_pair(&case))
            {
                self.entries.push(case);
            }
        }
    }

    async fn save_entries(&self) -> Result<()> {
        storage::save(&*self.store, StorageKey::LastTasks, &self.to_data()).await?;
        Ok(())
    }
}

//! Favorited cases, deduplicated by (name, command)

use crate::cli::error::Result;
use crate::core::storage::{self, KeyValueStore, StorageKey};
use crate::core::{Case, CaseData, CaseRole};
use std::sync::Arc;
use tracing::info;

pub struct FavoritesStore {
    store: Arc<dyn KeyValueStore>,
    favorites: Vec<Case>,
}

impl FavoritesStore {
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let data: Vec<CaseData> = storage::load_or_default(&*store, StorageKey::Favorites).await;
        let mut favorites = Self {
            store,
            favorites: Vec::new(),
        };
        favorites.fill(data);
        favorites
    }

    /// Favorites in the order they were added
    pub fn entries(&self) -> &[Case] {
        &self.favorites
    }

    pub fn len(&self) -> usize {
        self.favorites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty()
    }

    pub fn contains(&self, case: &Case) -> bool {
        self.favorites.iter().any(|f| f.same_pair(case))
    }

    /// Add a favorite. Returns `false` (and writes nothing) if already present.
    pub async fn add(&mut self, case: &Case) -> Result<bool> {
        if self.contains(case) {
            return Ok(false);
        }

        info!(case = %case, "added favorite");
        self.favorites
            .push(case.clone().with_role(CaseRole::Favorite));
        self.persist().await?;
        Ok(true)
    }

    /// Remove a favorite. Returns whether one was removed.
    pub async fn remove(&mut self, case: &Case) -> Result<bool> {
        let Some(index) = self.favorites.iter().position(|f| f.same_pair(case)) else {
            return Ok(false);
        };

        self.favorites.remove(index);
        info!(case = %case, "removed favorite");
        self.persist().await?;
        Ok(true)
    }

    pub async fn clear(&mut self) -> Result<()> {
        self.favorites.clear();
        self.persist().await
    }

    pub fn to_data(&self) -> Vec<CaseData> {
        self.favorites.iter().map(Case::to_data).collect()
    }

    /// Replace all favorites and persist
    pub async fn replace_all(&mut self, data: Vec<CaseData>) -> Result<()> {
        self.favorites.clear();
        self.fill(data);
        self.persist().await
    }

    fn fill(&mut self, data: Vec<CaseData>) {
        for item in data {
            let case = Case::from_data(item, CaseRole::Favorite);
            if !self.contains(&case) {
                self.favorites.push(case);
            }
        }
    }

    async fn persist(&self) -> Result<()> {
        storage::save(&*self.store, StorageKey::Favorites, &self.to_data()).await?;
        Ok(())
    }
}

//! Workspace state for one toolcase session
//!
//! The workspace owns the catalog and every store, is built once per session,
//! and is the only place user actions enter. Each action mutates one store,
//! awaits its write, then publishes a [`StoreEvent`] naming what changed.

pub mod tree;

use crate::cli::cases::CaseStore;
use crate::cli::commands::CommandDiscovery;
use crate::cli::error::{InteractiveError, Result};
use crate::cli::favorites::FavoritesStore;
use crate::cli::folders::FolderStore;
use crate::cli::history::HistoryStore;
use crate::cli::keybindings::{KeybindingAction, KeybindingConfigStore, KeybindingRegistry};
use crate::cli::search::{self, SearchHit};
use crate::cli::settings::SettingsBundle;
use crate::core::{
    Case, CaseData, Catalog, CommandKey, EventBus, KeyValueStore, StoreEvent,
};
use crate::runtime::{CaseRunner, ToolLister};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

/// Settings the workspace needs from the configuration
#[derive(Debug, Clone, Default)]
pub struct WorkspaceOptions {
    pub keybinding_action: KeybindingAction,
}

/// Summary of a catalog refresh
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshOutcome {
    pub packages: usize,
    pub commands: usize,
    /// Number of `--help` cases created for a fresh store
    pub seeded: usize,
    /// Non-fatal listing failure
    pub warning: Option<String>,
}

pub struct Workspace {
    catalog: Catalog,
    cases: CaseStore,
    history: HistoryStore,
    favorites: FavoritesStore,
    keybindings: KeybindingRegistry,
    folders: FolderStore,
    search_results: Option<Vec<SearchHit>>,
    events: EventBus,
}

impl Workspace {
    /// Load every store from `store`, mirroring keybindings into `external`
    pub async fn load(
        store: Arc<dyn KeyValueStore>,
        external: Arc<dyn KeybindingConfigStore>,
        options: WorkspaceOptions,
    ) -> Result<Self> {
        let cases = CaseStore::load(store.clone()).await;
        let history = HistoryStore::load(store.clone()).await;
        let favorites = FavoritesStore::load(store.clone()).await;
        let keybindings =
            KeybindingRegistry::load(store.clone(), external, options.keybinding_action).await;
        let folders = FolderStore::load(store).await;

        info!(
            cases = cases.len(),
            history = history.len(),
            favorites = favorites.len(),
            keybindings = keybindings.len(),
            "workspace loaded"
        );

        Ok(Self {
            catalog: Catalog::empty(),
            cases,
            history,
            favorites,
            keybindings,
            folders,
            search_results: None,
            events: EventBus::new(),
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn cases(&self) -> &CaseStore {
        &self.cases
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    pub fn keybindings(&self) -> &KeybindingRegistry {
        &self.keybindings
    }

    pub fn folders(&self) -> &FolderStore {
        &self.folders
    }

    // Catalog

    /// Leave search mode, rebuild the catalog and seed default cases
    pub async fn refresh(&mut self, lister: &dyn ToolLister) -> Result<RefreshOutcome> {
        self.clear_search();
        let discovery = CommandDiscovery::new(lister).discover_commands().await;
        let mut outcome = self.set_catalog(discovery.catalog).await?;
        outcome.warning = discovery.warning;
        Ok(outcome)
    }

    /// Install an already parsed catalog
    pub async fn set_catalog(&mut self, catalog: Catalog) -> Result<RefreshOutcome> {
        self.catalog = catalog;
        let seeded = self.cases.seed_defaults(&self.catalog).await?;
        self.events.emit(StoreEvent::Catalog);

        Ok(RefreshOutcome {
            packages: self.catalog.packages.len(),
            commands: self.catalog.command_count(),
            seeded,
            warning: None,
        })
    }

    /// Resolve a command by package name (or label) and command label
    pub fn resolve_command(&self, package: &str, command: &str) -> Result<CommandKey> {
        self.catalog
            .find_command(package, command)
            .map(|c| c.key.clone())
            .ok_or_else(|| InteractiveError::CommandNotFound(format!("{}::{}", package, command)))
    }

    // Search

    /// Enter search mode with `term`; a blank term leaves search mode
    pub fn search(&mut self, term: &str) -> &[SearchHit] {
        if term.trim().is_empty() {
            self.clear_search();
            return &[];
        }

        let hits = search::search(&self.catalog, &self.cases, term);
        self.events.emit(StoreEvent::Search);
        self.search_results.insert(hits).as_slice()
    }

    pub fn clear_search(&mut self) {
        if self.search_results.take().is_some() {
            self.events.emit(StoreEvent::Search);
        }
    }

    pub fn is_searching(&self) -> bool {
        self.search_results.is_some()
    }

    pub fn search_results(&self) -> Option<&[SearchHit]> {
        self.search_results.as_deref()
    }

    // Cases

    pub async fn add_case(&mut self, key: &CommandKey, name: &str, command: &str) -> Result<()> {
        self.cases.add_case(key, name, command).await?;
        self.events.emit(StoreEvent::Cases { key: key.clone() });
        Ok(())
    }

    /// Delete a case from the case store. Returns whether one was removed.
    pub async fn delete_case(&mut self, case: &Case) -> Result<bool> {
        match self.cases.delete_case(case).await? {
            Some(key) => {
                self.events.emit(StoreEvent::Cases { key });
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // Execution

    /// Record `case` in the history, then hand it to `runner`
    pub async fn run_case(&mut self, case: &Case, runner: &dyn CaseRunner) -> Result<()> {
        self.history.record(case).await?;
        self.events.emit(StoreEvent::History);
        runner.run(&case.command).await?;
        Ok(())
    }

    /// Run the case bound to `key`
    pub async fn run_keybinding(&mut self, key: &str, runner: &dyn CaseRunner) -> Result<Case> {
        let case = self
            .keybindings
            .get(key)
            .cloned()
            .ok_or_else(|| InteractiveError::KeybindingNotFound(key.to_string()))?;
        self.run_case(&case, runner).await?;
        Ok(case)
    }

    // History

    pub async fn remove_from_history(&mut self, case: &Case) -> Result<bool> {
        let removed = self.history.remove(case).await?;
        if removed {
            self.events.emit(StoreEvent::History);
        }
        Ok(removed)
    }

    pub async fn clear_history(&mut self) -> Result<()> {
        self.history.clear().await?;
        self.events.emit(StoreEvent::History);
        Ok(())
    }

    // Favorites

    pub async fn add_favorite(&mut self, case: &Case) -> Result<bool> {
        let added = self.favorites.add(case).await?;
        if added {
            self.events.emit(StoreEvent::Favorites);
        }
        Ok(added)
    }

    pub async fn remove_favorite(&mut self, case: &Case) -> Result<bool> {
        let removed = self.favorites.remove(case).await?;
        if removed {
            self.events.emit(StoreEvent::Favorites);
        }
        Ok(removed)
    }

    pub async fn clear_favorites(&mut self) -> Result<()> {
        self.favorites.clear().await?;
        self.events.emit(StoreEvent::Favorites);
        Ok(())
    }

    // Keybindings

    pub async fn bind_key(&mut self, key: &str, case: &Case) -> Result<()> {
        self.keybindings.bind(key, case).await?;
        self.events.emit(StoreEvent::Keybindings);
        Ok(())
    }

    pub async fn unbind_key(&mut self, key: &str) -> Result<bool> {
        let removed = self.keybindings.unbind(key).await?;
        if removed {
            self.events.emit(StoreEvent::Keybindings);
        }
        Ok(removed)
    }

    // Custom folders

    pub async fn create_folder(&mut self, name: &str) -> Result<()> {
        self.folders.create(name).await?;
        self.events.emit(StoreEvent::CustomFolders);
        Ok(())
    }

    pub async fn delete_folder(&mut self, name: &str) -> Result<bool> {
        let removed = self.folders.delete(name).await?;
        if removed {
            self.events.emit(StoreEvent::CustomFolders);
        }
        Ok(removed)
    }

    pub async fn add_to_folder(&mut self, name: &str, case: &Case) -> Result<bool> {
        let added = self.folders.add_case(name, case).await?;
        if added {
            self.events.emit(StoreEvent::CustomFolders);
        }
        Ok(added)
    }

    pub async fn remove_from_folder(&mut self, name: &str, case: &Case) -> Result<bool> {
        let removed = self.folders.remove_case(name, case).await?;
        if removed {
            self.events.emit(StoreEvent::CustomFolders);
        }
        Ok(removed)
    }

    // Settings bundle

    /// Snapshot every store into one bundle
    pub fn export_bundle(&self) -> SettingsBundle {
        SettingsBundle {
            last_tasks: Some(self.history.to_data()),
            favorites: Some(self.favorites.to_data()),
            keybindings: Some(self.keybindings.to_data()),
            cases: Some(self.cases.entries()),
            custom_folders: Some(self.folders.folders().to_vec()),
            exported_at: Some(Utc::now()),
        }
    }

    /// Replace every store present in `bundle`. Absent sections are untouched.
    ///
    /// The external keybinding list is read before any store is written, so an
    /// unreadable list fails the import with every store unchanged.
    pub async fn import_bundle(&mut self, bundle: SettingsBundle) -> Result<()> {
        let sections = bundle.sections();
        let external = match bundle.keybindings {
            Some(_) => Some(self.keybindings.external_entries().await?),
            None => None,
        };

        if let Some(last_tasks) = bundle.last_tasks {
            self.history.replace_all(last_tasks).await?;
        }
        if let Some(favorites) = bundle.favorites {
            self.favorites.replace_all(favorites).await?;
        }
        if let (Some(keybindings), Some(entries)) = (bundle.keybindings, external) {
            self.keybindings.replace_all_onto(entries, keybindings).await?;
        }
        if let Some(cases) = bundle.cases {
            self.cases.replace_all(cases).await?;
        }
        if let Some(folders) = bundle.custom_folders {
            self.folders.replace_all(folders).await?;
        }

        info!(?sections, "settings imported");
        self.events.emit(StoreEvent::All);
        Ok(())
    }

    /// Parse `text` as a bundle and import it; malformed text changes nothing
    pub async fn import_json(&mut self, text: &str) -> Result<()> {
        let bundle = SettingsBundle::parse(text)?;
        self.import_bundle(bundle).await
    }

    /// Every distinct case the user has touched: history, favorites,
    /// keybindings and the case store, in that order
    pub fn all_known_cases(&self) -> Vec<CaseData> {
        let mut seen = HashSet::new();
        self.history
            .to_data()
            .into_iter()
            .chain(self.favorites.to_data())
            .chain(self.keybindings.to_data().into_values())
            .chain(self.cases.all_cases())
            .filter(|case| seen.insert(case.clone()))
            .collect()
    }
}

//! Keybinding registry
//!
//! This module handles:
//! - The key combination → case mapping, persisted under `uvKeybindings`
//! - Rejecting binds on an occupied key without touching any state
//! - Mirroring every bind and unbind into the external keybinding list
//!
//! The in-memory map decides conflicts; the external list is what gets shown
//! to the user as a copy-pasteable snippet.

pub mod external;

pub use external::{
    JsonKeybindingsFile, KeybindingConfig, KeybindingConfigStore, MemoryKeybindingConfig,
};

use crate::cli::error::{InteractiveError, Result};
use crate::core::storage::{self, KeyValueStore, StorageKey};
use crate::core::{Case, CaseData, CaseRole};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Action and scope written into each mirrored entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeybindingAction {
    pub command: String,
    pub when: String,
}

impl Default for KeybindingAction {
    fn default() -> Self {
        Self {
            command: "toolcase.runCaseWithKeybinding".to_string(),
            when: "view == toolcase".to_string(),
        }
    }
}

impl KeybindingAction {
    fn entry(&self, key: &str, case: &Case) -> KeybindingConfig {
        KeybindingConfig::new(key, &self.command, case.to_data(), &self.when)
    }
}

pub struct KeybindingRegistry {
    store: Arc<dyn KeyValueStore>,
    external: Arc<dyn KeybindingConfigStore>,
    action: KeybindingAction,
    bindings: BTreeMap<String, Case>,
}

impl KeybindingRegistry {
    pub async fn load(
        store: Arc<dyn KeyValueStore>,
        external: Arc<dyn KeybindingConfigStore>,
        action: KeybindingAction,
    ) -> Self {
        let data: BTreeMap<String, CaseData> =
            storage::load_or_default(&*store, StorageKey::Keybindings).await;
        Self {
            store,
            external,
            action,
            bindings: into_cases(data),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Case> {
        self.bindings.get(key)
    }

    pub fn is_bound(&self, key: &str) -> bool {
        self.bindings.contains_key(key)
    }

    /// Key currently bound to the given case, if any
    pub fn key_for(&self, case: &Case) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(_, bound)| bound.same_pair(case))
            .map(|(key, _)| key.as_str())
    }

    /// Bindings ordered by key
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &Case)> {
        self.bindings.iter().map(|(k, c)| (k.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bind `key` to `case`.
    ///
    /// Fails with [`InteractiveError::KeyInUse`] when the key is taken, leaving
    /// the map, the persisted store and the external list unchanged.
    pub async fn bind(&mut self, key: &str, case: &Case) -> Result<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(InteractiveError::invalid_input("Key combination must not be empty"));
        }
        if self.is_bound(key) {
            warn!(key, "key already in use");
            return Err(InteractiveError::KeyInUse(key.to_string()));
        }

        let mut entries = self.external.load().await?;

        let case = case.clone().with_role(CaseRole::Plain);
        entries.push(self.action.entry(key, &case));
        self.bindings.insert(key.to_string(), case);
        self.persist().await?;
        self.external.save(&entries).await?;

        info!(key, "bound key");
        Ok(())
    }

    /// Remove the binding for `key`. Returns whether one existed.
    ///
    /// An unreadable external list fails the call before anything changes.
    pub async fn unbind(&mut self, key: &str) -> Result<bool> {
        let key = key.trim();
        if !self.is_bound(key) {
            return Ok(false);
        }

        let mut entries = self.external.load().await?;

        self.bindings.remove(key);
        self.persist().await?;
        entries.retain(|entry| entry.key != key);
        self.external.save(&entries).await?;

        info!(key, "unbound key");
        Ok(true)
    }

    /// The external list as pretty JSON
    pub async fn snippet(&self) -> Result<String> {
        let entries = self.external.load().await?;
        Ok(serde_json::to_string_pretty(&entries)?)
    }

    pub fn to_data(&self) -> BTreeMap<String, CaseData> {
        self.bindings
            .iter()
            .map(|(key, case)| (key.clone(), case.to_data()))
            .collect()
    }

    /// Replace all bindings, persist, and rewrite this action's entries in the
    /// external list to match. Entries of other commands are kept.
    pub async fn replace_all(&mut self, data: BTreeMap<String, CaseData>) -> Result<()> {
        let entries = self.external_entries().await?;
        self.replace_all_onto(entries, data).await
    }

    /// Current external list, read ahead of [`Self::replace_all_onto`] so a
    /// caller can fail before touching anything else
    pub async fn external_entries(&self) -> Result<Vec<KeybindingConfig>> {
        Ok(self.external.load().await?)
    }

    /// [`Self::replace_all`] against an external list loaded earlier
    pub async fn replace_all_onto(
        &mut self,
        mut entries: Vec<KeybindingConfig>,
        data: BTreeMap<String, CaseData>,
    ) -> Result<()> {
        self.bindings = into_cases(data);
        self.persist().await?;

        entries.retain(|entry| entry.command != self.action.command);
        entries.extend(
            self.bindings
                .iter()
                .map(|(key, case)| self.action.entry(key, case)),
        );
        self.external.save(&entries).await?;
        Ok(())
    }

    async fn persist(&self) -> Result<()> {
        storage::save(&*self.store, StorageKey::Keybindings, &self.to_data()).await?;
        Ok(())
    }
}

fn into_cases(data: BTreeMap<String, CaseData>) -> BTreeMap<String, Case> {
    data.into_iter()
        .map(|(key, case)| (key, Case::from(case)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStore;

    struct Fixture {
        store: Arc<MemoryStore>,
        external: Arc<MemoryKeybindingConfig>,
        registry: KeybindingRegistry,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let external = Arc::new(MemoryKeybindingConfig::default());
        let registry =
            KeybindingRegistry::load(store.clone(), external.clone(), KeybindingAction::default())
                .await;
        Fixture {
            store,
            external,
            registry,
        }
    }

    #[tokio::test]
    async fn test_bind_persists_and_mirrors() {
        let mut f = fixture().await;
        let case = Case::new("lint", "ruff check .");
        f.registry.bind("ctrl+shift+1", &case).await.unwrap();

        assert_eq!(f.registry.get("ctrl+shift+1"), Some(&case));
        assert_eq!(f.registry.key_for(&case), Some("ctrl+shift+1"));

        let raw = f.store.raw(StorageKey::Keybindings).unwrap();
        assert_eq!(raw["ctrl+shift+1"]["caseCommand"], "ruff check .");

        let mirrored = f.external.snapshot();
        assert_eq!(mirrored.len(), 1);
        assert_eq!(mirrored[0].key, "ctrl+shift+1");
        assert_eq!(mirrored[0].command, "toolcase.runCaseWithKeybinding");
        assert_eq!(mirrored[0].case_data(), Some(case.to_data()));
        assert_eq!(mirrored[0].when.as_deref(), Some("view == toolcase"));
    }

    #[tokio::test]
    async fn test_second_bind_on_same_key_is_rejected() {
        let mut f = fixture().await;
        let first = Case::new("lint", "ruff check .");
        let second = Case::new("fmt", "ruff format .");
        f.registry.bind("ctrl+1", &first).await.unwrap();

        let err = f.registry.bind("ctrl+1", &second).await.unwrap_err();
        assert!(matches!(err, InteractiveError::KeyInUse(ref k) if k == "ctrl+1"));
        assert_eq!(f.registry.get("ctrl+1"), Some(&first));
        assert_eq!(f.external.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_key_rejected() {
        let mut f = fixture().await;
        let err = f.registry.bind("  ", &Case::new("a", "b")).await.unwrap_err();
        assert!(matches!(err, InteractiveError::InvalidInput(_)));
        assert!(f.registry.is_empty());
    }

    #[tokio::test]
    async fn test_unbind_removes_only_matching_key() {
        let foreign: KeybindingConfig = serde_json::from_value(serde_json::json!({
            "key": "ctrl+k",
            "command": "editor.action.format",
            "when": "editorFocus"
        }))
        .unwrap();
        let store = Arc::new(MemoryStore::new());
        let external = Arc::new(MemoryKeybindingConfig::with_entries(vec![foreign]));
        let mut registry =
            KeybindingRegistry::load(store, external.clone(), KeybindingAction::default()).await;

        registry.bind("ctrl+1", &Case::new("a", "x a")).await.unwrap();
        registry.bind("ctrl+2", &Case::new("b", "x b")).await.unwrap();

        assert!(registry.unbind("ctrl+1").await.unwrap());
        assert!(!registry.unbind("ctrl+1").await.unwrap());

        let keys: Vec<String> = external.snapshot().into_iter().map(|e| e.key).collect();
        assert_eq!(keys, vec!["ctrl+k", "ctrl+2"]);
        assert!(!registry.is_bound("ctrl+1"));
    }

    #[tokio::test]
    async fn test_unbind_trims_key_like_bind() {
        let mut f = fixture().await;
        f.registry.bind(" ctrl+1", &Case::new("a", "x a")).await.unwrap();
        assert!(f.registry.is_bound("ctrl+1"));

        assert!(f.registry.unbind(" ctrl+1 ").await.unwrap());
        assert!(f.registry.is_empty());
        assert!(f.external.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_unbind_with_unreadable_external_list_changes_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("keybindings.json");
        let store = Arc::new(MemoryStore::new());
        let mut registry = KeybindingRegistry::load(
            store.clone(),
            Arc::new(JsonKeybindingsFile::new(&path)),
            KeybindingAction::default(),
        )
        .await;
        registry.bind("ctrl+1", &Case::new("a", "x a")).await.unwrap();

        std::fs::write(&path, "[{").unwrap();
        let err = registry.unbind("ctrl+1").await.unwrap_err();
        assert!(matches!(
            err,
            InteractiveError::Core(crate::core::Error::KeybindingConfig(_))
        ));

        assert!(registry.is_bound("ctrl+1"));
        let raw = store.raw(StorageKey::Keybindings).unwrap();
        assert_eq!(raw["ctrl+1"]["caseName"], "a");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[{");
    }

    #[tokio::test]
    async fn test_reload_restores_bindings() {
        let mut f = fixture().await;
        f.registry.bind("alt+r", &Case::new("run", "demo run")).await.unwrap();

        let reloaded =
            KeybindingRegistry::load(f.store.clone(), f.external.clone(), KeybindingAction::default())
                .await;
        assert_eq!(reloaded.get("alt+r").unwrap().command, "demo run");
    }

    #[tokio::test]
    async fn test_rebind_after_unbind() {
        let mut f = fixture().await;
        f.registry.bind("ctrl+1", &Case::new("a", "x a")).await.unwrap();
        f.registry.unbind("ctrl+1").await.unwrap();
        f.registry.bind("ctrl+1", &Case::new("b", "x b")).await.unwrap();

        assert_eq!(f.registry.get("ctrl+1").unwrap().name, "b");
        assert_eq!(f.external.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_replace_all_resyncs_external_list() {
        let mut f = fixture().await;
        f.registry.bind("ctrl+1", &Case::new("a", "x a")).await.unwrap();

        let mut imported = BTreeMap::new();
        imported.insert("ctrl+9".to_string(), CaseData::new("z", "x z"));
        f.registry.replace_all(imported).await.unwrap();

        assert!(!f.registry.is_bound("ctrl+1"));
        let keys: Vec<String> = f.external.snapshot().into_iter().map(|e| e.key).collect();
        assert_eq!(keys, vec!["ctrl+9"]);
    }

    #[tokio::test]
    async fn test_snippet_is_external_list() {
        let mut f = fixture().await;
        f.registry.bind("ctrl+1", &Case::new("a", "x a")).await.unwrap();

        let snippet = f.registry.snippet().await.unwrap();
        let parsed: Vec<KeybindingConfig> = serde_json::from_str(&snippet).unwrap();
        assert_eq!(parsed, f.external.snapshot());
    }
}

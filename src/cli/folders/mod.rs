//! Custom folders
//!
//! Named, user-defined groups of cases shown next to the catalog. Folder names
//! are unique; a folder holds each (name, command) pair at most once.

use crate::cli::error::{InteractiveError, Result};
use crate::core::storage::{self, KeyValueStore, StorageKey};
use crate::core::{Case, CaseData};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomFolder {
    pub folder_name: String,
    #[serde(default)]
    pub cases: Vec<CaseData>,
}

impl CustomFolder {
    pub fn new(folder_name: impl Into<String>) -> Self {
        Self {
            folder_name: folder_name.into(),
            cases: Vec::new(),
        }
    }
}

pub struct FolderStore {
    store: Arc<dyn KeyValueStore>,
    folders: Vec<CustomFolder>,
}

impl FolderStore {
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let folders = storage::load_or_default(&*store, StorageKey::CustomFolders).await;
        Self { store, folders }
    }

    pub fn folders(&self) -> &[CustomFolder] {
        &self.folders
    }

    pub fn get(&self, name: &str) -> Option<&CustomFolder> {
        self.folders.iter().find(|f| f.folder_name == name)
    }

    /// Create an empty folder
    pub async fn create(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(InteractiveError::invalid_input("Folder name must not be empty"));
        }
        if self.get(name).is_some() {
            return Err(InteractiveError::invalid_input(format!(
                "Folder '{}' already exists",
                name
            )));
        }

        self.folders.push(CustomFolder::new(name));
        self.persist().await
    }

    /// Delete a folder. Returns whether it existed.
    pub async fn delete(&mut self, name: &str) -> Result<bool> {
        let before = self.folders.len();
        self.folders.retain(|f| f.folder_name != name);
        if self.folders.len() == before {
            return Ok(false);
        }
        self.persist().await?;
        Ok(true)
    }

    /// Add a case to a folder. Returns `false` if the folder already holds it.
    pub async fn add_case(&mut self, name: &str, case: &Case) -> Result<bool> {
        let data = case.to_data();
        let folder = self.folder_mut(name)?;
        if folder.cases.contains(&data) {
            return Ok(false);
        }
        folder.cases.push(data);
        self.persist().await?;
        Ok(true)
    }

    /// Remove a case from a folder. Returns whether it was present.
    pub async fn remove_case(&mut self, name: &str, case: &Case) -> Result<bool> {
        let data = case.to_data();
        let folder = self.folder_mut(name)?;
        let Some(index) = folder.cases.iter().position(|c| *c == data) else {
            return Ok(false);
        };
        folder.cases.remove(index);
        self.persist().await?;
        Ok(true)
    }

    pub async fn replace_all(&mut self, folders: Vec<CustomFolder>) -> Result<()> {
        self.folders = folders;
        self.persist().await
    }

    fn folder_mut(&mut self, name: &str) -> Result<&mut CustomFolder> {
        self.folders
            .iter_mut()
            .find(|f| f.folder_name == name)
            .ok_or_else(|| InteractiveError::FolderNotFound(name.to_string()))
    }

    async fn persist(&self) -> Result<()> {
        storage::save(&*self.store, StorageKey::CustomFolders, &self.folders).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStore;

    #[tokio::test]
    async fn test_create_and_fill_folder() {
        let backing = Arc::new(MemoryStore::new());
        let mut folders = FolderStore::load(backing.clone()).await;

        folders.create("deploy").await.unwrap();
        let case = Case::new("prod", "fab deploy --prod");
        assert!(folders.add_case("deploy", &case).await.unwrap());
        assert!(!folders.add_case("deploy", &case).await.unwrap());

        let reloaded = FolderStore::load(backing).await;
        assert_eq!(reloaded.get("deploy").unwrap().cases, vec![case.to_data()]);
    }

    #[tokio::test]
    async fn test_duplicate_or_blank_folder_rejected() {
        let mut folders = FolderStore::load(Arc::new(MemoryStore::new())).await;
        folders.create("deploy").await.unwrap();

        assert!(matches!(
            folders.create("deploy").await,
            Err(InteractiveError::InvalidInput(_))
        ));
        assert!(matches!(
            folders.create("  ").await,
            Err(InteractiveError::InvalidInput(_))
        ));
        assert_eq!(folders.folders().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_folder() {
        let mut folders = FolderStore::load(Arc::new(MemoryStore::new())).await;
        let err = folders
            .add_case("nope", &Case::new("a", "b"))
            .await
            .unwrap_err();
        assert!(matches!(err, InteractiveError::FolderNotFound(_)));
        assert!(!folders.delete("nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_case_and_delete() {
        let mut folders = FolderStore::load(Arc::new(MemoryStore::new())).await;
        folders.create("ops").await.unwrap();
        let case = Case::new("logs", "kubectl logs");
        folders.add_case("ops", &case).await.unwrap();

        assert!(folders.remove_case("ops", &case).await.unwrap());
        assert!(!folders.remove_case("ops", &case).await.unwrap());
        assert!(folders.delete("ops").await.unwrap());
        assert!(folders.folders().is_empty());
    }
}

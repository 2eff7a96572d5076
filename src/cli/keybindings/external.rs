//! External keybinding configuration
//!
//! The editor-side list of keybinding records. Entries are appended on bind
//! and removed by key on unbind; entries that belong to other commands are
//! never touched.

use crate::core::error::{Error, Result};
use crate::core::CaseData;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One record of the external keybinding list.
///
/// Records written by other tools may lack `args`/`when` or carry extra
/// fields; all of it is kept as-is when the list is saved back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeybindingConfig {
    pub key: String,
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl KeybindingConfig {
    pub fn new(key: &str, command: &str, case: CaseData, when: &str) -> Self {
        Self {
            key: key.to_string(),
            command: command.to_string(),
            args: serde_json::to_value(case).ok(),
            when: Some(when.to_string()),
            extra: Map::new(),
        }
    }

    /// The case carried in `args`, if the record is one of ours
    pub fn case_data(&self) -> Option<CaseData> {
        self.args
            .clone()
            .and_then(|args| serde_json::from_value(args).ok())
    }
}

/// Storage of the external keybinding list
#[async_trait]
pub trait KeybindingConfigStore: Send + Sync {
    async fn load(&self) -> Result<Vec<KeybindingConfig>>;
    async fn save(&self, entries: &[KeybindingConfig]) -> Result<()>;
}

/// A JSON array of [`KeybindingConfig`] records on disk
#[derive(Debug, Clone)]
pub struct JsonKeybindingsFile {
    path: PathBuf,
}

impl JsonKeybindingsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl KeybindingConfigStore for JsonKeybindingsFile {
    async fn load(&self) -> Result<Vec<KeybindingConfig>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        // An unreadable list must never be overwritten
        serde_json::from_str(&content).map_err(|e| {
            Error::keybinding_config(format!("{}: {}", self.path.display(), e))
        })
    }

    async fn save(&self, entries: &[KeybindingConfig]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(entries)?;
        tokio::fs::write(&self.path, content).await?;
        debug!(path = %self.path.display(), entries = entries.len(), "keybindings written");
        Ok(())
    }
}

/// In-memory list, used by tests
#[derive(Debug, Default)]
pub struct MemoryKeybindingConfig {
    entries: Mutex<Vec<KeybindingConfig>>,
}

impl MemoryKeybindingConfig {
    pub fn with_entries(entries: Vec<KeybindingConfig>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }

    pub fn snapshot(&self) -> Vec<KeybindingConfig> {
        self.entries.lock().clone()
    }
}

#[async_trait]
impl KeybindingConfigStore for MemoryKeybindingConfig {
    async fn load(&self) -> Result<Vec<KeybindingConfig>> {
        Ok(self.snapshot())
    }

    async fn save(&self, entries: &[KeybindingConfig]) -> Result<()> {
        *self.entries.lock() = entries.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entry(key: &str) -> KeybindingConfig {
        KeybindingConfig::new(
            key,
            "toolcase.runCaseWithKeybinding",
            CaseData::new("lint", "ruff check"),
            "view == toolcase",
        )
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let temp_dir = tempdir().unwrap();
        let file = JsonKeybindingsFile::new(temp_dir.path().join("keybindings.json"));
        assert!(file.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let temp_dir = tempdir().unwrap();
        let file = JsonKeybindingsFile::new(temp_dir.path().join("nested/keybindings.json"));
        file.save(&[entry("ctrl+1")]).await.unwrap();

        let loaded = file.load().await.unwrap();
        assert_eq!(loaded, vec![entry("ctrl+1")]);

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
        assert_eq!(raw[0]["args"]["caseName"], "lint");
        assert_eq!(raw[0]["when"], "view == toolcase");
    }

    #[tokio::test]
    async fn test_foreign_records_survive_round_trip() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("keybindings.json");
        std::fs::write(
            &path,
            r#"[{"key": "ctrl+k", "command": "editor.action.format", "mac": "cmd+k"}]"#,
        )
        .unwrap();

        let file = JsonKeybindingsFile::new(&path);
        let mut entries = file.load().await.unwrap();
        assert!(entries[0].args.is_none());
        assert!(entries[0].case_data().is_none());
        entries.push(entry("ctrl+1"));
        file.save(&entries).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[0]["mac"], "cmd+k");
        assert!(raw[0].get("when").is_none());
        assert_eq!(raw[1]["args"]["caseCommand"], "ruff check");
    }

    #[tokio::test]
    async fn test_unreadable_file_is_an_error() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("keybindings.json");
        std::fs::write(&path, "[{\"key\": ").unwrap();

        let file = JsonKeybindingsFile::new(&path);
        assert!(matches!(
            file.load().await,
            Err(Error::KeybindingConfig(_))
        ));
    }
}

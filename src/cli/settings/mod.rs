//! Settings export/import
//!
//! One JSON document carrying every persisted store:
//!
//! ```json
//! {
//!   "lastTasks":  [{"caseName": "...", "caseCommand": "..."}],
//!   "favorites":  [{"caseName": "...", "caseCommand": "..."}],
//!   "keybindings": {"ctrl+shift+1": {"caseName": "...", "caseCommand": "..."}},
//!   "cases":      [{"commandKey": "ruff::ruff", "caseName": "...", "caseCommand": "..."}],
//!   "customFolders": [{"folderName": "...", "cases": [...]}]
//! }
//! ```
//!
//! Every section is optional on import; an absent section leaves its store
//! alone. Roles are not exported, they follow from the section a case is in.

use crate::cli::cases::CaseEntry;
use crate::cli::error::{InteractiveError, Result};
use crate::cli::folders::CustomFolder;
use crate::core::CaseData;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::info;

/// Default file name offered for exports
pub const DEFAULT_EXPORT_FILE: &str = "uv-tool-settings.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsBundle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_tasks: Option<Vec<CaseData>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorites: Option<Vec<CaseData>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keybindings: Option<BTreeMap<String, CaseData>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cases: Option<Vec<CaseEntry>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_folders: Option<Vec<CustomFolder>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
}

impl SettingsBundle {
    /// Parse and validate a whole document. Nothing is applied here, so a
    /// malformed document can never leave a partial import behind.
    pub fn parse(text: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| InteractiveError::import(format!("not valid JSON: {}", e)))?;
        if !value.is_object() {
            return Err(InteractiveError::import("document must be a JSON object"));
        }
        let bundle: Self =
            serde_json::from_value(value).map_err(|e| InteractiveError::import(e.to_string()))?;
        bundle.validate_folders()?;
        Ok(bundle)
    }

    /// Folder names must be non-blank and unique, as `folder create` requires
    fn validate_folders(&self) -> Result<()> {
        let Some(folders) = &self.custom_folders else {
            return Ok(());
        };
        let mut seen = HashSet::new();
        for folder in folders {
            let name = folder.folder_name.trim();
            if name.is_empty() {
                return Err(InteractiveError::import("customFolders: blank folderName"));
            }
            if !seen.insert(name) {
                return Err(InteractiveError::import(format!(
                    "customFolders: duplicate folderName '{}'",
                    name
                )));
            }
        }
        Ok(())
    }

    pub async fn read_from(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        Self::parse(&text)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub async fn write_to(&self, path: &Path) -> Result<()> {
        let content = self.to_json()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, content).await?;
        info!(path = %path.display(), "settings exported");
        Ok(())
    }

    /// Names of the sections present in this bundle
    pub fn sections(&self) -> Vec<&'static str> {
        let mut sections = Vec::new();
        if self.last_tasks.is_some() {
            sections.push("lastTasks");
        }
        if self.favorites.is_some() {
            sections.push("favorites");
        }
        if self.keybindings.is_some() {
            sections.push("keybindings");
        }
        if self.cases.is_some() {
            sections.push("cases");
        }
        if self.custom_folders.is_some() {
            sections.push("customFolders");
        }
        sections
    }
}

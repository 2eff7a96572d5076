//! Key-value persistence
//!
//! Every store is persisted under one fixed [`StorageKey`] as a JSON value.
//! Reads never fail: a missing or undecodable value loads as the store's empty
//! default. Writes are awaited by the mutating store so callers observe a
//! completed write before relying on it.

use super::error::{Error, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// The fixed keys of the persistent store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Cases,
    LastTasks,
    Favorites,
    Keybindings,
    CustomFolders,
}

impl StorageKey {
    pub const ALL: [StorageKey; 5] = [
        Self::Cases,
        Self::LastTasks,
        Self::Favorites,
        Self::Keybindings,
        Self::CustomFolders,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cases => "uvCases",
            Self::LastTasks => "uvLastTasks",
            Self::Favorites => "uvFavorites",
            Self::Keybindings => "uvKeybindings",
            Self::CustomFolders => "uvCustomFolders",
        }
    }
}

/// Persistent key-value store backing all user state
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Current value for `key`, if any
    async fn get(&self, key: StorageKey) -> Option<Value>;

    /// Replace the value for `key` and wait until it is durable
    async fn set(&self, key: StorageKey, value: Value) -> Result<()>;
}

/// Load and decode a value, falling back to `T::default()`
pub async fn load_or_default<T>(store: &dyn KeyValueStore, key: StorageKey) -> T
where
    T: DeserializeOwned + Default,
{
    match store.get(key).await {
        Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
            warn!(key = key.as_str(), error = %e, "discarding undecodable stored value");
            T::default()
        }),
        None => T::default(),
    }
}

/// Encode and persist a value
pub async fn save<T>(store: &dyn KeyValueStore, key: StorageKey, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let value = serde_json::to_value(value)?;
    store.set(key, value).await
}

/// All keys in a single pretty-printed JSON document on disk
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Mutex<Map<String, Value>>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing or corrupt file opens empty.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => Map::new(),
            Ok(content) => match serde_json::from_str::<Value>(&content) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    warn!(path = %path.display(), "state file is not a JSON object, starting empty");
                    Map::new()
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to parse state file, starting empty");
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read state file, starting empty");
                Map::new()
            }
        };

        Self {
            path,
            values: Mutex::new(values),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn flush(&self, content: String) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), "state flushed");
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: StorageKey) -> Option<Value> {
        self.values.lock().get(key.as_str()).cloned()
    }

    async fn set(&self, key: StorageKey, value: Value) -> Result<()> {
        let content = {
            let mut values = self.values.lock();
            values.insert(key.as_str().to_string(), value);
            serde_json::to_string_pretty(&*values)?
        };
        self.flush(content).await
    }
}

/// In-memory store, used by tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<StorageKey, Value>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set` fail
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Raw stored value, bypassing decoding
    pub fn raw(&self, key: StorageKey) -> Option<Value> {
        self.values.lock().get(&key).cloned()
    }

    pub fn insert_raw(&self, key: StorageKey, value: Value) {
        self.values.lock().insert(key, value);
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: StorageKey) -> Option<Value> {
        self.raw(key)
    }

    async fn set(&self, key: StorageKey, value: Value) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::storage(format!(
                "write to {} rejected",
                key.as_str()
            )));
        }
        self.values.lock().insert(key, value);
        Ok(())
    }
}

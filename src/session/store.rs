//! Key/value storage behind the session context.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::SessionError;

/// Synchronous string storage, the console's equivalent of browser local
/// storage. Reads never fail; a missing or unreadable value is `None`.
pub trait SessionStore: Send + Sync {
    fn load(&self, key: &str) -> Option<String>;

    fn store(&self, key: &str, value: &str) -> Result<(), SessionError>;

    fn remove(&self, key: &str) -> Result<(), SessionError>;
}

fn read_map(lock: &RwLock<HashMap<String, String>>) -> RwLockReadGuard<'_, HashMap<String, String>> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_map(lock: &RwLock<HashMap<String, String>>) -> RwLockWriteGuard<'_, HashMap<String, String>> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Process-lifetime store
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        read_map(&self.values).get(key).cloned()
    }

    fn store(&self, key: &str, value: &str) -> Result<(), SessionError> {
        write_map(&self.values).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        write_map(&self.values).remove(key);
        Ok(())
    }
}

/// JSON file store; every write rewrites the whole file
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: RwLock<HashMap<String, String>>,
}

impl FileStore {
    /// Open the store, reading any existing file. A corrupt file is
    /// treated as empty and overwritten on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable session file {:?}: {}", path, e);
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };

        Self {
            path,
            values: RwLock::new(values),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &HashMap<String, String>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| SessionError::Io {
                    path: parent.to_path_buf(),
                    error: e.to_string(),
                })?;
            }
        }

        let content = serde_json::to_string_pretty(values)
            .map_err(|e| SessionError::Serialize(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)
            .and_then(|_| std::fs::rename(&tmp, &self.path))
            .map_err(|e| SessionError::Io {
                path: self.path.clone(),
                error: e.to_string(),
            })
    }
}

impl SessionStore for FileStore {
    fn load(&self, key: &str) -> Option<String> {
        read_map(&self.values).get(key).cloned()
    }

    fn store(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut values = write_map(&self.values);
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        let mut values = write_map(&self.values);
        if values.remove(key).is_some() {
            self.persist(&values)?;
        }
        Ok(())
    }
}

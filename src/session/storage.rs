//! Storage Port
//!
//! Key/value persistence behind a single injectable trait, mirroring the
//! browser `localStorage` contract: string keys, string values, and every
//! call goes straight to the backing store.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::error::{SessionError, SessionResult};

/// Persistent string key/value storage
pub trait StoragePort: Send + Sync {
    /// Read a value, `None` when the key is absent
    fn get_item(&self, key: &str) -> SessionResult<Option<String>>;

    /// Insert or replace a value
    fn set_item(&self, key: &str, value: &str) -> SessionResult<()>;

    /// Remove a value; removing an absent key is not an error
    fn remove_item(&self, key: &str) -> SessionResult<()>;
}

/// Process-local storage, used by tests and throwaway sessions
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> SessionResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.items
            .lock()
            .map_err(|e| SessionError::Lock(e.to_string()))
    }
}

impl StoragePort for MemoryStorage {
    fn get_item(&self, key: &str) -> SessionResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> SessionResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> SessionResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// JSON-object file storage
///
/// The file is re-read on every call and rewritten on every mutation, so two
/// processes sharing a file see each other's writes (last writer wins).
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> SessionResult<BTreeMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Map to mutate; a corrupt file is replaced rather than blocking writes
    fn read_map_for_write(&self) -> SessionResult<BTreeMap<String, String>> {
        match self.read_map() {
            Err(SessionError::Serialization(e)) => {
                tracing::warn!(path = ?self.path, error = %e, "Discarding malformed storage file");
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> SessionResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(map)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl StoragePort for FileStorage {
    fn get_item(&self, key: &str) -> SessionResult<Option<String>> {
        Ok(self.read_map()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> SessionResult<()> {
        let mut map = self.read_map_for_write()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove_item(&self, key: &str) -> SessionResult<()> {
        let mut map = self.read_map_for_write()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("adminId").unwrap(), None);

        storage.set_item("adminId", "42").unwrap();
        assert_eq!(storage.get_item("adminId").unwrap().as_deref(), Some("42"));

        storage.remove_item("adminId").unwrap();
        storage.remove_item("adminId").unwrap();
        assert_eq!(storage.get_item("adminId").unwrap(), None);
    }

    #[test]
    fn test_file_storage_persists_across_handles() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let first = FileStorage::new(&path);
        first.set_item("adminToken", "tok").unwrap();
        first.set_item("adminId", "7").unwrap();

        let second = FileStorage::new(&path);
        assert_eq!(second.get_item("adminToken").unwrap().as_deref(), Some("tok"));

        second.remove_item("adminToken").unwrap();
        assert_eq!(first.get_item("adminToken").unwrap(), None);
        assert_eq!(first.get_item("adminId").unwrap().as_deref(), Some("7"));
    }

    #[test]
    fn test_file_storage_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("absent.json"));
        assert_eq!(storage.get_item("currentUser").unwrap(), None);
        storage.remove_item("currentUser").unwrap();
        assert!(!storage.path().exists());
    }

    #[test]
    fn test_file_storage_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json at all").unwrap();

        let storage = FileStorage::new(&path);
        assert!(matches!(
            storage.get_item("adminId"),
            Err(SessionError::Serialization(_))
        ));

        storage.set_item("adminId", "1").unwrap();
        assert_eq!(storage.get_item("adminId").unwrap().as_deref(), Some("1"));
    }
}

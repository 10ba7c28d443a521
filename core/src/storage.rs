//! Persistent key/value storage for the session token.
//!
//! # Design
//! Mirrors a device's local key/value store: string keys, string values,
//! read on demand. `FileStore` keeps every key in one JSON object and
//! rewrites the file on each change, which is plenty for a handful of keys.
//! Each rewrite goes to a temporary file in the same directory that is then
//! renamed over the old one, so readers see either the old or the new map.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

/// Key the session token is stored under.
pub const USER_TOKEN_KEY: &str = "userToken";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("storage file is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait TokenStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

pub fn load_token<S: TokenStore + ?Sized>(store: &S) -> Result<Option<String>, StorageError> {
    store.get(USER_TOKEN_KEY)
}

pub fn save_token<S: TokenStore + ?Sized>(store: &S, token: &str) -> Result<(), StorageError> {
    store.set(USER_TOKEN_KEY, token)
}

pub fn clear_token<S: TokenStore + ?Sized>(store: &S) -> Result<(), StorageError> {
    store.remove(USER_TOKEN_KEY)
}

/// In-process store; contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        lock(&self.entries).remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON file. A missing file reads as empty.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    guard: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(serde_json::to_string_pretty(entries)?.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        debug!(path = %self.path.display(), keys = entries.len(), "storage file written");
        Ok(())
    }
}

impl TokenStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = lock(&self.guard);
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = lock(&self.guard);
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = lock(&self.guard);
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

// Poisoning is ignored: every operation leaves the map consistent.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(load_token(&store).unwrap(), None);
        save_token(&store, "abc").unwrap();
        assert_eq!(load_token(&store).unwrap().as_deref(), Some("abc"));
        clear_token(&store).unwrap();
        assert_eq!(load_token(&store).unwrap(), None);
    }

    #[test]
    fn file_store_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested/state.json"));
        assert_eq!(store.get(USER_TOKEN_KEY).unwrap(), None);
        // Removing from an empty store does not create the file.
        store.remove(USER_TOKEN_KEY).unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        save_token(&FileStore::new(&path), "persisted").unwrap();
        let reopened = FileStore::new(&path);
        assert_eq!(load_token(&reopened).unwrap().as_deref(), Some("persisted"));

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["userToken"], "persisted");
    }

    #[test]
    fn file_store_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("state.json"));
        store.set("theme", "dark").unwrap();
        save_token(&store, "t").unwrap();
        clear_token(&store).unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn rewrites_leave_only_the_store_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("state.json"));
        for token in ["a", "b", "c"] {
            save_token(&store, token).unwrap();
        }
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("state.json")]);
        assert_eq!(load_token(&store).unwrap().as_deref(), Some("c"));
    }

    #[test]
    fn interrupted_write_keeps_previous_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("state.json"));
        save_token(&store, "old").unwrap();

        // A half-written sibling, as a crash before the rename leaves it.
        let mut partial = NamedTempFile::new_in(dir.path()).unwrap();
        partial.write_all(br#"{"userTo"#).unwrap();
        partial.into_temp_path().keep().unwrap();

        assert_eq!(load_token(&store).unwrap().as_deref(), Some("old"));
        save_token(&store, "new").unwrap();
        assert_eq!(load_token(&store).unwrap().as_deref(), Some("new"));
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{not json").unwrap();
        let err = FileStore::new(&path).get(USER_TOKEN_KEY).unwrap_err();
        assert!(matches!(err, StorageError::Json(_)));
    }
}

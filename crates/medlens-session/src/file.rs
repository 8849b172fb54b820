//! JSON-file implementation of `SessionStorage`.
//!
//! The whole map is one JSON object on disk, rewritten on every change.
//! A missing file reads as an empty map.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing::debug;

use medlens_contracts::error::{MedlensError, MedlensResult};
use medlens_core::traits::SessionStorage;

pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> MedlensResult<BTreeMap<String, String>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(MedlensError::Storage {
                    reason: format!("cannot read '{}': {e}", self.path.display()),
                })
            }
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|e| MedlensError::Storage {
            reason: format!("'{}' is not a session file: {e}", self.path.display()),
        })
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> MedlensResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| MedlensError::Storage {
                reason: format!("cannot create '{}': {e}", parent.display()),
            })?;
        }
        let body = serde_json::to_string_pretty(entries).map_err(|e| MedlensError::Storage {
            reason: e.to_string(),
        })?;
        fs::write(&self.path, body).map_err(|e| MedlensError::Storage {
            reason: format!("cannot write '{}': {e}", self.path.display()),
        })?;
        debug!(path = %self.path.display(), keys = entries.len(), "session file written");
        Ok(())
    }

    fn update(&self, change: impl FnOnce(&mut BTreeMap<String, String>) -> bool) -> MedlensResult<()> {
        let _guard = self.write_lock.lock().map_err(|_| MedlensError::Storage {
            reason: "session file lock poisoned".to_string(),
        })?;
        let mut entries = self.load()?;
        if change(&mut entries) {
            self.save(&entries)?;
        }
        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> MedlensResult<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> MedlensResult<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> MedlensResult<()> {
        self.update(|entries| entries.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_empty_and_remove_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("session.json"));
        assert_eq!(storage.get("auth_token").unwrap(), None);
        storage.remove("auth_token").unwrap();
        assert!(!storage.path().exists());
    }

    #[test]
    fn values_persist_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        FileStorage::new(&path).set("auth_token", "tok-1").unwrap();
        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get("auth_token").unwrap().as_deref(), Some("tok-1"));

        reopened.remove("auth_token").unwrap();
        assert_eq!(FileStorage::new(&path).get("auth_token").unwrap(), None);
    }

    #[test]
    fn corrupt_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();
        let err = FileStorage::new(&path).get("auth_token").unwrap_err();
        assert!(matches!(err, MedlensError::Storage { .. }));
    }
}

//! In-memory implementation of `SessionStorage`.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use medlens_contracts::error::{MedlensError, MedlensResult};
use medlens_core::traits::SessionStorage;

/// Key/value storage that lives as long as the process.
///
/// Clones share the same map, so a test can keep a handle and inspect what
/// the store wrote.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MedlensResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries.lock().map_err(|_| MedlensError::Storage {
            reason: "in-memory storage lock poisoned".to_string(),
        })
    }
}

impl SessionStorage for InMemoryStorage {
    fn get(&self, key: &str) -> MedlensResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> MedlensResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> MedlensResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

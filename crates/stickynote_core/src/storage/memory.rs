//! In-process key-value store.

use super::{is_valid_key, KeyValueStore, StorageError, StorageResult};
use std::collections::BTreeMap;

/// Map-backed store for hosts without durable storage, and for tests.
///
/// Can be switched to unavailable to simulate a store that rejects writes.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `entries`.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
            unavailable: false,
        }
    }

    /// When set, every `set`/`remove` fails with `StorageError::Unavailable`.
    /// Reads keep working so already-saved values stay observable.
    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    /// Raw view of the stored value, bypassing error handling.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        if !is_valid_key(key) {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        if !is_valid_key(key) {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        if self.unavailable {
            return Err(StorageError::Unavailable(
                "memory store marked unavailable".to_string(),
            ));
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        if !is_valid_key(key) {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        if self.unavailable {
            return Err(StorageError::Unavailable(
                "memory store marked unavailable".to_string(),
            ));
        }
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryStore;
    use crate::storage::{KeyValueStore, StorageError};

    #[test]
    fn set_then_get_returns_value() {
        let mut store = MemoryStore::new();
        store.set("notes", "[]").unwrap();
        assert_eq!(store.get("notes").unwrap().as_deref(), Some("[]"));
        assert_eq!(store.get("darkMode").unwrap(), None);
    }

    #[test]
    fn unavailable_store_rejects_writes_but_keeps_reads() {
        let mut store = MemoryStore::with_entries([("darkMode", "true")]);
        store.set_unavailable(true);

        let err = store.set("darkMode", "false").unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
        assert_eq!(store.get("darkMode").unwrap().as_deref(), Some("true"));
    }

    #[test]
    fn invalid_key_is_rejected() {
        let mut store = MemoryStore::new();
        let err = store.set("../escape", "x").unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }
}

//! In-process key-value store.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::{StorageError, StorageResult};

use super::KeyValueStore;

/// A [`KeyValueStore`] held in memory.
///
/// Optionally enforces a byte quota over all keys and values, the way a
/// browser caps per-origin storage, and can be created in a disabled state
/// where every operation fails.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
    quota_bytes: Option<usize>,
    disabled: bool,
}

impl MemoryStore {
    /// Create an empty, unlimited store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that rejects writes pushing it past `quota_bytes`.
    #[must_use]
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::default()
        }
    }

    /// Create a store on which every operation fails.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// Whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    fn check_enabled(&self) -> StorageResult<()> {
        if self.disabled {
            Err(StorageError::Unavailable(
                "in-memory store is disabled".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    fn size_after_write(items: &HashMap<String, String>, key: &str, value: &str) -> usize {
        items
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum::<usize>()
            + key.len()
            + value.len()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        self.check_enabled()?;
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.check_enabled()?;
        let mut items = self.items.borrow_mut();
        if let Some(limit) = self.quota_bytes {
            let size = Self::size_after_write(&items, key, value);
            if size > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    size,
                    limit,
                });
            }
        }
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.check_enabled()?;
        self.items.borrow_mut().remove(key);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.set_item("k", "v").unwrap();
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("v"));
        assert_eq!(store.len(), 1);

        store.remove_item("k").unwrap();
        assert!(store.get_item("k").unwrap().is_none());
    }

    #[test]
    fn test_quota_rejects_oversized_write() {
        let store = MemoryStore::with_quota(10);
        store.set_item("k", "12345").unwrap();

        let err = store.set_item("k2", "123456").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { limit: 10, .. }));
        assert!(store.get_item("k2").unwrap().is_none());
    }

    #[test]
    fn test_quota_counts_replacement_once() {
        let store = MemoryStore::with_quota(6);
        store.set_item("k", "12345").unwrap();
        // Replacing the same key does not double count the old value
        store.set_item("k", "54321").unwrap();
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("54321"));
    }

    #[test]
    fn test_disabled_store_fails() {
        let store = MemoryStore::disabled();

        assert!(matches!(
            store.get_item("k"),
            Err(StorageError::Unavailable(_))
        ));
        assert!(store.set_item("k", "v").is_err());
        assert!(store.remove_item("k").is_err());
    }
}

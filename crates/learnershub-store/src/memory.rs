//! In-process record store.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use crate::error::Result;
use crate::RecordStore;

/// Record store backed by an ordered in-memory map. Contents vanish on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records.remove(key);
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records
            .range(prefix.to_string()..)
            .map(|(k, _)| k)
            .take_while(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_delete() {
        let store = MemoryStore::new();
        assert!(store.get("a").unwrap().is_none());

        store.put("a", b"1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some(&b"1"[..]));

        store.put("a", b"2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some(&b"2"[..]));

        store.delete("a").unwrap();
        assert!(store.get("a").unwrap().is_none());
        store.delete("a").unwrap();
    }

    #[test]
    fn prefix_scan_is_sorted_and_bounded() {
        let store = MemoryStore::new();
        for key in ["course:2", "course:1", "courses", "account:x", "course;"] {
            store.put(key, b"{}").unwrap();
        }
        assert_eq!(
            store.keys_with_prefix("course:").unwrap(),
            vec!["course:1".to_string(), "course:2".to_string()]
        );
    }
}

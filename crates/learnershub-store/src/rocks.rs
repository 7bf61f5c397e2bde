//! `RocksDB` record store.

use std::path::Path;
use std::sync::Arc;

use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, Direction, IteratorMode,
    MultiThreaded, Options,
};

use crate::error::{Result, StoreError};
use crate::schema::{all_column_families, cf};
use crate::RecordStore;

/// RocksDB-backed record store.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(cf::RECORDS)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {}", cf::RECORDS)))
    }
}

impl RecordStore for RocksStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let cf = self.cf()?;
        self.db
            .get_cf(&cf, key.as_bytes())
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let cf = self.cf()?;
        self.db
            .put_cf(&cf, key.as_bytes(), value)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn delete(&self, key: &str) -> Result<()> {
        let cf = self.cf()?;
        self.db
            .delete_cf(&cf, key.as_bytes())
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let cf = self.cf()?;
        let iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(prefix.as_bytes(), Direction::Forward));

        let mut keys = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if !key.starts_with(prefix.as_bytes()) {
                break;
            }
            match String::from_utf8(key.to_vec()) {
                Ok(key) => keys.push(key),
                Err(e) => tracing::warn!(error = %e, "Skipping non-UTF-8 record key"),
            }
        }

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();
        (store, dir)
    }

    #[test]
    fn record_crud() {
        let (store, _dir) = create_test_store();

        store.put("course:1", b"{}").unwrap();
        assert_eq!(store.get("course:1").unwrap().as_deref(), Some(&b"{}"[..]));

        store.delete("course:1").unwrap();
        assert!(store.get("course:1").unwrap().is_none());
    }

    #[test]
    fn prefix_scan() {
        let (store, _dir) = create_test_store();
        store.put("course:2", b"{}").unwrap();
        store.put("course:1", b"{}").unwrap();
        store.put("courses", b"{}").unwrap();
        store.put("account:a@b.co", b"{}").unwrap();

        assert_eq!(
            store.keys_with_prefix("course:").unwrap(),
            vec!["course:1".to_string(), "course:2".to_string()]
        );
    }
}

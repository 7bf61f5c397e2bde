//! File-per-key record store.
//!
//! Each record is one file under the data directory, named by the SHA-256 of
//! its key so any key length fits in a file name. The file starts with the key
//! on its own line, followed by the value bytes. Writes go to a unique temporary
//! file in the same directory and are persisted over the target.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::error::{Result, StoreError};
use crate::RecordStore;

const EXTENSION: &str = "rec";

/// Record store persisting each key as a file.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The data directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.dir.join(format!("{}.{EXTENSION}", hex::encode(digest)))
    }

    /// The key recorded in a record file's header line.
    fn key_for(path: &Path) -> Result<Option<String>> {
        if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
            return Ok(None);
        }
        let file = match File::open(path) {
            Ok(file) => file,
            // Deleted between listing and reading.
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut header = String::new();
        BufReader::new(file).read_line(&mut header)?;
        Ok(header.strip_suffix('\n').map(str::to_string))
    }
}

impl RecordStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let bytes = match fs::read(self.path_for(key)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Database(format!("read {key}: {e}"))),
        };

        match bytes.iter().position(|&b| b == b'\n') {
            Some(split) if &bytes[..split] == key.as_bytes() => Ok(Some(bytes[split + 1..].to_vec())),
            _ => {
                tracing::warn!(key = %key, "Ignoring record file with a bad key header");
                Ok(None)
            }
        }
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        if key.contains('\n') {
            return Err(StoreError::Database(format!("write {key:?}: key contains a newline")));
        }
        let write_err = |e: std::io::Error| StoreError::Database(format!("write {key}: {e}"));

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(write_err)?;
        tmp.write_all(key.as_bytes()).map_err(write_err)?;
        tmp.write_all(b"\n").map_err(write_err)?;
        tmp.write_all(value).map_err(write_err)?;
        tmp.persist(self.path_for(key))
            .map_err(|e| write_err(e.error))?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Database(format!("delete {key}: {e}"))),
        }
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if let Some(key) = Self::key_for(&path)? {
                if key.starts_with(prefix) {
                    keys.push(key);
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

//! Directory-backed key-value store.
//!
//! # Responsibility
//! - Map each key to one file (`<dir>/<key>.json`) under a data directory.
//! - Replace values atomically so readers never observe half-written files.
//!
//! # Invariants
//! - The data directory exists once `open` returns.
//! - A write lands in a sibling temp file first and is renamed into place.
//! - A failed write leaves no temp file behind.

use super::{is_valid_key, KeyValueStore, StorageError, StorageResult};
use log::{error, info, warn};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

const VALUE_FILE_EXTENSION: &str = "json";
const TEMP_FILE_SUFFIX: &str = "tmp";

/// Durable store keeping one file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens (and creates when missing) a store rooted at `dir`.
    ///
    /// # Side effects
    /// - Creates the directory tree.
    /// - Emits `store_open` logging events with duration and status.
    pub fn open(dir: impl AsRef<Path>) -> StorageResult<Self> {
        let started_at = Instant::now();
        let dir = dir.as_ref().to_path_buf();
        info!("event=store_open module=storage status=start mode=file");

        match fs::create_dir_all(&dir) {
            Ok(()) => {
                info!(
                    "event=store_open module=storage status=ok mode=file duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(Self { dir })
            }
            Err(err) => {
                error!(
                    "event=store_open module=storage status=error mode=file duration_ms={} error_code=store_dir_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(StorageError::Unavailable(format!(
                    "cannot create data directory `{}`: {err}",
                    dir.display()
                )))
            }
        }
    }

    /// Root directory of this store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn value_path(&self, key: &str) -> StorageResult<PathBuf> {
        if !is_valid_key(key) {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.{VALUE_FILE_EXTENSION}")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.value_path(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.value_path(key)?;
        let temp_path = path.with_extension(format!("{VALUE_FILE_EXTENSION}.{TEMP_FILE_SUFFIX}"));

        replace_via_temp(&temp_path, &path, value).map_err(|source| {
            if let Err(cleanup) = fs::remove_file(&temp_path) {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!(
                        "event=store_write module=storage status=error key={key} error_code=temp_cleanup_failed error={cleanup}"
                    );
                }
            }
            StorageError::Io {
                key: key.to_string(),
                source,
            }
        })
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        let path = self.value_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

fn replace_via_temp(temp_path: &Path, path: &Path, value: &str) -> std::io::Result<()> {
    let mut file = fs::File::create(temp_path)?;
    file.write_all(value.as_bytes())?;
    file.sync_all()?;
    drop(file);
    fs::rename(temp_path, path)
}

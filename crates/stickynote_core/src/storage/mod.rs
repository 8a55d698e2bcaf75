//! Durable key-value storage contracts and backends.
//!
//! # Responsibility
//! - Define the string-keyed get/set capability the board persists through.
//! - Provide an in-memory backend and a directory-backed file backend.
//!
//! # Invariants
//! - Values are opaque UTF-8 strings; encoding is owned by `repo::snapshot`.
//! - A successful `set` is visible to the next `get` on the same store.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

pub type StorageResult<T> = Result<T, StorageError>;

/// Failure reported by a durable store.
#[derive(Debug)]
pub enum StorageError {
    /// Key contains characters the backend cannot address.
    InvalidKey(String),
    /// Backend refuses reads/writes entirely (quota, disabled storage, ...).
    Unavailable(String),
    /// I/O failure while touching one key.
    Io {
        key: String,
        source: std::io::Error,
    },
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKey(key) => write!(f, "invalid storage key `{key}`"),
            Self::Unavailable(reason) => write!(f, "storage unavailable: {reason}"),
            Self::Io { key, source } => write!(f, "storage i/o failed for `{key}`: {source}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::InvalidKey(_) | Self::Unavailable(_) => None,
        }
    }
}

/// String-keyed durable store (browser local-storage equivalent).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&mut self, key: &str) -> StorageResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}

/// Returns whether `key` is addressable by every bundled backend.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
}

#[cfg(test)]
mod tests {
    use super::is_valid_key;

    #[test]
    fn key_validation_accepts_board_keys() {
        assert!(is_valid_key("notes"));
        assert!(is_valid_key("darkMode"));
        assert!(is_valid_key("board-2_backup"));
    }

    #[test]
    fn key_validation_rejects_path_like_keys() {
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("../notes"));
        assert!(!is_valid_key("a/b"));
        assert!(!is_valid_key("with space"));
    }
}

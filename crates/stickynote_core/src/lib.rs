//! Core domain logic for the sticky note board.
//! This crate is the single source of truth for board state invariants.

pub mod config;
pub mod drag;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod storage;

pub use config::{BoardConfig, ConfigError};
pub use drag::controller::{DragController, DragState, PointerCapture};
pub use logging::{
    default_log_level, init_logging, level_name, logging_status, parse_level, LoggingError,
};
pub use model::note::{AppState, Note, NoteColor, NoteId, Position};
pub use repo::snapshot::SnapshotError;
pub use service::board::Board;
pub use service::events::{StoreEvent, SubscriptionId};
pub use service::id_gen::{IdGenerator, UuidIdGenerator};
pub use service::note_store::{NoteStore, PersistStatus};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError, StorageResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

//! Board state repository over a durable key-value store.
//!
//! # Responsibility
//! - Read persisted notes/dark-mode with fail-open defaults.
//! - Write full snapshots of each sub-state under its own key.
//!
//! # Invariants
//! - Reads never fail: absent, unreadable or malformed values yield defaults.
//! - Writes always carry the complete collection, never deltas.

use crate::model::note::{AppState, Note, DARK_MODE_KEY, NOTES_KEY};
use crate::repo::snapshot::{decode_dark_mode, decode_notes, encode_dark_mode, encode_notes};
use crate::storage::{KeyValueStore, StorageResult};
use log::{debug, error, warn};

/// Persistence gateway used by `NoteStore`.
pub struct StateRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> StateRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Loads the full persisted state, substituting defaults per key.
    pub fn load(&self) -> AppState {
        AppState {
            notes: self.load_notes(),
            dark_mode: self.load_dark_mode(),
        }
    }

    /// Loads the note collection, or the seed collection when unusable.
    pub fn load_notes(&self) -> Vec<Note> {
        match self.store.get(NOTES_KEY) {
            Ok(Some(raw)) => match decode_notes(&raw) {
                Ok(notes) => {
                    debug!(
                        "event=snapshot_load module=repo status=ok key={} count={}",
                        NOTES_KEY,
                        notes.len()
                    );
                    notes
                }
                Err(err) => {
                    warn!(
                        "event=snapshot_load module=repo status=fallback key={} error_code=malformed_state error={}",
                        NOTES_KEY, err
                    );
                    AppState::default_notes()
                }
            },
            Ok(None) => {
                debug!(
                    "event=snapshot_load module=repo status=fallback key={} reason=absent",
                    NOTES_KEY
                );
                AppState::default_notes()
            }
            Err(err) => {
                warn!(
                    "event=snapshot_load module=repo status=fallback key={} error_code=read_failed error={}",
                    NOTES_KEY, err
                );
                AppState::default_notes()
            }
        }
    }

    /// Loads the dark-mode flag, or `false` when unusable.
    pub fn load_dark_mode(&self) -> bool {
        match self.store.get(DARK_MODE_KEY) {
            Ok(Some(raw)) => decode_dark_mode(&raw).unwrap_or_else(|err| {
                warn!(
                    "event=snapshot_load module=repo status=fallback key={} error_code=malformed_state error={}",
                    DARK_MODE_KEY, err
                );
                false
            }),
            Ok(None) => false,
            Err(err) => {
                warn!(
                    "event=snapshot_load module=repo status=fallback key={} error_code=read_failed error={}",
                    DARK_MODE_KEY, err
                );
                false
            }
        }
    }

    /// Writes the complete collection under `notes`.
    pub fn save_notes(&mut self, notes: &[Note]) -> StorageResult<()> {
        let encoded = encode_notes(notes);
        self.store.set(NOTES_KEY, &encoded).inspect_err(|err| {
            error!(
                "event=snapshot_save module=repo status=error key={} count={} error_code=write_failed error={}",
                NOTES_KEY,
                notes.len(),
                err
            );
        })
    }

    /// Writes the flag under `darkMode`.
    pub fn save_dark_mode(&mut self, dark_mode: bool) -> StorageResult<()> {
        self.store
            .set(DARK_MODE_KEY, &encode_dark_mode(dark_mode))
            .inspect_err(|err| {
                error!(
                    "event=snapshot_save module=repo status=error key={} error_code=write_failed error={}",
                    DARK_MODE_KEY, err
                );
            })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

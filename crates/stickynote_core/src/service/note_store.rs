//! Note collection use-case service.
//!
//! # Responsibility
//! - Own the ordered note collection and the dark-mode flag in memory.
//! - Apply create/text/move/color/delete/dark-mode mutations.
//! - Persist the affected sub-state synchronously after every mutation.
//! - Publish a `StoreEvent` for every applied mutation once its write was
//!   attempted.
//!
//! # Invariants
//! - Note ids are unique within the collection.
//! - Note positions are finite, so every collection survives a reload.
//! - Unknown ids are silent no-ops: nothing changes, nothing is written.
//! - A failed write never rolls back the in-memory mutation.
//! - Notes are always written as the complete collection.

use crate::model::note::{AppState, Note, NoteId, Position, DARK_MODE_KEY, NOTES_KEY};
use crate::repo::state_repo::StateRepository;
use crate::service::events::{Listener, ListenerRegistry, StoreEvent, SubscriptionId};
use crate::service::id_gen::{IdGenerator, UuidIdGenerator};
use crate::storage::{KeyValueStore, StorageError, StorageResult};
use log::{debug, info, trace, warn};
use uuid::Uuid;

const MAX_ID_DRAWS: usize = 8;

/// Outcome of the durable write that follows a mutation.
#[must_use]
#[derive(Debug)]
pub enum PersistStatus {
    /// Mutation applied and written.
    Persisted,
    /// Nothing to do (unknown id); no write attempted.
    Unchanged,
    /// Mutation applied in memory, but the store rejected the write.
    Failed(StorageError),
}

impl PersistStatus {
    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted)
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Converts into a result, treating `Unchanged` as success.
    pub fn into_result(self) -> StorageResult<()> {
        match self {
            Self::Persisted | Self::Unchanged => Ok(()),
            Self::Failed(err) => Err(err),
        }
    }
}

/// Single source of truth for board notes and the dark-mode flag.
pub struct NoteStore<S: KeyValueStore, G: IdGenerator = UuidIdGenerator> {
    repo: StateRepository<S>,
    id_gen: G,
    notes: Vec<Note>,
    dark_mode: bool,
    listeners: ListenerRegistry,
}

impl<S: KeyValueStore> NoteStore<S, UuidIdGenerator> {
    /// Opens the store with random UUID note ids.
    pub fn open(store: S) -> Self {
        Self::open_with_ids(store, UuidIdGenerator)
    }
}

impl<S: KeyValueStore, G: IdGenerator> NoteStore<S, G> {
    /// Loads persisted state (fail-open to defaults) and keeps `store` for
    /// later writes.
    pub fn open_with_ids(store: S, id_gen: G) -> Self {
        let repo = StateRepository::new(store);
        let state = repo.load();
        info!(
            "event=store_load module=service status=ok count={} dark_mode={}",
            state.notes.len(),
            state.dark_mode
        );
        Self {
            repo,
            id_gen,
            notes: state.notes,
            dark_mode: state.dark_mode,
            listeners: ListenerRegistry::default(),
        }
    }

    /// Reads the persisted snapshot as another process start would see it.
    pub fn load(&self) -> AppState {
        self.repo.load()
    }

    /// Ordered note collection.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn note(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| &note.id == id)
    }

    pub fn contains(&self, id: &NoteId) -> bool {
        self.note(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    /// Snapshot of the in-memory state.
    pub fn state(&self) -> AppState {
        AppState {
            notes: self.notes.clone(),
            dark_mode: self.dark_mode,
        }
    }

    /// Underlying durable store.
    pub fn storage(&self) -> &S {
        self.repo.store()
    }

    pub fn storage_mut(&mut self) -> &mut S {
        self.repo.store_mut()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        let listener: Listener = Box::new(listener);
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    /// Appends a blank note at the default origin and returns it.
    pub fn create(&mut self) -> (Note, PersistStatus) {
        let id = self.fresh_id();
        let note = Note::new(id.clone());
        self.notes.push(note.clone());
        info!(
            "event=note_create module=service status=ok count={}",
            self.notes.len()
        );
        let status = self.commit_notes(|| StoreEvent::NoteCreated { id });
        (note, status)
    }

    /// Replaces the text of one note.
    pub fn set_text(&mut self, id: &NoteId, text: impl Into<String>) -> PersistStatus {
        let Some(note) = self.notes.iter_mut().find(|note| &note.id == id) else {
            return Self::not_found("set_text", id);
        };
        note.text = text.into();
        debug!(
            "event=note_set_text module=service status=ok chars={}",
            note.text.chars().count()
        );
        self.commit_notes(|| StoreEvent::TextChanged { id: id.clone() })
    }

    /// Replaces the origin of one note. Hot path during drags.
    ///
    /// Non-finite coordinates are rejected as `Unchanged`.
    pub fn set_position(&mut self, id: &NoteId, position: Position) -> PersistStatus {
        if !position.is_finite() {
            warn!(
                "event=note_move module=service status=skipped reason=non_finite_position id={id}"
            );
            return PersistStatus::Unchanged;
        }
        let Some(note) = self.notes.iter_mut().find(|note| &note.id == id) else {
            return Self::not_found("set_position", id);
        };
        note.position = position;
        trace!(
            "event=note_move module=service status=ok x={} y={}",
            position.x,
            position.y
        );
        self.commit_notes(|| StoreEvent::Moved {
            id: id.clone(),
            position,
        })
    }

    /// Advances one note's color along the fixed cycle.
    pub fn cycle_color(&mut self, id: &NoteId) -> PersistStatus {
        let Some(note) = self.notes.iter_mut().find(|note| &note.id == id) else {
            return Self::not_found("cycle_color", id);
        };
        note.color = note.color.next();
        let color = note.color;
        debug!("event=note_cycle_color module=service status=ok color={color}");
        self.commit_notes(|| StoreEvent::ColorChanged {
            id: id.clone(),
            color,
        })
    }

    /// Removes one note. Unknown ids are ignored.
    pub fn delete(&mut self, id: &NoteId) -> PersistStatus {
        let Some(index) = self.notes.iter().position(|note| &note.id == id) else {
            return Self::not_found("delete", id);
        };
        self.notes.remove(index);
        info!(
            "event=note_delete module=service status=ok count={}",
            self.notes.len()
        );
        self.commit_notes(|| StoreEvent::Deleted { id: id.clone() })
    }

    /// Flips the dark-mode flag and persists it under its own key.
    pub fn toggle_dark_mode(&mut self) -> PersistStatus {
        self.dark_mode = !self.dark_mode;
        let dark_mode = self.dark_mode;
        info!("event=dark_mode_toggle module=service status=ok dark_mode={dark_mode}");
        let written = self.repo.save_dark_mode(dark_mode);
        self.settle(DARK_MODE_KEY, written, || StoreEvent::DarkModeChanged { dark_mode })
    }

    fn commit_notes(&mut self, event: impl FnOnce() -> StoreEvent) -> PersistStatus {
        let written = self.repo.save_notes(&self.notes);
        self.settle(NOTES_KEY, written, event)
    }

    /// Publishes the mutation event, then the write failure if there was one.
    fn settle(
        &mut self,
        key: &'static str,
        written: StorageResult<()>,
        event: impl FnOnce() -> StoreEvent,
    ) -> PersistStatus {
        self.listeners.publish_with(event);
        match written {
            Ok(()) => PersistStatus::Persisted,
            Err(err) => {
                self.listeners.publish_with(|| StoreEvent::PersistFailed {
                    key,
                    message: err.to_string(),
                });
                PersistStatus::Failed(err)
            }
        }
    }

    fn not_found(operation: &str, id: &NoteId) -> PersistStatus {
        debug!(
            "event=note_{operation} module=service status=skipped reason=not_found id={id}"
        );
        PersistStatus::Unchanged
    }

    fn fresh_id(&mut self) -> NoteId {
        for _ in 0..MAX_ID_DRAWS {
            let candidate = NoteId::new(self.id_gen.generate());
            if !candidate.as_str().is_empty() && !self.contains(&candidate) {
                return candidate;
            }
        }
        warn!(
            "event=note_create module=service status=fallback reason=id_generator_collision attempts={}",
            MAX_ID_DRAWS
        );
        loop {
            let candidate = NoteId::new(Uuid::new_v4().to_string());
            if !self.contains(&candidate) {
                return candidate;
            }
        }
    }
}

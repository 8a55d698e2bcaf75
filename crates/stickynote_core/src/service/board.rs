//! Board facade wiring per-note drag controllers to the note store.
//!
//! # Responsibility
//! - Map host surface actions (add, edit, drag, cycle color, delete, toggle
//!   mode) onto `NoteStore` and `DragController` operations.
//! - Own one lazily created `DragController` per note being dragged.
//!
//! # Invariants
//! - A controller exists only while its note exists and is being dragged.
//! - Deleting a note cancels its drag first, releasing pointer capture.

use crate::drag::controller::{DragController, PointerCapture};
use crate::model::note::{Note, NoteId, Position};
use crate::service::id_gen::{IdGenerator, UuidIdGenerator};
use crate::service::note_store::{NoteStore, PersistStatus};
use crate::storage::KeyValueStore;
use log::debug;
use std::collections::HashMap;

pub struct Board<S: KeyValueStore, G: IdGenerator = UuidIdGenerator> {
    store: NoteStore<S, G>,
    drags: HashMap<NoteId, DragController>,
}

impl<S: KeyValueStore> Board<S, UuidIdGenerator> {
    pub fn open(storage: S) -> Self {
        Self::new(NoteStore::open(storage))
    }
}

impl<S: KeyValueStore, G: IdGenerator> Board<S, G> {
    pub fn new(store: NoteStore<S, G>) -> Self {
        Self {
            store,
            drags: HashMap::new(),
        }
    }

    pub fn store(&self) -> &NoteStore<S, G> {
        &self.store
    }

    pub fn into_store(self) -> NoteStore<S, G> {
        self.store
    }

    pub fn is_dragging(&self, id: &NoteId) -> bool {
        self.drags
            .get(id)
            .is_some_and(DragController::is_dragging)
    }

    /// Number of notes with an active drag session.
    pub fn active_drags(&self) -> usize {
        self.drags.values().filter(|drag| drag.is_dragging()).count()
    }

    /// "Add note" action.
    pub fn add_note(&mut self) -> (Note, PersistStatus) {
        self.store.create()
    }

    /// "Edit text" action.
    pub fn set_text(&mut self, id: &NoteId, text: impl Into<String>) -> PersistStatus {
        self.store.set_text(id, text)
    }

    /// Places a note at `position` without a drag session.
    pub fn set_position(&mut self, id: &NoteId, position: Position) -> PersistStatus {
        self.store.set_position(id, position)
    }

    /// "Cycle color" action.
    pub fn cycle_color(&mut self, id: &NoteId) -> PersistStatus {
        self.store.cycle_color(id)
    }

    /// "Toggle mode" action.
    pub fn toggle_dark_mode(&mut self) -> PersistStatus {
        self.store.toggle_dark_mode()
    }

    /// Pointer-down on a note. Returns whether a drag session started.
    pub fn grab(&mut self, id: &NoteId, pointer: Position) -> bool {
        self.grab_inner(id, pointer, None)
    }

    /// Pointer-down that also hands over the host's pointer capture.
    pub fn grab_with_capture(
        &mut self,
        id: &NoteId,
        pointer: Position,
        capture: PointerCapture,
    ) -> bool {
        self.grab_inner(id, pointer, Some(capture))
    }

    fn grab_inner(
        &mut self,
        id: &NoteId,
        pointer: Position,
        capture: Option<PointerCapture>,
    ) -> bool {
        let Some(origin) = self.store.note(id).map(|note| note.position) else {
            debug!("event=drag_grab module=board status=skipped reason=not_found id={id}");
            return false;
        };
        let drag = self.drags.entry(id.clone()).or_default();
        let started = match capture {
            Some(capture) => drag.on_grab_with_capture(pointer, origin, capture),
            None => drag.on_grab(pointer, origin),
        };
        if started {
            debug!("event=drag_grab module=board status=ok id={id}");
        }
        started
    }

    /// Pointer-move. Forwards the new origin to the store while dragging.
    ///
    /// A non-finite origin is dropped by the store and reported as `Unchanged`.
    pub fn drag_to(&mut self, id: &NoteId, pointer: Position) -> Option<PersistStatus> {
        let origin = self.drags.get(id)?.on_move(pointer)?;
        Some(self.store.set_position(id, origin))
    }

    /// Pointer-up. Ends and disposes of the note's drag session.
    pub fn release(&mut self, id: &NoteId) {
        if let Some(mut drag) = self.drags.remove(id) {
            drag.on_release();
            debug!("event=drag_release module=board status=ok id={id}");
        }
    }

    /// "Delete" action. Cancels any drag on the note before removing it.
    pub fn delete(&mut self, id: &NoteId) -> PersistStatus {
        if let Some(mut drag) = self.drags.remove(id) {
            drag.cancel();
            debug!("event=drag_cancel module=board status=ok reason=note_deleted id={id}");
        }
        self.store.delete(id)
    }
}

#[cfg(test)]
mod tests {
    use super::Board;
    use crate::model::note::{NoteId, Position};
    use crate::storage::MemoryStore;

    #[test]
    fn grab_on_unknown_note_creates_no_session() {
        let mut board = Board::open(MemoryStore::new());
        assert!(!board.grab(&NoteId::from("ghost"), Position::new(0.0, 0.0)));
        assert_eq!(board.active_drags(), 0);
    }

    #[test]
    fn release_disposes_session() {
        let mut board = Board::open(MemoryStore::new());
        let seed = NoteId::from("1");
        board.grab(&seed, Position::new(110.0, 110.0));
        assert!(board.is_dragging(&seed));
        board.release(&seed);
        assert!(!board.is_dragging(&seed));
        assert!(board.drag_to(&seed, Position::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn drag_to_overflowing_origin_keeps_last_position() {
        let mut board = Board::open(MemoryStore::new());
        let seed = NoteId::from("1");
        board.grab(&seed, Position::new(-f64::MAX, 100.0));
        let status = board.drag_to(&seed, Position::new(f64::MAX, 100.0)).unwrap();
        assert!(status.is_unchanged());
        assert!(board.is_dragging(&seed));
        assert_eq!(
            board.store().note(&seed).unwrap().position,
            Position::new(100.0, 100.0)
        );
    }
}

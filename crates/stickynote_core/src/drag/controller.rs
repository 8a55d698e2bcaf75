//! Per-note pointer drag state machine.
//!
//! # Responsibility
//! - Turn a pointer stream into note origin updates with a stable grab point.
//! - Hold the host's pointer capture only while a drag is active.
//!
//! # Invariants
//! - At most one active grab per controller.
//! - `new_origin = pointer - grab_offset`; no clamping or snapping.
//! - Leaving `Dragging` by any path (release, cancel, drop) releases capture.

use crate::model::note::Position;
use std::fmt::{Debug, Formatter};

/// Scoped pointer-listener registration owned by an active drag.
///
/// The release callback runs exactly once, when the guard is dropped.
pub struct PointerCapture {
    release: Option<Box<dyn FnOnce()>>,
}

impl PointerCapture {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Capture without any host-side listeners to detach.
    pub fn detached() -> Self {
        Self { release: None }
    }
}

impl Drop for PointerCapture {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Debug for PointerCapture {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointerCapture")
            .field("attached", &self.release.is_some())
            .finish()
    }
}

/// Observable controller state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    /// `grab_offset` is pointer minus note origin at grab time.
    Dragging { grab_offset: Position },
}

/// Drag state machine for exactly one note.
#[derive(Debug)]
pub struct DragController {
    state: DragState,
    capture: Option<PointerCapture>,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}

impl DragController {
    pub fn new() -> Self {
        Self {
            state: DragState::Idle,
            capture: None,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Active grab offset, if dragging.
    pub fn grab_offset(&self) -> Option<Position> {
        match self.state {
            DragState::Dragging { grab_offset } => Some(grab_offset),
            DragState::Idle => None,
        }
    }

    /// Starts a drag. Returns `false` (and changes nothing) when a grab is
    /// already active.
    pub fn on_grab(&mut self, pointer: Position, note_origin: Position) -> bool {
        if self.is_dragging() {
            return false;
        }
        self.state = DragState::Dragging {
            grab_offset: pointer - note_origin,
        };
        true
    }

    /// Same as `on_grab`, additionally holding `capture` for the duration of
    /// the drag. An ignored grab drops `capture` immediately.
    pub fn on_grab_with_capture(
        &mut self,
        pointer: Position,
        note_origin: Position,
        capture: PointerCapture,
    ) -> bool {
        if !self.on_grab(pointer, note_origin) {
            return false;
        }
        self.capture = Some(capture);
        true
    }

    /// Returns the note origin that keeps the grab point under `pointer`, or
    /// `None` while idle.
    pub fn on_move(&self, pointer: Position) -> Option<Position> {
        self.grab_offset().map(|grab_offset| pointer - grab_offset)
    }

    /// Ends the drag. No-op while idle.
    pub fn on_release(&mut self) {
        self.reset();
    }

    /// Abandons an active drag without a final update (note deleted mid-drag).
    pub fn cancel(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.state = DragState::Idle;
        self.capture = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{DragController, DragState, PointerCapture};
    use crate::model::note::Position;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting_capture(counter: &Rc<Cell<u32>>) -> PointerCapture {
        let counter = Rc::clone(counter);
        PointerCapture::new(move || counter.set(counter.get() + 1))
    }

    #[test]
    fn grab_point_stays_under_pointer() {
        let mut drag = DragController::new();
        assert!(drag.on_grab(Position::new(130.0, 140.0), Position::new(100.0, 100.0)));
        assert_eq!(drag.grab_offset(), Some(Position::new(30.0, 40.0)));
        assert_eq!(
            drag.on_move(Position::new(230.0, 190.0)),
            Some(Position::new(200.0, 150.0))
        );
    }

    #[test]
    fn moves_are_not_clamped() {
        let mut drag = DragController::new();
        drag.on_grab(Position::new(10.0, 10.0), Position::new(0.0, 0.0));
        assert_eq!(
            drag.on_move(Position::new(-500.0, 1.0e6)),
            Some(Position::new(-510.0, 999_990.0))
        );
    }

    #[test]
    fn idle_controller_ignores_moves_and_releases() {
        let mut drag = DragController::new();
        assert_eq!(drag.on_move(Position::new(1.0, 1.0)), None);
        drag.on_release();
        assert_eq!(drag.state(), DragState::Idle);
    }

    #[test]
    fn second_grab_while_dragging_is_ignored() {
        let mut drag = DragController::new();
        drag.on_grab(Position::new(5.0, 5.0), Position::new(0.0, 0.0));
        assert!(!drag.on_grab(Position::new(50.0, 50.0), Position::new(0.0, 0.0)));
        assert_eq!(drag.grab_offset(), Some(Position::new(5.0, 5.0)));
    }

    #[test]
    fn release_stops_updates_until_next_grab() {
        let mut drag = DragController::new();
        drag.on_grab(Position::new(5.0, 5.0), Position::new(0.0, 0.0));
        drag.on_release();
        assert_eq!(drag.on_move(Position::new(20.0, 20.0)), None);

        drag.on_grab(Position::new(20.0, 20.0), Position::new(10.0, 0.0));
        assert_eq!(
            drag.on_move(Position::new(30.0, 30.0)),
            Some(Position::new(20.0, 10.0))
        );
    }

    #[test]
    fn capture_is_released_on_every_exit_path() {
        let released = Rc::new(Cell::new(0));

        let mut drag = DragController::new();
        drag.on_grab_with_capture(
            Position::default(),
            Position::default(),
            counting_capture(&released),
        );
        assert_eq!(released.get(), 0);
        drag.on_release();
        assert_eq!(released.get(), 1);

        drag.on_grab_with_capture(
            Position::default(),
            Position::default(),
            counting_capture(&released),
        );
        drag.cancel();
        assert_eq!(released.get(), 2);

        drag.on_grab_with_capture(
            Position::default(),
            Position::default(),
            counting_capture(&released),
        );
        drop(drag);
        assert_eq!(released.get(), 3);
    }

    #[test]
    fn capture_for_ignored_grab_is_released_immediately() {
        let released = Rc::new(Cell::new(0));
        let mut drag = DragController::new();
        drag.on_grab_with_capture(
            Position::default(),
            Position::default(),
            counting_capture(&released),
        );
        assert!(!drag.on_grab_with_capture(
            Position::new(1.0, 1.0),
            Position::default(),
            counting_capture(&released)
        ));
        assert_eq!(released.get(), 1);
        assert!(drag.is_dragging());
    }

    #[test]
    fn independent_controllers_do_not_interfere() {
        let mut first = DragController::new();
        let mut second = DragController::new();
        first.on_grab(Position::new(10.0, 10.0), Position::new(0.0, 0.0));
        second.on_grab(Position::new(100.0, 100.0), Position::new(90.0, 80.0));

        assert_eq!(first.on_move(Position::new(20.0, 20.0)), Some(Position::new(10.0, 10.0)));
        assert_eq!(
            second.on_move(Position::new(110.0, 110.0)),
            Some(Position::new(100.0, 90.0))
        );
        first.on_release();
        assert!(second.is_dragging());
    }
}

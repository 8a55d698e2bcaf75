//! Board domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Name the durable-store keys and the seed/default note values.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Deletion removes the note from the collection; there are no tombstones.

pub mod note;

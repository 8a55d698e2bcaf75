//! Pointer drag handling.
//!
//! Controllers are storage-agnostic; `service::board` forwards their output
//! into `NoteStore::set_position`.

pub mod controller;

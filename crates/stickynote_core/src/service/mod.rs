//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep host/UI layers decoupled from storage details.

pub mod board;
pub mod events;
pub mod id_gen;
pub mod note_store;

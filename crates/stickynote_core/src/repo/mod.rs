//! Repository layer: persisted board state over a durable key-value store.
//!
//! # Responsibility
//! - Own the JSON encoding of persisted state.
//! - Isolate key names and decode fallbacks from service orchestration.
//!
//! # Invariants
//! - Malformed persisted values are recovered with defaults, never surfaced.
//! - Write failures are returned to the caller unchanged.

pub mod snapshot;
pub mod state_repo;

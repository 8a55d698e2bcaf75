//! JSON codec for persisted board state.
//!
//! # Responsibility
//! - Encode the note collection and dark-mode flag into durable-store values.
//! - Decode stored values back, reporting malformed input as `SnapshotError`.
//!
//! # Invariants
//! - `decode_notes(encode_notes(n)) == n` for every collection with unique ids.
//! - Decoding never yields two notes with the same id.

use crate::model::note::{Note, NoteId, DARK_MODE_KEY, NOTES_KEY};
use log::warn;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Codec error for one persisted key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// Stored value exists but cannot be decoded.
    Malformed { key: &'static str, reason: String },
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed { key, reason } => {
                write!(f, "malformed persisted value for `{key}`: {reason}")
            }
        }
    }
}

impl Error for SnapshotError {}

/// Encodes the ordered collection as a JSON array.
pub fn encode_notes(notes: &[Note]) -> String {
    // Infallible for this shape. Non-finite floats would be written as `null`,
    // which is why `NoteStore` never stores them.
    serde_json::to_string(notes).unwrap_or_else(|_| "[]".to_string())
}

/// Decodes a JSON array of notes.
///
/// Later entries whose id already appeared are dropped, keeping the first
/// occurrence and its position in the order.
pub fn decode_notes(raw: &str) -> Result<Vec<Note>, SnapshotError> {
    let decoded: Vec<Note> =
        serde_json::from_str(raw).map_err(|err| SnapshotError::Malformed {
            key: NOTES_KEY,
            reason: err.to_string(),
        })?;

    let mut seen: HashSet<NoteId> = HashSet::with_capacity(decoded.len());
    let mut notes = Vec::with_capacity(decoded.len());
    for note in decoded {
        if seen.insert(note.id.clone()) {
            notes.push(note);
        } else {
            warn!(
                "event=snapshot_decode module=repo status=fallback key={} reason=duplicate_id",
                NOTES_KEY
            );
        }
    }
    Ok(notes)
}

/// Encodes the dark-mode flag as a JSON boolean literal.
pub fn encode_dark_mode(dark_mode: bool) -> String {
    if dark_mode {
        "true".to_string()
    } else {
        "false".to_string()
    }
}

/// Decodes a JSON boolean literal.
pub fn decode_dark_mode(raw: &str) -> Result<bool, SnapshotError> {
    serde_json::from_str::<bool>(raw).map_err(|err| SnapshotError::Malformed {
        key: DARK_MODE_KEY,
        reason: err.to_string(),
    })
}

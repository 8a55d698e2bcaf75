//! Sticky note domain model.
//!
//! # Responsibility
//! - Define the canonical note record rendered as one card on the board.
//! - Define the persisted application state (notes + dark-mode flag).
//! - Own the fixed color cycle and the seed/new-note defaults.
//!
//! # Invariants
//! - `id` is stable and unique within one collection.
//! - `position` is never clamped; negative and off-viewport values are valid.
//! - Color order is `yellow -> red -> blue -> green -> yellow`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Durable-store key holding the encoded note collection.
pub const NOTES_KEY: &str = "notes";
/// Durable-store key holding the encoded dark-mode flag.
pub const DARK_MODE_KEY: &str = "darkMode";

/// Id of the note seeded when no collection has been persisted yet.
pub const SEED_NOTE_ID: &str = "1";
/// Text of the seeded note.
pub const SEED_NOTE_TEXT: &str = "Hello, Sticky Note!";
/// Origin of the seeded note.
pub const SEED_NOTE_POSITION: Position = Position::new(100.0, 100.0);
/// Origin assigned to every note created through the store.
pub const NEW_NOTE_POSITION: Position = Position::new(150.0, 150.0);

/// Opaque stable identifier of one note.
///
/// Ids from older snapshots (e.g. the seed `"1"`) and freshly generated
/// UUID strings share this type; core never interprets the contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Screen-space point. Used both for note origins and pointer positions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// JSON has no encoding for NaN or infinities.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Card background color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NoteColor {
    #[default]
    Yellow,
    Red,
    Blue,
    Green,
}

impl NoteColor {
    /// Fixed cycle order used by `NoteStore::cycle_color`.
    pub const CYCLE: [NoteColor; 4] = [
        NoteColor::Yellow,
        NoteColor::Red,
        NoteColor::Blue,
        NoteColor::Green,
    ];

    /// Returns the next color in the cycle, wrapping green back to yellow.
    pub fn next(self) -> Self {
        match self {
            Self::Yellow => Self::Red,
            Self::Red => Self::Blue,
            Self::Blue => Self::Green,
            Self::Green => Self::Yellow,
        }
    }

    /// Stable lower-case wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yellow => "yellow",
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
        }
    }
}

impl Display for NoteColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a color name strictly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownColor(pub String);

impl Display for UnknownColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown note color `{}`", self.0)
    }
}

impl std::error::Error for UnknownColor {}

impl FromStr for NoteColor {
    type Err = UnknownColor;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "yellow" => Ok(Self::Yellow),
            "red" => Ok(Self::Red),
            "blue" => Ok(Self::Blue),
            "green" => Ok(Self::Green),
            _ => Err(UnknownColor(value.to_string())),
        }
    }
}

impl Serialize for NoteColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NoteColor {
    /// Unknown names decode as `Yellow`: a card with a foreign color still
    /// loads, and its next cycle step lands on the first palette entry.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or_default())
    }
}

/// One sticky note card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub text: String,
    pub position: Position,
    #[serde(default)]
    pub color: NoteColor,
}

impl Note {
    /// Creates a blank note at the default new-note origin.
    pub fn new(id: NoteId) -> Self {
        Self {
            id,
            text: String::new(),
            position: NEW_NOTE_POSITION,
            color: NoteColor::Yellow,
        }
    }

    /// The note shown on a board that has never been saved.
    pub fn seed() -> Self {
        Self {
            id: NoteId::from(SEED_NOTE_ID),
            text: SEED_NOTE_TEXT.to_string(),
            position: SEED_NOTE_POSITION,
            color: NoteColor::Yellow,
        }
    }
}

/// The full persisted unit: ordered note collection plus dark-mode flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub notes: Vec<Note>,
    pub dark_mode: bool,
}

impl AppState {
    /// Seed collection used when storage has nothing usable.
    pub fn default_notes() -> Vec<Note> {
        vec![Note::seed()]
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            notes: Self::default_notes(),
            dark_mode: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AppState, Note, NoteColor, NoteId, Position};

    #[test]
    fn color_cycle_visits_palette_in_order() {
        let mut color = NoteColor::Yellow;
        let mut visited = vec![color];
        for _ in 0..4 {
            color = color.next();
            visited.push(color);
        }
        assert_eq!(
            visited,
            vec![
                NoteColor::Yellow,
                NoteColor::Red,
                NoteColor::Blue,
                NoteColor::Green,
                NoteColor::Yellow,
            ]
        );
    }

    #[test]
    fn color_parse_is_case_insensitive_and_strict() {
        assert_eq!("Blue".parse::<NoteColor>().unwrap(), NoteColor::Blue);
        assert!("purple".parse::<NoteColor>().is_err());
    }

    #[test]
    fn unknown_color_deserializes_as_yellow() {
        let color: NoteColor = serde_json::from_str("\"purple\"").unwrap();
        assert_eq!(color, NoteColor::Yellow);
    }

    #[test]
    fn position_arithmetic_is_componentwise() {
        let a = Position::new(130.0, 140.0);
        let b = Position::new(100.0, 100.0);
        assert_eq!(a - b, Position::new(30.0, 40.0));
        assert_eq!(b + Position::new(-5.0, 2.5), Position::new(95.0, 102.5));
    }

    #[test]
    fn default_state_holds_seed_note_in_light_mode() {
        let state = AppState::default();
        assert!(!state.dark_mode);
        assert_eq!(state.notes, vec![Note::seed()]);
        assert_eq!(state.notes[0].id, NoteId::from("1"));
    }

    #[test]
    fn note_wire_shape_matches_persisted_layout() {
        let note = Note::seed();
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["id"], "1");
        assert_eq!(json["text"], "Hello, Sticky Note!");
        assert_eq!(json["position"]["x"], 100.0);
        assert_eq!(json["position"]["y"], 100.0);
        assert_eq!(json["color"], "yellow");
    }
}

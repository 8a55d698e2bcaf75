//! Note id generation.

use uuid::Uuid;

/// Source of fresh note ids.
///
/// Implementations should make collisions practically impossible within one
/// process; `NoteStore::create` still redraws on a clash with an existing id.
pub trait IdGenerator {
    fn generate(&mut self) -> String;
}

/// Random UUID v4 ids, matching the id shape hosts already store.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn generate(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

impl<F> IdGenerator for F
where
    F: FnMut() -> String,
{
    fn generate(&mut self) -> String {
        self()
    }
}

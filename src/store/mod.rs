pub mod json;
pub mod records;

pub use json::{JsonStore, HISTORY_CAP, HISTORY_KEY, NOTES_KEY};
pub use records::{ActivityKind, HistoryItem, Note, NoteLength};

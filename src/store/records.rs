use serde::{Deserialize, Serialize};

/// Requested length of a generated note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteLength {
    Short,
    Moderate,
    Long,
}

/// A saved study note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub subject: String,
    pub content: String,
    pub length: NoteLength,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl Note {
    pub fn new(title: String, subject: String, content: String, length: NoteLength) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            subject,
            content,
            length,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Which feature produced an activity record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Note,
    Voice,
    Practice,
}

/// One activity history record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: String,
    pub action: String,
    pub kind: ActivityKind,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub details: String,
}

impl HistoryItem {
    pub fn new(action: String, kind: ActivityKind) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            details: action.clone(),
            action,
            kind,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

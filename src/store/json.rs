//! Local key-value JSON persistence for notes and activity history.
//!
//! Each fixed string key maps to one JSON array file under the store root.
//! Collections are append-at-front (newest first); history is capped,
//! notes are unbounded; deletion is by identifier, never update-in-place.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use super::records::{ActivityKind, HistoryItem, Note};

/// Key for the saved-notes collection
pub const NOTES_KEY: &str = "saathi_notes";
/// Key for the activity-history collection
pub const HISTORY_KEY: &str = "saathi_history";
/// Maximum retained history records
pub const HISTORY_CAP: usize = 50;

/// Directory-backed JSON record store
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    /// Open (creating if needed) a store rooted at `root`
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create store directory: {}", root.display()))?;
        Ok(Self { root })
    }

    /// Saved notes, newest first
    pub fn notes(&self) -> Result<Vec<Note>> {
        self.read(NOTES_KEY)
    }

    /// Prepend a note
    pub fn add_note(&self, note: Note) -> Result<()> {
        let mut notes = self.notes()?;
        notes.insert(0, note);
        self.write(NOTES_KEY, &notes)
    }

    /// Delete a note by id; unknown ids are a no-op
    pub fn delete_note(&self, id: &str) -> Result<()> {
        let mut notes = self.notes()?;
        notes.retain(|n| n.id != id);
        self.write(NOTES_KEY, &notes)
    }

    /// Activity history, newest first
    pub fn history(&self) -> Result<Vec<HistoryItem>> {
        self.read(HISTORY_KEY)
    }

    /// Record an activity, keeping only the most recent entries
    pub fn record_activity(&self, action: &str, kind: ActivityKind) -> Result<HistoryItem> {
        let item = HistoryItem::new(action.to_string(), kind);
        let mut history = self.history()?;
        history.insert(0, item.clone());
        history.truncate(HISTORY_CAP);
        self.write(HISTORY_KEY, &history)?;
        Ok(item)
    }

    /// Remove all history records
    pub fn clear_history(&self) -> Result<()> {
        self.write::<HistoryItem>(HISTORY_KEY, &[])?;
        info!("Activity history cleared");
        Ok(())
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Corrupt record file: {}", path.display()))
    }

    fn write<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        let path = self.key_path(key);
        let raw = serde_json::to_string_pretty(items).context("Failed to serialize records")?;
        write_atomic(&path, raw.as_bytes())
    }
}

// Write through a temp file so a crash never leaves a half-written record
// file behind
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes).with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

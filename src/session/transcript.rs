use serde::{Deserialize, Serialize};

/// Who spoke a finalized turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Assistant,
    Student,
}

/// One complete utterance, delimited by a turn-complete signal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptTurn {
    pub speaker: Speaker,
    pub text: String,
}

/// Accumulates incremental spoken-text fragments into a turn-by-turn log
///
/// Fragments append to an in-progress accumulator; a turn-complete signal
/// flushes a non-empty accumulator as one finalized turn. Turns are never
/// reordered or merged.
#[derive(Debug, Default)]
pub struct TranscriptAggregator {
    turns: Vec<TranscriptTurn>,
    pending: String,
}

impl TranscriptAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an incremental fragment to the in-progress turn
    pub fn push_fragment(&mut self, fragment: &str) {
        self.pending.push_str(fragment);
    }

    /// Finalize the in-progress turn; empty turns are not recorded
    pub fn finish_turn(&mut self, speaker: Speaker) {
        if self.pending.is_empty() {
            return;
        }
        self.turns.push(TranscriptTurn {
            speaker,
            text: std::mem::take(&mut self.pending),
        });
    }

    /// Finalized turns in order
    pub fn turns(&self) -> &[TranscriptTurn] {
        &self.turns
    }

    /// Text of the turn currently being spoken
    pub fn pending(&self) -> &str {
        &self.pending
    }
}

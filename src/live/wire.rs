use serde::{Deserialize, Serialize};

/// Mime type string tagging a realtime PCM chunk with its sample rate
pub fn pcm_mime(sample_rate: u32) -> String {
    format!("audio/pcm;rate={}", sample_rate)
}

/// One outbound realtime audio chunk
///
/// The payload shape is fixed by the remote service: base64-encoded 16-bit
/// little-endian PCM plus an explicit mime type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealtimeAudio {
    /// Base64-encoded PCM bytes
    pub data: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

impl RealtimeAudio {
    pub fn new(data: String, sample_rate: u32) -> Self {
        Self {
            data,
            mime_type: pcm_mime(sample_rate),
        }
    }
}

/// Content carried by one inbound server message
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerContent {
    /// Incremental spoken-text fragment, if any
    pub transcript: Option<String>,
    /// Inline audio payload (base64 16-bit LE PCM), if any
    pub audio: Option<String>,
    /// The assistant finished its current turn
    #[serde(default)]
    pub turn_complete: bool,
    /// The assistant was interrupted by new user speech; queued playback
    /// must be discarded
    #[serde(default)]
    pub interrupted: bool,
}

/// Events delivered by the live session transport
#[derive(Debug)]
pub enum LiveEvent {
    /// Handshake completed, the session is open
    Opened,
    /// A server message with optional transcript/audio/flags
    Content(ServerContent),
    /// Transport-level failure; the session is unusable
    Error(String),
    /// Remote-initiated close
    Closed,
}

use crate::audio::{CaptureConfig, PlaybackConfig};
use crate::live::LiveConfig;

/// Configuration for one voice session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Unique session identifier
    pub session_id: String,

    /// Remote live-session parameters (model, voice, instruction)
    pub live: LiveConfig,

    /// Capture side: 16kHz mono, fixed frame size
    pub capture: CaptureConfig,

    /// Playback side: 24kHz mono
    pub playback: PlaybackConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("voice-{}", uuid::Uuid::new_v4()),
            live: LiveConfig::default(),
            capture: CaptureConfig::default(),
            playback: PlaybackConfig::default(),
        }
    }
}

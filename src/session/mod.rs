pub mod config;
pub mod error;
pub mod playback;
pub mod session;
pub mod state;
pub mod transcript;

pub use config::SessionConfig;
pub use error::SessionError;
pub use playback::PlaybackScheduler;
pub use session::VoiceSession;
pub use state::SessionState;
pub use transcript::{Speaker, TranscriptAggregator, TranscriptTurn};

pub mod audio;
pub mod config;
pub mod live;
pub mod session;
pub mod store;

pub use audio::{
    AudioFrame, CaptureConfig, DeviceError, DeviceFactory, FileDevices, InputDevice, OutputSink,
    PlaybackConfig,
};
pub use config::Config;
pub use live::{
    GeminiLive, LiveConfig, LiveConnection, LiveConnector, LiveEvent, LiveHandle, RealtimeAudio,
    ServerContent, TransportError,
};
pub use session::{
    PlaybackScheduler, SessionConfig, SessionError, SessionState, Speaker, TranscriptAggregator,
    TranscriptTurn, VoiceSession,
};
pub use store::{ActivityKind, HistoryItem, JsonStore, Note, NoteLength};

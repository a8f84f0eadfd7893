pub mod gemini;
pub mod transport;
pub mod wire;

pub use gemini::GeminiLive;
pub use transport::{LiveConfig, LiveConnection, LiveConnector, LiveHandle, TransportError};
pub use wire::{pcm_mime, LiveEvent, RealtimeAudio, ServerContent};

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use super::wire::{LiveEvent, RealtimeAudio};

/// Transport-level failures for the live session
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("handshake failed: {0}")]
    Handshake(String),

    #[error("send failed: {0}")]
    Send(String),

    #[error("connection closed: {0}")]
    Closed(String),
}

/// Parameters for opening one live session
#[derive(Debug, Clone)]
pub struct LiveConfig {
    /// Remote model identifier
    pub model: String,
    /// Prebuilt voice name for spoken replies
    pub voice: String,
    /// System instruction steering the assistant
    pub system_instruction: String,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash-native-audio-preview-12-2025".to_string(),
            voice: "Kore".to_string(),
            system_instruction: "You are a friendly study assistant. Help solve exam doubts \
                                 quickly. Match the student's language and style. Keep responses \
                                 concise and spoken-friendly."
                .to_string(),
        }
    }
}

/// An open live session: a handle for outbound traffic plus the inbound
/// event stream
pub struct LiveConnection {
    pub handle: Arc<dyn LiveHandle>,
    pub events: mpsc::Receiver<LiveEvent>,
}

/// Opens live sessions
///
/// `connect` performs the full handshake; when it resolves the session is
/// open and ready for realtime input.
#[async_trait::async_trait]
pub trait LiveConnector: Send + Sync {
    async fn connect(&self, config: &LiveConfig) -> Result<LiveConnection, TransportError>;
}

/// Outbound side of an open live session
#[async_trait::async_trait]
pub trait LiveHandle: Send + Sync {
    /// Transmit one realtime audio chunk
    async fn send_realtime(&self, chunk: RealtimeAudio) -> Result<(), TransportError>;

    /// Close the session; safe to call more than once
    async fn close(&self) -> Result<(), TransportError>;
}

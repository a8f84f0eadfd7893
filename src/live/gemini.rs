//! WebSocket connector for the Gemini bidirectional generate-content API.
//!
//! Handshake: open the socket, send a `setup` message carrying the model id,
//! audio response modality, voice and system instruction, then wait for the
//! server's `setupComplete` before handing the session out. Server frames
//! (text or binary, both JSON) are translated into [`LiveEvent`]s.

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use super::transport::{LiveConfig, LiveConnection, LiveConnector, LiveHandle, TransportError};
use super::wire::{LiveEvent, RealtimeAudio, ServerContent};

const DEFAULT_ENDPOINT: &str = "wss://generativelanguage.googleapis.com/ws/google.ai.generativelanguage.v1beta.GenerativeService.BidiGenerateContent";

type WsSink = futures::stream::SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Connector for the hosted Gemini live voice service
pub struct GeminiLive {
    api_key: String,
    endpoint: String,
}

impl GeminiLive {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(api_key: String, endpoint: String) -> Self {
        Self { api_key, endpoint }
    }
}

#[async_trait::async_trait]
impl LiveConnector for GeminiLive {
    async fn connect(&self, config: &LiveConfig) -> Result<LiveConnection, TransportError> {
        let url = format!("{}?key={}", self.endpoint, self.api_key);

        info!("Opening live session (model: {})", config.model);

        let (ws, _) = connect_async(url)
            .await
            .map_err(|e| TransportError::Handshake(e.to_string()))?;
        let (mut sink, mut stream) = ws.split();

        let setup = json!({
            "setup": {
                "model": format!("models/{}", config.model),
                "generationConfig": {
                    "responseModalities": ["AUDIO"],
                    "speechConfig": {
                        "voiceConfig": {
                            "prebuiltVoiceConfig": { "voiceName": config.voice }
                        }
                    }
                },
                "systemInstruction": {
                    "parts": [{ "text": config.system_instruction }]
                },
                "outputAudioTranscription": {}
            }
        });

        sink.send(Message::Text(setup.to_string()))
            .await
            .map_err(|e| TransportError::Handshake(e.to_string()))?;

        // The session is not open until the server acknowledges the setup
        loop {
            let frame = stream
                .next()
                .await
                .ok_or_else(|| TransportError::Handshake("connection closed during setup".into()))?
                .map_err(|e| TransportError::Handshake(e.to_string()))?;

            let Some(value) = frame_to_json(&frame) else {
                continue;
            };
            if value.get("setupComplete").is_some() {
                break;
            }
            if let Some(message) = value.pointer("/error/message").and_then(Value::as_str) {
                return Err(TransportError::Handshake(message.to_string()));
            }
        }

        info!("Live session ready");

        let (event_tx, event_rx) = mpsc::channel(64);
        let _ = event_tx.send(LiveEvent::Opened).await;

        tokio::spawn(dispatch_server_frames(stream, event_tx));

        Ok(LiveConnection {
            handle: Arc::new(GeminiHandle {
                sink: Mutex::new(Some(sink)),
            }),
            events: event_rx,
        })
    }
}

struct GeminiHandle {
    sink: Mutex<Option<WsSink>>,
}

#[async_trait::async_trait]
impl LiveHandle for GeminiHandle {
    async fn send_realtime(&self, chunk: RealtimeAudio) -> Result<(), TransportError> {
        let message = json!({
            "realtimeInput": {
                "mediaChunks": [chunk]
            }
        });

        let mut guard = self.sink.lock().await;
        let sink = guard
            .as_mut()
            .ok_or_else(|| TransportError::Closed("session already closed".into()))?;
        sink.send(Message::Text(message.to_string()))
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    async fn close(&self) -> Result<(), TransportError> {
        let mut guard = self.sink.lock().await;
        if let Some(mut sink) = guard.take() {
            if let Err(e) = sink.send(Message::Close(None)).await {
                // Closing an already-dropped socket is not a failure worth
                // surfacing to the teardown path
                warn!("Close frame not delivered: {}", e);
            }
        }
        Ok(())
    }
}

/// Translate inbound server frames into events until the stream ends
///
/// `Closed` is emitted exactly once, after the loop exits, whatever ended it.
async fn dispatch_server_frames<S>(mut stream: S, event_tx: mpsc::Sender<LiveEvent>)
where
    S: futures::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Close(_)) => break,
            Ok(frame) => {
                if let Some(value) = frame_to_json(&frame) {
                    if let Some(content) = parse_server_content(&value) {
                        if event_tx.send(LiveEvent::Content(content)).await.is_err() {
                            break;
                        }
                    } else {
                        debug!("Ignoring non-content server frame");
                    }
                }
            }
            Err(e) => {
                let _ = event_tx.send(LiveEvent::Error(e.to_string())).await;
                break;
            }
        }
    }
    let _ = event_tx.send(LiveEvent::Closed).await;
}

fn frame_to_json(frame: &Message) -> Option<Value> {
    let parsed = match frame {
        Message::Text(text) => serde_json::from_str(text),
        Message::Binary(bytes) => serde_json::from_slice(bytes),
        _ => return None,
    };
    match parsed {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Unparseable server frame: {}", e);
            None
        }
    }
}

/// Extract the content fields this client acts on from a `serverContent`
/// frame
fn parse_server_content(value: &Value) -> Option<ServerContent> {
    let server_content = value.get("serverContent")?;

    Some(ServerContent {
        transcript: server_content
            .pointer("/outputTranscription/text")
            .and_then(Value::as_str)
            .map(str::to_string),
        audio: server_content
            .pointer("/modelTurn/parts/0/inlineData/data")
            .and_then(Value::as_str)
            .map(str::to_string),
        turn_complete: server_content
            .get("turnComplete")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        interrupted: server_content
            .get("interrupted")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_transcript_and_audio_content() {
        let value: Value = serde_json::from_str(
            r#"{
                "serverContent": {
                    "outputTranscription": { "text": "Hello" },
                    "modelTurn": {
                        "parts": [{ "inlineData": { "data": "AAA=", "mimeType": "audio/pcm;rate=24000" } }]
                    },
                    "turnComplete": true
                }
            }"#,
        )
        .unwrap();

        let content = parse_server_content(&value).unwrap();
        assert_eq!(content.transcript.as_deref(), Some("Hello"));
        assert_eq!(content.audio.as_deref(), Some("AAA="));
        assert!(content.turn_complete);
        assert!(!content.interrupted);
    }

    #[test]
    fn parses_interrupted_flag_without_audio() {
        let value: Value =
            serde_json::from_str(r#"{ "serverContent": { "interrupted": true } }"#).unwrap();

        let content = parse_server_content(&value).unwrap();
        assert!(content.interrupted);
        assert!(content.audio.is_none());
        assert!(content.transcript.is_none());
    }

    #[test]
    fn non_content_frames_are_skipped() {
        let value: Value = serde_json::from_str(r#"{ "setupComplete": {} }"#).unwrap();
        assert!(parse_server_content(&value).is_none());
    }

    #[tokio::test]
    async fn close_frame_yields_exactly_one_closed_event() {
        let frames = vec![
            Ok(Message::Text(
                r#"{ "serverContent": { "outputTranscription": { "text": "hi" } } }"#.to_string(),
            )),
            Ok(Message::Close(None)),
        ];
        let (tx, mut rx) = mpsc::channel(8);

        dispatch_server_frames(futures::stream::iter(frames), tx).await;

        assert!(matches!(rx.recv().await, Some(LiveEvent::Content(_))));
        assert!(matches!(rx.recv().await, Some(LiveEvent::Closed)));
        assert!(rx.recv().await.is_none(), "no further events after the close");
    }

    #[tokio::test]
    async fn exhausted_stream_still_reports_closed() {
        let (tx, mut rx) = mpsc::channel(8);

        dispatch_server_frames(futures::stream::iter(Vec::new()), tx).await;

        assert!(matches!(rx.recv().await, Some(LiveEvent::Closed)));
        assert!(rx.recv().await.is_none());
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::audio::{pcm, AudioFrame, DeviceFactory, InputDevice};
use crate::live::{
    LiveConnection, LiveConnector, LiveEvent, LiveHandle, RealtimeAudio, ServerContent,
    TransportError,
};

use super::config::SessionConfig;
use super::error::SessionError;
use super::playback::PlaybackScheduler;
use super::state::SessionState;
use super::transcript::{Speaker, TranscriptAggregator, TranscriptTurn};

/// Realtime voice session manager
///
/// Owns the lifecycle state machine (`Idle → Connecting → Active → Idle`,
/// `Connecting → Failed`) and orchestrates the capture pipeline, the live
/// network session, the playback scheduler and the transcript aggregator.
///
/// `start()` and `stop()` are the only entry points. Both are idempotent and
/// safe under concurrent invocation; `start()` unconditionally performs a
/// full teardown first, so no two sessions can ever be live at once and no
/// half-initialized state survives a restart.
pub struct VoiceSession {
    config: SessionConfig,
    connector: Arc<dyn LiveConnector>,
    devices: Arc<dyn DeviceFactory>,

    /// Single source of truth for liveness; flipped to false before any
    /// asynchronous teardown step runs, re-checked by every task callback
    active: Arc<AtomicBool>,

    state_tx: watch::Sender<SessionState>,

    /// Serializes start/stop against each other
    lifecycle: Mutex<()>,

    /// Live session handle, set exactly once per session after the
    /// handshake completes; tasks check for presence rather than waiting
    live: Arc<Mutex<Option<Arc<dyn LiveHandle>>>>,

    input: Arc<Mutex<Option<Box<dyn InputDevice>>>>,
    scheduler: Arc<Mutex<Option<PlaybackScheduler>>>,
    transcript: Arc<Mutex<TranscriptAggregator>>,

    shutdown: Mutex<Option<watch::Sender<bool>>>,
    capture_task: Mutex<Option<JoinHandle<()>>>,
    event_task: Mutex<Option<JoinHandle<()>>>,
}

impl VoiceSession {
    pub fn new(
        config: SessionConfig,
        connector: Arc<dyn LiveConnector>,
        devices: Arc<dyn DeviceFactory>,
    ) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Idle);

        Self {
            config,
            connector,
            devices,
            active: Arc::new(AtomicBool::new(false)),
            state_tx,
            lifecycle: Mutex::new(()),
            live: Arc::new(Mutex::new(None)),
            input: Arc::new(Mutex::new(None)),
            scheduler: Arc::new(Mutex::new(None)),
            transcript: Arc::new(Mutex::new(TranscriptAggregator::new())),
            shutdown: Mutex::new(None),
            capture_task: Mutex::new(None),
            event_task: Mutex::new(None),
        }
    }

    /// Start a fresh session, tearing down any existing one first
    ///
    /// On failure the session lands in `Failed` with a cause-specific user
    /// message and every partially acquired resource released; calling
    /// `start()` again is the retry path.
    pub async fn start(self: &Arc<Self>) -> Result<(), SessionError> {
        let _lifecycle = self.lifecycle.lock().await;

        // Starting is defined as "tear down whatever exists, then build fresh"
        self.teardown().await;

        info!("Starting voice session: {}", self.config.session_id);
        self.state_tx.send_replace(SessionState::Connecting);

        let sink = match self.devices.open_output(&self.config.playback).await {
            Ok(sink) => sink,
            Err(e) => return Err(self.fail(e.into()).await),
        };
        {
            let mut scheduler = self.scheduler.lock().await;
            *scheduler = Some(PlaybackScheduler::new(
                sink,
                self.config.playback.sample_rate,
            ));
        }

        let mut input = match self.devices.open_input(&self.config.capture).await {
            Ok(input) => input,
            Err(e) => return Err(self.fail(e.into()).await),
        };
        let frames = match input.start().await {
            Ok(frames) => {
                *self.input.lock().await = Some(input);
                frames
            }
            Err(e) => {
                *self.input.lock().await = Some(input);
                return Err(self.fail(e.into()).await);
            }
        };

        let LiveConnection { handle, events } = match self.connector.connect(&self.config.live).await
        {
            Ok(connection) => connection,
            Err(e) => return Err(self.fail(e.into()).await),
        };
        *self.live.lock().await = Some(Arc::clone(&handle));

        // Handshake complete: the session is open
        self.active.store(true, Ordering::SeqCst);
        self.state_tx.send_replace(SessionState::Active);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        *self.shutdown.lock().await = Some(shutdown_tx);

        let active = Arc::clone(&self.active);
        let live = Arc::clone(&self.live);
        let capture_rate = self.config.capture.sample_rate;
        let mut capture_shutdown = shutdown_rx.clone();
        let capture_task = tokio::spawn(async move {
            let mut frames = frames;
            loop {
                tokio::select! {
                    _ = capture_shutdown.changed() => break,
                    frame = frames.recv() => {
                        let Some(frame) = frame else { break };
                        forward_frame(frame, capture_rate, &active, &live).await;
                    }
                }
            }
            debug!("Capture task stopped");
        });

        let session = Arc::clone(self);
        let mut event_shutdown = shutdown_rx;
        let event_task = tokio::spawn(async move {
            let mut events = events;
            loop {
                tokio::select! {
                    _ = event_shutdown.changed() => break,
                    event = events.recv() => {
                        match event {
                            Some(LiveEvent::Opened) => debug!("Live session open"),
                            Some(LiveEvent::Content(content)) => {
                                session.handle_content(content).await;
                            }
                            Some(LiveEvent::Error(message)) => {
                                session.on_transport_error(message).await;
                                break;
                            }
                            Some(LiveEvent::Closed) | None => {
                                session.on_remote_closed().await;
                                break;
                            }
                        }
                    }
                }
            }
            debug!("Event task stopped");
        });

        *self.capture_task.lock().await = Some(capture_task);
        *self.event_task.lock().await = Some(event_task);

        info!("Voice session active: {}", self.config.session_id);
        Ok(())
    }

    /// Stop the session and release every resource; a no-op when idle
    pub async fn stop(&self) {
        let _lifecycle = self.lifecycle.lock().await;
        self.teardown().await;
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state_tx.borrow().clone()
    }

    /// Watch lifecycle state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Whether the session is currently live
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Finalized transcript turns so far
    pub async fn transcript(&self) -> Vec<TranscriptTurn> {
        self.transcript.lock().await.turns().to_vec()
    }

    /// Text of the assistant turn currently in progress
    pub async fn pending_text(&self) -> String {
        self.transcript.lock().await.pending().to_string()
    }

    /// Number of live scheduled playback entries
    pub async fn scheduled_playback(&self) -> usize {
        let scheduler = self.scheduler.lock().await;
        scheduler.as_ref().map(|s| s.live_count()).unwrap_or(0)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// React to one inbound server message
    async fn handle_content(&self, content: ServerContent) {
        if !self.active.load(Ordering::SeqCst) {
            return;
        }

        if let Some(fragment) = &content.transcript {
            self.transcript.lock().await.push_fragment(fragment);
        }
        if content.turn_complete {
            self.transcript.lock().await.finish_turn(Speaker::Assistant);
        }

        if let Some(payload) = &content.audio {
            match pcm::decode_audio_payload(payload) {
                Ok(samples) => {
                    let mut scheduler = self.scheduler.lock().await;
                    if let Some(scheduler) = scheduler.as_mut() {
                        if let Err(e) = scheduler.schedule(samples) {
                            warn!("Failed to schedule playback chunk: {}", e);
                        }
                    }
                }
                Err(e) => warn!("Discarding undecodable audio chunk: {}", e),
            }
        }

        if content.interrupted {
            let mut scheduler = self.scheduler.lock().await;
            if let Some(scheduler) = scheduler.as_mut() {
                scheduler.flush();
            }
        }

        let mut scheduler = self.scheduler.lock().await;
        if let Some(scheduler) = scheduler.as_mut() {
            scheduler.reap_finished();
        }
    }

    async fn on_transport_error(&self, message: String) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        warn!("Live session error: {}", message);
        let error = SessionError::Transport(TransportError::Closed(message));
        self.state_tx
            .send_replace(SessionState::Failed(error.user_message()));
        self.release_resources().await;
    }

    async fn on_remote_closed(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        info!("Live session closed by remote");
        self.state_tx.send_replace(SessionState::Idle);
        self.release_resources().await;
    }

    /// Record a start failure and release whatever was acquired
    async fn fail(&self, error: SessionError) -> SessionError {
        warn!("Session start failed: {}", error);
        self.state_tx
            .send_replace(SessionState::Failed(error.user_message()));
        self.release_resources().await;
        error
    }

    /// Full ordered teardown; every step runs even if an earlier one fails
    async fn teardown(&self) {
        // Flip the flag first so any in-flight callback observing it stops
        // acting before any asynchronous step runs
        let was_active = self.active.swap(false, Ordering::SeqCst);

        {
            let current = self.state_tx.borrow().clone();
            // A Failed state stays visible (with its retry action) until the
            // next start()
            if matches!(current, SessionState::Connecting | SessionState::Active) {
                self.state_tx.send_replace(SessionState::Idle);
            }
        }

        if let Some(shutdown) = self.shutdown.lock().await.take() {
            let _ = shutdown.send(true);
        }

        if let Some(task) = self.capture_task.lock().await.take() {
            if let Err(e) = task.await {
                warn!("Capture task failed: {}", e);
            }
        }
        if let Some(task) = self.event_task.lock().await.take() {
            if let Err(e) = task.await {
                warn!("Event task failed: {}", e);
            }
        }

        self.release_resources().await;

        if was_active {
            info!("Session teardown complete: {}", self.config.session_id);
        }
    }

    /// Release device and network resources, each step in its own failure
    /// boundary so one failure never blocks the rest
    async fn release_resources(&self) {
        if let Some(handle) = self.live.lock().await.take() {
            if let Err(e) = handle.close().await {
                warn!("Failed to close live session: {}", e);
            }
        }

        if let Some(mut input) = self.input.lock().await.take() {
            if let Err(e) = input.stop().await {
                warn!("Failed to release capture device {}: {}", input.name(), e);
            }
        }

        if let Some(mut scheduler) = self.scheduler.lock().await.take() {
            // Stops every scheduled entry, resets the cursor, then closes
            // the sink awaiting its release
            scheduler.close().await;
        }
    }
}

/// Forward one captured frame to the live session
///
/// Frames are dropped, not queued, whenever the session is not fully live:
/// realtime audio has no value stale. A single failed send is logged and
/// swallowed so the capture loop never dies mid-session.
async fn forward_frame(
    frame: AudioFrame,
    sample_rate: u32,
    active: &AtomicBool,
    live: &Mutex<Option<Arc<dyn LiveHandle>>>,
) {
    if !active.load(Ordering::SeqCst) {
        return;
    }

    let pcm_bytes = pcm::i16_to_le_bytes(&pcm::f32_to_i16(&frame.samples));
    let chunk = RealtimeAudio::new(pcm::encode_base64(&pcm_bytes), sample_rate);

    let handle = { live.lock().await.clone() };
    let Some(handle) = handle else {
        // Handshake pending or already torn down
        return;
    };
    if !active.load(Ordering::SeqCst) {
        return;
    }

    if let Err(e) = handle.send_realtime(chunk).await {
        warn!("Dropping audio frame: {}", e);
    }
}

use thiserror::Error;
use tokio::sync::mpsc;

use super::frame::AudioFrame;

/// Failures acquiring or operating an audio device
///
/// Environment errors (`Unsupported`) are non-retryable without an
/// environment change; device errors are retryable after remediation.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("audio capture is not supported in this environment: {0}")]
    Unsupported(String),

    #[error("microphone permission denied")]
    PermissionDenied,

    #[error("no audio input device found")]
    NotFound,

    #[error("audio input device is busy")]
    Busy,

    #[error("audio device error: {0}")]
    Other(String),
}

/// Configuration for the capture side (one input device per session)
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Capture sample rate in Hz
    pub sample_rate: u32,
    /// Fixed frame size in samples
    pub frame_size: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000, // Live input format is 16kHz mono PCM
            frame_size: 4096,
        }
    }
}

/// Configuration for the playback side (one output sink per session)
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// Playback sample rate in Hz
    pub sample_rate: u32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            sample_rate: 24000, // Live output audio arrives at 24kHz mono
        }
    }
}

/// Audio capture device
///
/// Implementations deliver fixed-size mono frames through a channel until
/// stopped. Dropping the device must release the underlying hardware.
#[async_trait::async_trait]
pub trait InputDevice: Send {
    /// Start capturing audio
    ///
    /// Returns a channel receiver that will receive audio frames
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>, DeviceError>;

    /// Stop capturing and release the device
    async fn stop(&mut self) -> Result<(), DeviceError>;

    /// Device name for logging
    fn name(&self) -> &str;
}

/// Audio output sink with a monotonically advancing device clock
///
/// `play` schedules a buffer to start at an absolute clock time; entries are
/// identified by caller-assigned ids so they can be force-stopped and their
/// natural completion observed via `finished`.
#[async_trait::async_trait]
pub trait OutputSink: Send {
    /// Current device clock time in seconds
    fn now(&self) -> f64;

    /// Schedule a mono buffer to start playing at `start` (device clock seconds)
    fn play(&mut self, id: u64, samples: Vec<f32>, start: f64) -> Result<(), DeviceError>;

    /// Force-stop a scheduled entry; unknown ids are ignored
    fn stop(&mut self, id: u64);

    /// Drain the ids of entries that have finished playing naturally
    fn finished(&mut self) -> Vec<u64>;

    /// Close the sink, awaiting completion of the release
    async fn close(&mut self) -> Result<(), DeviceError>;
}

/// Per-session factory for audio devices
///
/// Devices are acquired on session start and released on teardown; the
/// factory itself outlives sessions.
#[async_trait::async_trait]
pub trait DeviceFactory: Send + Sync {
    async fn open_input(&self, config: &CaptureConfig) -> Result<Box<dyn InputDevice>, DeviceError>;

    async fn open_output(
        &self,
        config: &PlaybackConfig,
    ) -> Result<Box<dyn OutputSink>, DeviceError>;
}

use anyhow::Result;
use serde::Deserialize;

use crate::live::LiveConfig;
use crate::session::SessionConfig;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub live: LiveSettings,
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    /// Capture sample rate in Hz (live input format)
    pub capture_sample_rate: u32,
    /// Playback sample rate in Hz (live output format)
    pub playback_sample_rate: u32,
    /// Capture frame size in samples
    pub frame_size: usize,
}

/// Cosmetic live-session knobs; the voice core treats these as
/// configuration, not semantics
#[derive(Debug, Deserialize)]
pub struct LiveSettings {
    pub model: String,
    pub voice: String,
    pub system_instruction: String,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the JSON record store
    pub path: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let defaults = LiveConfig::default();

        let settings = config::Config::builder()
            .set_default("service.name", "saathi-voice")?
            .set_default("audio.capture_sample_rate", 16000_i64)?
            .set_default("audio.playback_sample_rate", 24000_i64)?
            .set_default("audio.frame_size", 4096_i64)?
            .set_default("live.model", defaults.model)?
            .set_default("live.voice", defaults.voice)?
            .set_default("live.system_instruction", defaults.system_instruction)?
            .set_default("storage.path", "storage")?
            .add_source(config::File::with_name(path).required(false))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Session parameters derived from this configuration
    pub fn session_config(&self) -> SessionConfig {
        let mut session = SessionConfig::default();
        session.live = LiveConfig {
            model: self.live.model.clone(),
            voice: self.live.voice.clone(),
            system_instruction: self.live.system_instruction.clone(),
        };
        session.capture.sample_rate = self.audio.capture_sample_rate;
        session.capture.frame_size = self.audio.frame_size;
        session.playback.sample_rate = self.audio.playback_sample_rate;
        session
    }
}

//! WAV-file-backed audio devices.
//!
//! `FileDevices` lets a session run headless: capture frames are read from a
//! recorded WAV file at real-time pace, and scheduled reply audio is written
//! to a WAV file at its timeline position (gaps filled with silence).

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::device::{
    CaptureConfig, DeviceError, DeviceFactory, InputDevice, OutputSink, PlaybackConfig,
};
use super::frame::AudioFrame;
use super::pcm;

/// Factory producing a WAV reader input and a WAV writer output per session
pub struct FileDevices {
    input_path: PathBuf,
    output_path: PathBuf,
}

impl FileDevices {
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
        }
    }
}

#[async_trait::async_trait]
impl DeviceFactory for FileDevices {
    async fn open_input(
        &self,
        config: &CaptureConfig,
    ) -> Result<Box<dyn InputDevice>, DeviceError> {
        let samples = read_capture_file(&self.input_path, config.sample_rate)?;
        Ok(Box::new(FileInput {
            name: self.input_path.display().to_string(),
            samples,
            config: config.clone(),
            task: None,
            stop_tx: None,
        }))
    }

    async fn open_output(
        &self,
        config: &PlaybackConfig,
    ) -> Result<Box<dyn OutputSink>, DeviceError> {
        let sink = WavSink::create(&self.output_path, config.sample_rate)?;
        Ok(Box::new(sink))
    }
}

fn read_capture_file(path: &Path, sample_rate: u32) -> Result<Vec<f32>, DeviceError> {
    let reader = hound::WavReader::open(path).map_err(|e| match e {
        hound::Error::IoError(ref io) if io.kind() == std::io::ErrorKind::NotFound => {
            DeviceError::NotFound
        }
        other => DeviceError::Other(other.to_string()),
    })?;

    let spec = reader.spec();
    if spec.sample_rate != sample_rate
        || spec.channels != 1
        || spec.sample_format != hound::SampleFormat::Int
        || spec.bits_per_sample != 16
    {
        return Err(DeviceError::Unsupported(format!(
            "expected {}Hz mono 16-bit WAV, got {}Hz {}ch {}-bit",
            sample_rate, spec.sample_rate, spec.channels, spec.bits_per_sample
        )));
    }

    let samples: Vec<i16> = reader
        .into_samples::<i16>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DeviceError::Other(e.to_string()))?;

    info!(
        "Capture file loaded: {} ({:.1}s at {}Hz)",
        path.display(),
        samples.len() as f64 / sample_rate as f64,
        sample_rate
    );

    Ok(pcm::i16_to_f32(&samples))
}

/// Capture device that replays a WAV file as fixed-size frames in real time
pub struct FileInput {
    name: String,
    samples: Vec<f32>,
    config: CaptureConfig,
    task: Option<JoinHandle<()>>,
    stop_tx: Option<watch::Sender<bool>>,
}

#[async_trait::async_trait]
impl InputDevice for FileInput {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>, DeviceError> {
        let (frame_tx, frame_rx) = mpsc::channel(8);
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let samples = std::mem::take(&mut self.samples);
        let frame_size = self.config.frame_size;
        let sample_rate = self.config.sample_rate;
        let frame_duration = Duration::from_secs_f64(frame_size as f64 / sample_rate as f64);

        let task = tokio::spawn(async move {
            let mut timestamp_ms = 0u64;

            for chunk in samples.chunks(frame_size) {
                let frame = AudioFrame {
                    samples: chunk.to_vec(),
                    sample_rate,
                    timestamp_ms,
                };
                timestamp_ms += (frame.duration_secs() * 1000.0) as u64;

                tokio::select! {
                    _ = stop_rx.changed() => break,
                    res = frame_tx.send(frame) => {
                        if res.is_err() {
                            break;
                        }
                    }
                }

                // Pace frames at real time so the remote side hears speech,
                // not a burst
                tokio::select! {
                    _ = stop_rx.changed() => break,
                    _ = tokio::time::sleep(frame_duration) => {}
                }
            }
        });

        self.task = Some(task);
        self.stop_tx = Some(stop_tx);
        Ok(frame_rx)
    }

    async fn stop(&mut self) -> Result<(), DeviceError> {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(true);
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Capture reader task failed: {}", e);
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Output sink that renders the playback timeline into a WAV file
///
/// The device clock is the duration written so far; scheduling ahead of the
/// clock writes silence up to the start position. File writes complete
/// synchronously, so entries finish as soon as they are written.
pub struct WavSink {
    writer: Option<hound::WavWriter<BufWriter<File>>>,
    sample_rate: u32,
    samples_written: u64,
    done: Vec<u64>,
}

impl WavSink {
    pub fn create(path: &Path, sample_rate: u32) -> Result<Self, DeviceError> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let writer = hound::WavWriter::create(path, spec).map_err(|e| {
            DeviceError::Other(format!("failed to create {}: {}", path.display(), e))
        })?;

        Ok(Self {
            writer: Some(writer),
            sample_rate,
            samples_written: 0,
            done: Vec::new(),
        })
    }

    fn write_samples(&mut self, samples: &[i16]) -> Result<(), DeviceError> {
        if let Some(writer) = &mut self.writer {
            for &sample in samples {
                writer
                    .write_sample(sample)
                    .map_err(|e| DeviceError::Other(e.to_string()))?;
            }
            self.samples_written += samples.len() as u64;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl OutputSink for WavSink {
    fn now(&self) -> f64 {
        self.samples_written as f64 / self.sample_rate as f64
    }

    fn play(&mut self, id: u64, samples: Vec<f32>, start: f64) -> Result<(), DeviceError> {
        let start_sample = (start * self.sample_rate as f64).round() as u64;
        if start_sample > self.samples_written {
            let gap = (start_sample - self.samples_written) as usize;
            self.write_samples(&vec![0i16; gap])?;
        }
        self.write_samples(&pcm::f32_to_i16(&samples))?;
        self.done.push(id);
        Ok(())
    }

    fn stop(&mut self, id: u64) {
        // Already rendered; just make sure the entry is not reported as a
        // natural completion
        self.done.retain(|&d| d != id);
    }

    fn finished(&mut self) -> Vec<u64> {
        std::mem::take(&mut self.done)
    }

    async fn close(&mut self) -> Result<(), DeviceError> {
        if let Some(writer) = self.writer.take() {
            writer
                .finalize()
                .map_err(|e| DeviceError::Other(e.to_string()))?;
        }
        Ok(())
    }
}

impl Drop for WavSink {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.take() {
            if let Err(e) = writer.finalize() {
                warn!("Failed to finalize WAV sink on drop: {}", e);
            }
        }
    }
}

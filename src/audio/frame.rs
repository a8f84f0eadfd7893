/// One fixed-size block of captured audio samples, processed as a unit
///
/// Frames are transient: produced by an input device, converted and
/// transmitted (or dropped), never retained beyond one processing step.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Mono float samples in [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

impl AudioFrame {
    /// Frame duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

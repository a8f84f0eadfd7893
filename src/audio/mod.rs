pub mod device;
pub mod file;
pub mod frame;
pub mod pcm;

pub use device::{
    CaptureConfig, DeviceError, DeviceFactory, InputDevice, OutputSink, PlaybackConfig,
};
pub use file::{FileDevices, FileInput, WavSink};
pub use frame::AudioFrame;

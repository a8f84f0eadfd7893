use thiserror::Error;

use crate::audio::DeviceError;
use crate::live::TransportError;

/// Why a session failed to start or was terminated
///
/// Each cause maps to a specific user-facing message; transient per-frame
/// send faults never surface here (they are logged and swallowed by the
/// capture loop).
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl SessionError {
    /// Human-readable, cause-specific message shown in the error panel
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Device(DeviceError::Unsupported(detail)) => format!(
                "This environment does not support live voice capture ({}). \
                 Check your audio setup and try again.",
                detail
            ),
            SessionError::Device(DeviceError::PermissionDenied) => {
                "Permission denied: the assistant needs your microphone to work. \
                 Allow microphone access and try again."
                    .to_string()
            }
            SessionError::Device(DeviceError::NotFound) => {
                "Hardware not found: no microphone detected. Plug in a microphone \
                 or check your device settings."
                    .to_string()
            }
            SessionError::Device(DeviceError::Busy) => {
                "Hardware busy: your microphone is being used by another app. \
                 Close other calls and try again."
                    .to_string()
            }
            SessionError::Device(DeviceError::Other(detail)) => {
                format!("Microphone error: {}. Check your audio settings.", detail)
            }
            SessionError::Transport(_) => {
                "Network error: the connection to the assistant was interrupted. \
                 Check your internet and try again."
                    .to_string()
            }
        }
    }
}

/// Lifecycle state of a voice session, owned exclusively by
/// [`VoiceSession`](super::VoiceSession)
///
/// Other components never infer liveness from this directly; the capture and
/// event tasks read the controller's atomic active flag instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No session; resources released
    Idle,
    /// Acquiring devices and performing the network handshake
    Connecting,
    /// Streaming both ways
    Active,
    /// Session start or transport failed; carries the user-facing message.
    /// Retry by calling `start()` again.
    Failed(String),
}

impl SessionState {
    pub fn is_failed(&self) -> bool {
        matches!(self, SessionState::Failed(_))
    }
}

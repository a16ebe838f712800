// Error taxonomy for the capture -> transcribe -> clean pipeline.
//
// Every stage failure is converted to one of these variants at the stage
// boundary; callers map them to a user-facing notification and return to idle.
// No automatic retries happen anywhere in this crate.

/// Top-level error type for memo-local operations.
#[derive(Debug, thiserror::Error)]
pub enum MemoError {
    /// Microphone access was refused. Recoverable, no state change.
    #[error("Microphone permission denied: {message}")]
    PermissionDenied { message: String },

    /// The captured audio buffer could not be decoded or resampled.
    #[error("Audio decode failed: {message}")]
    Decode { message: String },

    /// Waveform energy is below the silence threshold. A warning, not a hard
    /// failure; the transcription capability must not be invoked.
    #[error("Audio is silent (rms {rms:.6} below threshold {threshold:.6})")]
    SilentAudio { rms: f32, threshold: f32 },

    /// The transcription capability failed or returned an error status.
    #[error("Transcription failed: {message}")]
    Capability { message: String },

    /// The hallucination filter rejected all text. Distinct from a hard
    /// failure: nothing was recognized.
    #[error("No speech recognized in recording")]
    EmptyResult,

    /// A store write failed. Surfaced but does not roll back in-memory state.
    #[error("Persistence failed: {message}")]
    Persistence { message: String },

    /// A previous recording session is still being processed.
    #[error("A recording is already being processed")]
    Busy,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type MemoResult<T> = Result<T, MemoError>;

impl MemoError {
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: msg.into(),
        }
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode {
            message: msg.into(),
        }
    }

    pub fn capability(msg: impl Into<String>) -> Self {
        Self::Capability {
            message: msg.into(),
        }
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence {
            message: msg.into(),
        }
    }

    /// Whether this error is a soft rejection (silence or fully filtered
    /// text) rather than a genuine failure.
    pub fn is_soft_rejection(&self) -> bool {
        matches!(self, Self::SilentAudio { .. } | Self::EmptyResult)
    }
}

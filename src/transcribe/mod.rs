// Transcription Module
//
// The speech-to-text engine is a black box behind `TranscriptionProvider`:
// the pipeline only needs `transcribe(waveform, options) -> text`. Two
// interchangeable implementations ship here: a remote HTTP endpoint
// (remote.rs) and a locally-resident engine offloaded to a dedicated worker
// task (worker.rs).

pub mod remote;
pub mod worker;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::audio::Waveform;
use crate::error::MemoResult;

/// Options handed to the capability alongside the waveform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscribeOptions {
    /// Language code (None = auto-detect).
    pub language: Option<String>,
    /// Free-text hint listing the user's registered keywords.
    pub keyword_prompt: Option<String>,
}

/// Raw capability output before any filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptResult {
    pub text: String,
}

/// Black-box speech-to-text capability.
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    async fn transcribe(
        &self,
        waveform: &Waveform,
        options: &TranscribeOptions,
    ) -> MemoResult<TranscriptResult>;

    fn provider_name(&self) -> &str;
}

pub use remote::RemoteProvider;
pub use worker::{LocalEngine, LocalWorker};

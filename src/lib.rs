// Memo-Local - Voice-memo transcription pipeline
//
// Turns a noisy raw recording and a noisy raw model transcript into a
// trustworthy note:
// - Audio: downmix, resample to 16kHz mono, normalize, silence-gate
// - Transcription: black-box capability (remote HTTP or local worker)
// - Text: hallucination filter, keyword correction
// - Records: preview + timestamped note, flat JSON persistence
//
// UI, capture plumbing and the speech model itself live outside this crate.

pub mod app;
pub mod audio;
pub mod config;
pub mod error;
pub mod record;
pub mod store;
pub mod text;
pub mod transcribe;

pub use app::MemoApp;
pub use audio::{AudioBuffer, Waveform};
pub use config::{DecodePreset, PipelineConfig, TARGET_SAMPLE_RATE};
pub use error::{MemoError, MemoResult};
pub use record::TranscriptionRecord;
pub use text::{Keyword, KeywordSet, TranscriptCleaner};
pub use transcribe::{
    LocalEngine, LocalWorker, RemoteProvider, TranscribeOptions, TranscriptResult,
    TranscriptionProvider,
};

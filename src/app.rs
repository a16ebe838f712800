// Application controller.
//
// One owning object holds the pipeline state (config, keyword set, record
// list, stores, provider) instead of ambient globals, so the signal and text
// stages stay pure functions of their inputs. All mutations happen through
// discrete calls on this controller; the processing guard refuses a new
// capture while a previous session is still in flight.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Local;
use log::{error, info, warn};

use crate::audio::{self, AudioBuffer};
use crate::config::PipelineConfig;
use crate::error::{MemoError, MemoResult};
use crate::record::{self, TranscriptionRecord};
use crate::store::JsonStore;
use crate::text::{apply_keywords, Keyword, KeywordSet, TranscriptCleaner};
use crate::transcribe::{TranscribeOptions, TranscriptionProvider};

pub struct MemoApp {
    config: PipelineConfig,
    cleaner: TranscriptCleaner,
    keywords: KeywordSet,
    records: Vec<TranscriptionRecord>,
    record_store: JsonStore,
    keyword_store: JsonStore,
    provider: Box<dyn TranscriptionProvider>,
    processing: Arc<AtomicBool>,
}

/// Clears the processing flag when the pipeline finishes, fails, or its
/// future is dropped mid-flight.
struct ProcessingGuard(Arc<AtomicBool>);

impl Drop for ProcessingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl MemoApp {
    /// Load both stores once and build the controller. Corrupt or missing
    /// store data degrades to empty collections.
    pub fn new(
        config: PipelineConfig,
        provider: Box<dyn TranscriptionProvider>,
        data_dir: &Path,
    ) -> Self {
        let record_store = JsonStore::new(data_dir.join("records.json"));
        let keyword_store = JsonStore::new(data_dir.join("keywords.json"));

        let records: Vec<TranscriptionRecord> = record_store.load();
        let keywords = KeywordSet::from_keywords(keyword_store.load());
        info!(
            "Loaded {} records and {} keywords from {}",
            records.len(),
            keywords.keywords().len(),
            data_dir.display()
        );

        let cleaner = TranscriptCleaner::from_config(&config);
        Self {
            config,
            cleaner,
            keywords,
            records,
            record_store,
            keyword_store,
            provider,
            processing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Run the full capture pipeline: resample -> normalize -> silence gate
    /// -> transcribe -> hallucination filter -> keyword correction -> record.
    ///
    /// Exactly one capture is processed at a time; a second call while one is
    /// in flight is refused with `Busy`. The guard is released on every exit
    /// path, success or failure.
    pub async fn process_capture(&mut self, buffer: AudioBuffer) -> MemoResult<TranscriptionRecord> {
        if self.processing.swap(true, Ordering::SeqCst) {
            return Err(MemoError::Busy);
        }
        let _guard = ProcessingGuard(Arc::clone(&self.processing));
        let result = self.run_pipeline(buffer).await;

        if let Err(ref e) = result {
            if e.is_soft_rejection() {
                info!("Capture rejected: {}", e);
            } else {
                error!("Capture failed: {}", e);
            }
        }
        result
    }

    /// Decode a WAV upload and run it through the same pipeline.
    pub async fn process_wav_file(&mut self, path: &Path) -> MemoResult<TranscriptionRecord> {
        let buffer = audio::decode_wav_file(path)?;
        self.process_capture(buffer).await
    }

    async fn run_pipeline(&mut self, buffer: AudioBuffer) -> MemoResult<TranscriptionRecord> {
        let waveform = audio::resample_to_mono(&buffer, self.config.target_sample_rate)?;
        let waveform = audio::normalize(waveform);
        audio::gate_silence(&waveform, self.config.silence_rms_threshold)?;

        let options = TranscribeOptions {
            language: self.config.language.clone(),
            keyword_prompt: self.keywords.prompt(),
        };
        let raw = self.provider.transcribe(&waveform, &options).await?;
        info!(
            "{} returned {} chars of raw transcript",
            self.provider.provider_name(),
            raw.text.chars().count()
        );

        let cleaned = self.cleaner.clean(&raw.text);
        if cleaned.is_empty() {
            return Err(MemoError::EmptyResult);
        }

        let corrected = apply_keywords(&cleaned, &self.keywords);
        let record = record::build_record(&corrected, Local::now());

        // Newest first. A failed store write is surfaced in the log but the
        // in-memory list keeps the record.
        self.records.insert(0, record.clone());
        if let Err(e) = self.record_store.save(&self.records) {
            error!("Failed to persist records: {}", e);
        }

        Ok(record)
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    /// Records, newest first.
    pub fn records(&self) -> &[TranscriptionRecord] {
        &self.records
    }

    pub fn delete_record(&mut self, id: &str) -> MemoResult<()> {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        if self.records.len() == before {
            warn!("Delete requested for unknown record {}", id);
            return Ok(());
        }
        self.record_store.save(&self.records)
    }

    /// Export a record's full text as a plain-text file in `dir`.
    pub fn export_record(&self, id: &str, dir: &Path) -> MemoResult<PathBuf> {
        let record = self
            .records
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| MemoError::persistence(format!("unknown record {}", id)))?;
        record::export_record(record, dir)
    }

    pub fn keywords(&self) -> &[Keyword] {
        self.keywords.keywords()
    }

    /// Register a keyword. Returns None for a blank word or a
    /// case-insensitive duplicate.
    pub fn add_keyword(&mut self, word: &str) -> MemoResult<Option<Keyword>> {
        let added = self.keywords.add(word).cloned();
        if added.is_some() {
            self.keyword_store.save(self.keywords.keywords())?;
        }
        Ok(added)
    }

    pub fn delete_keyword(&mut self, id: i64) -> MemoResult<bool> {
        if self.keywords.remove(id) {
            self.keyword_store.save(self.keywords.keywords())?;
            return Ok(true);
        }
        Ok(false)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::audio::Waveform;
    use crate::transcribe::TranscriptResult;

    struct FixedProvider;

    #[async_trait]
    impl TranscriptionProvider for FixedProvider {
        async fn transcribe(
            &self,
            _waveform: &Waveform,
            _options: &TranscribeOptions,
        ) -> MemoResult<TranscriptResult> {
            Ok(TranscriptResult {
                text: "会議のメモです。".to_string(),
            })
        }

        fn provider_name(&self) -> &str {
            "fixed"
        }
    }

    fn speech_buffer() -> AudioBuffer {
        let samples = (0..16000).map(|i| (i as f32 * 0.2).sin() * 0.4).collect();
        AudioBuffer::new(samples, 16000, 1)
    }

    #[tokio::test]
    async fn test_capture_refused_while_session_in_flight() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = MemoApp::new(
            PipelineConfig::default(),
            Box::new(FixedProvider),
            dir.path(),
        );

        app.processing.store(true, Ordering::SeqCst);
        let err = app.process_capture(speech_buffer()).await.unwrap_err();
        assert!(matches!(err, MemoError::Busy));
        // A refused call must not clear the running session's flag.
        assert!(app.is_processing());

        app.processing.store(false, Ordering::SeqCst);
        assert!(app.process_capture(speech_buffer()).await.is_ok());
        assert!(!app.is_processing());
    }
}

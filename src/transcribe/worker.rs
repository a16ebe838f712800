// Transcription - Local Engine Worker
//
// A locally-resident model runs blocking inference, so it lives on its own
// worker task: jobs go in over an mpsc channel, each carrying a oneshot for
// its result. The pipeline only suspends at the submit/receive boundary.
// There is no mid-flight cancellation; a job runs to completion or failure.

use async_trait::async_trait;
use log::{error, info, warn};
use tokio::sync::{mpsc, oneshot};

use super::{TranscribeOptions, TranscriptResult, TranscriptionProvider};
use crate::audio::Waveform;
use crate::config::DecodePreset;
use crate::error::{MemoError, MemoResult};

/// Blocking local inference engine. Decoding parameters arrive as the
/// configured preset; implementations are expected to honor them (low
/// temperature and a no-speech threshold keep hallucinated loops down).
pub trait LocalEngine: Send + 'static {
    fn transcribe(
        &mut self,
        samples: &[f32],
        sample_rate: u32,
        options: &TranscribeOptions,
        preset: &DecodePreset,
    ) -> anyhow::Result<String>;

    fn engine_name(&self) -> &str {
        "local"
    }
}

struct Job {
    waveform: Waveform,
    options: TranscribeOptions,
    reply: oneshot::Sender<MemoResult<TranscriptResult>>,
}

/// Handle to a local engine running on a dedicated worker task.
pub struct LocalWorker {
    sender: mpsc::UnboundedSender<Job>,
    name: String,
}

impl LocalWorker {
    /// Move the engine onto its worker task and return the submitting handle.
    /// The worker exits when the handle (and its clones) are dropped.
    pub fn spawn<E: LocalEngine>(mut engine: E, preset: DecodePreset) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();
        let name = engine.engine_name().to_string();
        let worker_name = name.clone();

        tokio::task::spawn_blocking(move || {
            info!("Transcription worker '{}' started", worker_name);
            while let Some(job) = receiver.blocking_recv() {
                let result = engine
                    .transcribe(
                        &job.waveform.samples,
                        job.waveform.sample_rate,
                        &job.options,
                        &preset,
                    )
                    .map(|text| TranscriptResult { text })
                    .map_err(|e| MemoError::capability(e.to_string()));

                if let Err(ref e) = result {
                    error!("Worker '{}' inference failed: {}", worker_name, e);
                }
                if job.reply.send(result).is_err() {
                    warn!("Worker '{}': caller went away before reply", worker_name);
                }
            }
            info!("Transcription worker '{}' finished", worker_name);
        });

        Self { sender, name }
    }
}

#[async_trait]
impl TranscriptionProvider for LocalWorker {
    async fn transcribe(
        &self,
        waveform: &Waveform,
        options: &TranscribeOptions,
    ) -> MemoResult<TranscriptResult> {
        let (reply, response) = oneshot::channel();
        let job = Job {
            waveform: waveform.clone(),
            options: options.clone(),
            reply,
        };

        self.sender
            .send(job)
            .map_err(|_| MemoError::capability("transcription worker is not running"))?;

        response
            .await
            .map_err(|_| MemoError::capability("transcription worker dropped the job"))?
    }

    fn provider_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoEngine;

    impl LocalEngine for EchoEngine {
        fn transcribe(
            &mut self,
            samples: &[f32],
            sample_rate: u32,
            options: &TranscribeOptions,
            preset: &DecodePreset,
        ) -> anyhow::Result<String> {
            assert_eq!(preset.temperature, 0.0);
            Ok(format!(
                "{} samples at {} Hz, prompt={}",
                samples.len(),
                sample_rate,
                options.keyword_prompt.as_deref().unwrap_or("-")
            ))
        }
    }

    struct FailingEngine;

    impl LocalEngine for FailingEngine {
        fn transcribe(
            &mut self,
            _samples: &[f32],
            _sample_rate: u32,
            _options: &TranscribeOptions,
            _preset: &DecodePreset,
        ) -> anyhow::Result<String> {
            anyhow::bail!("model not loaded")
        }
    }

    #[tokio::test]
    async fn test_jobs_round_trip_through_worker() {
        let worker = LocalWorker::spawn(EchoEngine, DecodePreset::default());
        let waveform = Waveform::new(vec![0.0; 160], 16000);
        let options = TranscribeOptions {
            language: None,
            keyword_prompt: Some("3時".to_string()),
        };

        let result = worker.transcribe(&waveform, &options).await.unwrap();
        assert_eq!(result.text, "160 samples at 16000 Hz, prompt=3時");
    }

    #[tokio::test]
    async fn test_engine_failure_maps_to_capability_error() {
        let worker = LocalWorker::spawn(FailingEngine, DecodePreset::default());
        let waveform = Waveform::new(vec![0.0; 160], 16000);

        let err = worker
            .transcribe(&waveform, &TranscribeOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MemoError::Capability { .. }));
    }
}

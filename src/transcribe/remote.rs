// Transcription - Remote HTTP Provider
//
// Posts the waveform as a multipart WAV upload with an optional keyword hint
// and expects `{ "text": "..." }` back. Any transport or status failure maps
// to a capability error; the caller aborts this capture only.

use async_trait::async_trait;
use log::{debug, info};
use serde::Deserialize;

use super::{TranscribeOptions, TranscriptResult, TranscriptionProvider};
use crate::audio::{encode_wav_bytes, Waveform};
use crate::error::{MemoError, MemoResult};

#[derive(Debug, Deserialize)]
struct RemoteResponse {
    text: String,
}

/// Client for a hosted speech-to-text endpoint.
pub struct RemoteProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl RemoteProvider {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

#[async_trait]
impl TranscriptionProvider for RemoteProvider {
    async fn transcribe(
        &self,
        waveform: &Waveform,
        options: &TranscribeOptions,
    ) -> MemoResult<TranscriptResult> {
        let wav_bytes = encode_wav_bytes(waveform)?;
        debug!(
            "Uploading {:.1}s of audio ({} bytes) to {}",
            waveform.duration_secs(),
            wav_bytes.len(),
            self.endpoint
        );

        let file_part = reqwest::multipart::Part::bytes(wav_bytes)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| MemoError::capability(format!("invalid multipart: {}", e)))?;

        let mut form = reqwest::multipart::Form::new().part("file", file_part);
        if let Some(language) = &options.language {
            form = form.text("language", language.clone());
        }
        if let Some(prompt) = &options.keyword_prompt {
            form = form.text("prompt", prompt.clone());
        }

        let mut request = self.client.post(&self.endpoint).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| MemoError::capability(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MemoError::capability(format!(
                "endpoint returned {}: {}",
                status, body
            )));
        }

        let parsed: RemoteResponse = response
            .json()
            .await
            .map_err(|e| MemoError::capability(format!("malformed response: {}", e)))?;

        info!("Remote transcription returned {} chars", parsed.text.len());
        Ok(TranscriptResult { text: parsed.text })
    }

    fn provider_name(&self) -> &str {
        "remote"
    }
}

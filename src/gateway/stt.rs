//! Speech-to-text gateway (ElevenLabs Scribe)

use std::time::Duration;

use async_trait::async_trait;

use super::SpeechToText;
use crate::{Error, Result};

/// Default ElevenLabs API base URL
const API_BASE: &str = "https://api.elevenlabs.io";

/// Default transcription model
pub const DEFAULT_STT_MODEL: &str = "scribe_v1";

/// Request timeout for transcription calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Response from the ElevenLabs transcription API
#[derive(serde::Deserialize)]
struct SttResponse {
    text: String,
}

/// Transcribes speech via the `ElevenLabs` speech-to-text API
#[derive(Debug)]
pub struct ElevenLabsStt {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl ElevenLabsStt {
    /// Create a new STT client
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing or the HTTP client cannot be
    /// built
    pub fn new(api_key: String, model: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "ElevenLabs API key required for STT".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_key,
            model,
            base_url: API_BASE.to_string(),
        })
    }

    /// Override the API base URL (used by tests against a mock server)
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SpeechToText for ElevenLabsStt {
    async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        tracing::debug!(audio_bytes = audio.len(), "starting transcription");

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio.to_vec())
                    .file_name("audio.wav")
                    .mime_str("audio/wav")
                    .map_err(|e| Error::Stt(e.to_string()))?,
            )
            .text("model_id", self.model.clone());

        let response = self
            .client
            .post(format!("{}/v1/speech-to-text", self.base_url))
            .header("xi-api-key", &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "STT request failed");
                Error::Stt(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "STT API error");
            return Err(Error::Stt(format!("ElevenLabs STT error {status}: {body}")));
        }

        let result: SttResponse = response
            .json()
            .await
            .map_err(|e| Error::Stt(format!("unparseable STT response: {e}")))?;

        tracing::info!(transcript = %result.text, "transcription complete");
        Ok(result.text)
    }
}

//! Text-to-speech gateway (ElevenLabs)

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use super::TextToSpeech;
use crate::{Error, Result};

/// Default ElevenLabs API base URL
const API_BASE: &str = "https://api.elevenlabs.io";

/// Default synthesis model
pub const DEFAULT_TTS_MODEL: &str = "eleven_turbo_v2";

/// Sample rate of synthesized PCM output in Hz
pub const OUTPUT_SAMPLE_RATE: u32 = 22_050;

/// Default voice ("Rachel")
const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";

/// Request timeout for synthesis calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// A TTS voice identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceId(String);

impl VoiceId {
    /// Create a voice identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the stock default voice
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_VOICE_ID
    }
}

impl Default for VoiceId {
    fn default() -> Self {
        Self(DEFAULT_VOICE_ID.to_string())
    }
}

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(serde::Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

/// Synthesizes speech via the `ElevenLabs` text-to-speech API
///
/// Output is raw PCM: mono, 16-bit, [`OUTPUT_SAMPLE_RATE`] Hz.
pub struct ElevenLabsTts {
    client: reqwest::Client,
    api_key: String,
    voice: VoiceId,
    model: String,
    base_url: String,
}

impl ElevenLabsTts {
    /// Create a new TTS client
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing or the HTTP client cannot be
    /// built
    pub fn new(api_key: String, voice: VoiceId, model: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "ElevenLabs API key required for TTS".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_key,
            voice,
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

    /// The configured voice
    #[must_use]
    pub const fn voice(&self) -> &VoiceId {
        &self.voice
    }
}

#[async_trait]
impl TextToSpeech for ElevenLabsTts {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let request = TtsRequest {
            text,
            model_id: &self.model,
        };

        let response = self
            .client
            .post(format!(
                "{}/v1/text-to-speech/{}",
                self.base_url, self.voice
            ))
            .query(&[("output_format", "pcm_22050")])
            .header("xi-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "TTS request failed");
                Error::Tts(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "TTS API error");
            return Err(Error::Tts(format!("ElevenLabs TTS error {status}: {body}")));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| Error::Tts(e.to_string()))?;

        tracing::debug!(pcm_bytes = audio.len(), "synthesis complete");
        Ok(audio.to_vec())
    }
}

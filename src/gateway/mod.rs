//! Remote service gateways
//!
//! Each non-trivial operation in the pipeline is delegated to a remote API:
//! speech-to-text, chat completion, and text-to-speech. The traits here are
//! the seams the orchestrator is built against; the concrete clients wrap
//! one vendor each and are replaceable without touching the pipeline.

mod llm;
mod stt;
mod tts;

pub use llm::{DEFAULT_CHAT_MODEL, OpenAiChat};
pub use stt::{DEFAULT_STT_MODEL, ElevenLabsStt};
pub use tts::{DEFAULT_TTS_MODEL, ElevenLabsTts, OUTPUT_SAMPLE_RATE, VoiceId};

use async_trait::async_trait;

use crate::Result;
use crate::session::Turn;

/// Transcribes speech audio to text
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe WAV audio bytes to text
    ///
    /// An empty or whitespace-only transcript is a valid result — the caller
    /// decides whether that means "no speech detected".
    ///
    /// # Errors
    ///
    /// Returns `Error::Stt` if the remote call fails
    async fn transcribe(&self, audio: &[u8]) -> Result<String>;
}

/// Generates a conversational reply from a prompt and prior history
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Produce a reply to `prompt`, given all prior turns in order
    ///
    /// # Errors
    ///
    /// Returns `Error::Llm` if the remote call fails or yields no content
    async fn reply(&self, history: &[Turn], prompt: &str) -> Result<String>;
}

/// Synthesizes speech audio from text
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Synthesize text to raw PCM bytes (mono, 16-bit, 22.05 kHz)
    ///
    /// # Errors
    ///
    /// Returns `Error::Tts` if the remote call fails
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

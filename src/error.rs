//! Error types for the Parlance gateway

use thiserror::Error;

/// Result type alias for Parlance operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the Parlance gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Transcription produced no usable speech. Soft outcome: the caller
    /// reports it and leaves the conversation session untouched.
    #[error("no speech detected")]
    NoSpeech,

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Language model error. Swallowed at the pipeline boundary and
    /// replaced by a fixed fallback reply.
    #[error("LLM error: {0}")]
    Llm(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// Audio device or encoding error
    #[error("audio error: {0}")]
    Audio(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

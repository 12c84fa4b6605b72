//! Configuration for the Parlance gateway
//!
//! All configuration is supplied via the environment (optionally through a
//! `.env` file loaded at startup). Missing required keys are reported by
//! [`Config::validate`] rather than at first use.

use std::path::PathBuf;
use std::str::FromStr;

use crate::gateway::VoiceId;
use crate::{Error, Result};

/// Default microphone sample rate in Hz
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Default transcript log file
const DEFAULT_LOG_PATH: &str = "conversation_log.txt";

/// Parlance gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// `ElevenLabs` API key (STT and TTS)
    pub elevenlabs_api_key: String,

    /// `OpenAI` API key (chat completions)
    pub openai_api_key: String,

    /// TTS voice
    pub voice_id: VoiceId,

    /// Microphone capture sample rate in Hz
    pub sample_rate: u32,

    /// Capture channel count (mono only is supported downstream)
    pub channels: u16,

    /// Optional system prompt prepended to every language model request
    pub system_prompt: Option<String>,

    /// Whether to append conversation turns to the transcript file
    pub log_conversation: bool,

    /// Transcript file path
    pub log_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            elevenlabs_api_key: String::new(),
            openai_api_key: String::new(),
            voice_id: VoiceId::default(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: 1,
            system_prompt: None,
            log_conversation: true,
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
        }
    }
}

impl Config {
    /// Load configuration from the environment
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            elevenlabs_api_key: std::env::var("ELEVENLABS_API_KEY").unwrap_or_default(),
            openai_api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            voice_id: std::env::var("VOICE_ID")
                .ok()
                .filter(|v| !v.is_empty())
                .map_or(defaults.voice_id, VoiceId::new),
            sample_rate: env_parse("SAMPLE_RATE", defaults.sample_rate),
            channels: env_parse("CHANNELS", defaults.channels),
            system_prompt: std::env::var("SYSTEM_PROMPT")
                .ok()
                .filter(|v| !v.is_empty()),
            log_conversation: env_parse("ENABLE_CONVERSATION_LOGGING", defaults.log_conversation),
            log_path: std::env::var("LOG_FILE_PATH")
                .map_or(defaults.log_path, PathBuf::from),
        }
    }

    /// Validate that all required configuration is present
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` naming the missing environment variables
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.elevenlabs_api_key.is_empty() {
            missing.push("ELEVENLABS_API_KEY");
        }
        if self.openai_api_key.is_empty() {
            missing.push("OPENAI_API_KEY");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Config(format!(
                "missing required configuration: {}",
                missing.join(", ")
            )))
        }
    }

    /// Log the current configuration without sensitive values
    pub fn log_summary(&self) {
        tracing::info!(
            sample_rate = self.sample_rate,
            channels = self.channels,
            voice = %self.voice_id,
            transcript_logging = self.log_conversation,
            "configuration loaded"
        );
    }
}

/// Parse an environment variable, falling back to a default on absence or
/// parse failure
fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "unparseable value, using default");
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_fails_validation() {
        let config = Config::default();
        let err = config.validate().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("ELEVENLABS_API_KEY"));
        assert!(message.contains("OPENAI_API_KEY"));
    }

    #[test]
    fn config_with_keys_validates() {
        let config = Config {
            elevenlabs_api_key: "el-key".to_string(),
            openai_api_key: "sk-key".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn defaults_match_deployment_constants() {
        let config = Config::default();
        assert_eq!(config.sample_rate, 44_100);
        assert_eq!(config.channels, 1);
        assert!(config.log_conversation);
        assert_eq!(config.log_path, PathBuf::from("conversation_log.txt"));
    }
}

//! Per-utterance conversation pipeline
//!
//! Sequences one round-trip: transcribe → update session → reply → update
//! session → synthesize. Delivery surfaces own transport encoding; the
//! pipeline deals in text and raw PCM only.

use crate::config::Config;
use crate::gateway::{
    DEFAULT_CHAT_MODEL, DEFAULT_STT_MODEL, DEFAULT_TTS_MODEL, ElevenLabsStt, ElevenLabsTts,
    LanguageModel, OpenAiChat, SpeechToText, TextToSpeech,
};
use crate::session::{ConversationSession, Role};
use crate::transcript::TranscriptLog;
use crate::{Error, Result};

/// Reply used when the language model is unreachable
pub const FALLBACK_REPLY: &str = "I'm sorry, I'm having trouble connecting to my AI service right now. Please try again in a moment.";

/// Result of one completed utterance round-trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// What the user said
    pub transcript: String,
    /// What the assistant replied
    pub reply: String,
    /// Synthesized reply, raw PCM (mono, 16-bit, 22.05 kHz)
    pub audio: Vec<u8>,
}

/// Orchestrates the speech → reply → speech round-trip
///
/// Holds the three gateways and the transcript log; the conversation
/// session is passed in by the caller, which is responsible for serializing
/// pipeline executions per session (at most one in flight).
pub struct Pipeline {
    stt: Box<dyn SpeechToText>,
    llm: Box<dyn LanguageModel>,
    tts: Box<dyn TextToSpeech>,
    transcript: TranscriptLog,
}

impl Pipeline {
    /// Create a pipeline from explicit gateway instances
    #[must_use]
    pub fn new(
        stt: Box<dyn SpeechToText>,
        llm: Box<dyn LanguageModel>,
        tts: Box<dyn TextToSpeech>,
        transcript: TranscriptLog,
    ) -> Self {
        Self {
            stt,
            llm,
            tts,
            transcript,
        }
    }

    /// Create a pipeline wired to the concrete vendor gateways
    ///
    /// # Errors
    ///
    /// Returns error if a required API key is missing
    pub fn from_config(config: &Config) -> Result<Self> {
        let stt = ElevenLabsStt::new(
            config.elevenlabs_api_key.clone(),
            DEFAULT_STT_MODEL.to_string(),
        )?;
        let llm = OpenAiChat::new(
            config.openai_api_key.clone(),
            DEFAULT_CHAT_MODEL.to_string(),
        )?
        .with_system_prompt(config.system_prompt.clone());
        let tts = ElevenLabsTts::new(
            config.elevenlabs_api_key.clone(),
            config.voice_id.clone(),
            DEFAULT_TTS_MODEL.to_string(),
        )?;

        Ok(Self::new(
            Box::new(stt),
            Box::new(llm),
            Box::new(tts),
            TranscriptLog::from_config(config),
        ))
    }

    /// Run one full utterance round-trip
    ///
    /// # Errors
    ///
    /// Returns `Error::NoSpeech` for an empty transcript (session unchanged),
    /// `Error::Stt` on transcription failure (session unchanged), or
    /// `Error::Tts` on synthesis failure (the two new turns remain in the
    /// session; only audio delivery failed).
    pub async fn run(&self, session: &mut ConversationSession, audio: &[u8]) -> Result<Exchange> {
        let transcript = self.transcribe(audio).await?;
        self.respond(session, &transcript).await
    }

    /// Transcribe an utterance
    ///
    /// # Errors
    ///
    /// Returns `Error::NoSpeech` when the transcript is empty or whitespace,
    /// `Error::Stt` when the gateway fails
    pub async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        let text = self.stt.transcribe(audio).await?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(Error::NoSpeech);
        }
        Ok(trimmed.to_string())
    }

    /// Produce the assistant reply for a prompt and record both turns
    ///
    /// Gateway failures never propagate: the fixed [`FALLBACK_REPLY`] is
    /// substituted so every prompt yields a speakable reply. Appends exactly
    /// two turns (user, assistant) — on fallback too.
    pub async fn reply(&self, session: &mut ConversationSession, prompt: &str) -> String {
        let reply = match self.llm.reply(session.turns(), prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "language model failed, using fallback reply");
                FALLBACK_REPLY.to_string()
            }
        };

        self.transcript.record("User", prompt);
        self.transcript.record("AI", &reply);
        session.append(Role::User, prompt);
        session.append(Role::Assistant, &reply);

        reply
    }

    /// Synthesize a reply to raw PCM
    ///
    /// # Errors
    ///
    /// Returns `Error::Tts` on synthesis failure. This is the one failure in
    /// the chain treated as fatal to the current turn — no fallback audio.
    pub async fn speak(&self, text: &str) -> Result<Vec<u8>> {
        self.tts.synthesize(text).await
    }

    /// Clear the session and record the reset as a system event
    pub fn reset(&self, session: &mut ConversationSession) {
        session.reset();
        self.transcript.record("System", "Conversation reset");
        tracing::info!("conversation reset");
    }

    /// Text entry point: reply to a prompt and synthesize it
    ///
    /// Used by the typed loop and by [`Self::run`] after transcription.
    ///
    /// # Errors
    ///
    /// Returns `Error::Tts` on synthesis failure
    pub async fn respond(
        &self,
        session: &mut ConversationSession,
        prompt: &str,
    ) -> Result<Exchange> {
        let reply = self.reply(session, prompt).await;
        let audio = self.speak(&reply).await?;

        Ok(Exchange {
            transcript: prompt.to_string(),
            reply,
            audio,
        })
    }
}

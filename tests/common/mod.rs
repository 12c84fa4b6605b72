//! Shared test stubs for the gateway traits
#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use parlance::gateway::{LanguageModel, SpeechToText, TextToSpeech};
use parlance::session::Turn;
use parlance::{Error, Pipeline, Result, TranscriptLog};

/// STT stub returning a fixed transcript
pub struct StubStt {
    pub transcript: String,
    pub calls: Arc<AtomicUsize>,
}

impl StubStt {
    pub fn new(transcript: &str) -> Self {
        Self {
            transcript: transcript.to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl SpeechToText for StubStt {
    async fn transcribe(&self, _audio: &[u8]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.transcript.clone())
    }
}

/// STT stub that always fails
pub struct FailingStt;

#[async_trait]
impl SpeechToText for FailingStt {
    async fn transcribe(&self, _audio: &[u8]) -> Result<String> {
        Err(Error::Stt("stt unavailable".to_string()))
    }
}

/// LLM stub returning a fixed reply and recording each request's history
pub struct StubLlm {
    pub reply: String,
    pub calls: Arc<AtomicUsize>,
    pub histories: Arc<Mutex<Vec<Vec<(String, String)>>>>,
}

impl StubLlm {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
            histories: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl LanguageModel for StubLlm {
    async fn reply(&self, history: &[Turn], _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let snapshot = history
            .iter()
            .map(|t| (t.role.as_str().to_string(), t.text.clone()))
            .collect();
        self.histories.lock().unwrap().push(snapshot);
        Ok(self.reply.clone())
    }
}

/// LLM stub that always fails
pub struct FailingLlm {
    pub calls: Arc<AtomicUsize>,
}

impl FailingLlm {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl LanguageModel for FailingLlm {
    async fn reply(&self, _history: &[Turn], _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::Llm("llm unavailable".to_string()))
    }
}

/// TTS stub returning fixed PCM bytes and recording what it spoke
pub struct StubTts {
    pub audio: Vec<u8>,
    pub calls: Arc<AtomicUsize>,
    pub spoken: Arc<Mutex<Vec<String>>>,
}

impl StubTts {
    pub fn new(audio: &[u8]) -> Self {
        Self {
            audio: audio.to_vec(),
            calls: Arc::new(AtomicUsize::new(0)),
            spoken: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl TextToSpeech for StubTts {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(self.audio.clone())
    }
}

/// TTS stub that always fails
pub struct FailingTts {
    pub calls: Arc<AtomicUsize>,
}

impl FailingTts {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl TextToSpeech for FailingTts {
    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::Tts("tts unavailable".to_string()))
    }
}

/// Pipeline over happy-path stubs
pub fn stub_pipeline(transcript: &str, reply: &str, audio: &[u8]) -> Pipeline {
    Pipeline::new(
        Box::new(StubStt::new(transcript)),
        Box::new(StubLlm::new(reply)),
        Box::new(StubTts::new(audio)),
        TranscriptLog::disabled(),
    )
}

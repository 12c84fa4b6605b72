//! Local conversation loops
//!
//! The microphone/speaker surface: capture audio, segment it into
//! utterances, run each through the pipeline, play the spoken reply. A
//! typed loop covers the same flow without audio input for quick testing.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::audio::{AudioCapture, AudioPlayback, UtteranceDetector, samples_to_wav};
use crate::config::Config;
use crate::gateway::OUTPUT_SAMPLE_RATE;
use crate::pipeline::Pipeline;
use crate::session::ConversationSession;
use crate::{Error, Result};

/// Poll interval for draining the capture buffer
const CAPTURE_TICK: Duration = Duration::from_millis(100);

/// The local conversation daemon
pub struct Daemon {
    config: Config,
    pipeline: Pipeline,
}

impl Daemon {
    /// Create a daemon from configuration
    ///
    /// # Errors
    ///
    /// Returns error if a required API key is missing
    pub fn new(config: Config) -> Result<Self> {
        let pipeline = Pipeline::from_config(&config)?;
        Ok(Self { config, pipeline })
    }

    /// Run the microphone/speaker loop until interrupted
    ///
    /// Runs on the calling task: cpal streams aren't Send.
    ///
    /// # Errors
    ///
    /// Returns error if audio devices cannot be opened
    pub async fn run(self) -> Result<()> {
        let mut capture = AudioCapture::new(self.config.sample_rate)?;
        let mut playback = AudioPlayback::new(OUTPUT_SAMPLE_RATE)?;
        let mut detector = UtteranceDetector::new(self.config.sample_rate);
        let mut session = ConversationSession::new();

        capture.start()?;
        println!("Start speaking! (Ctrl+C to exit)");

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    println!("\nExiting.");
                    break;
                }
                () = tokio::time::sleep(CAPTURE_TICK) => {
                    let chunk = capture.take_buffer();
                    if chunk.is_empty() || !detector.process(&chunk) {
                        continue;
                    }

                    let utterance = detector.take_utterance();
                    if let Err(e) = self
                        .handle_utterance(&utterance, &mut session, &mut playback)
                        .await
                    {
                        match e {
                            Error::NoSpeech => println!("(no speech detected)"),
                            other => {
                                tracing::error!(error = %other, "conversation loop error");
                                println!("Error: {other}");
                            }
                        }
                    }
                }
            }
        }

        capture.stop();
        Ok(())
    }

    /// Run the typed conversation loop until interrupted
    ///
    /// # Errors
    ///
    /// Returns error if the audio output device cannot be opened
    pub async fn run_text(self) -> Result<()> {
        let mut playback = AudioPlayback::new(OUTPUT_SAMPLE_RATE)?;
        let mut session = ConversationSession::new();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        println!("Text conversation mode. Type your message (or 'quit' to exit)");

        loop {
            let Some(line) = lines.next_line().await? else {
                break;
            };
            let prompt = line.trim();

            if matches!(prompt, "quit" | "exit" | "q") {
                break;
            }
            if prompt.is_empty() {
                continue;
            }
            if prompt.eq_ignore_ascii_case("reset") {
                self.pipeline.reset(&mut session);
                println!("Conversation reset");
                continue;
            }

            match self.pipeline.respond(&mut session, prompt).await {
                Ok(exchange) => {
                    println!("AI: {}", exchange.reply);
                    if let Err(e) = playback.play_pcm(&exchange.audio).await {
                        tracing::error!(error = %e, "playback failed");
                        println!("Error playing audio: {e}");
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "conversation loop error");
                    println!("Error: {e}");
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Run one captured utterance through the pipeline and speak the reply
    async fn handle_utterance(
        &self,
        utterance: &[f32],
        session: &mut ConversationSession,
        playback: &mut AudioPlayback,
    ) -> Result<()> {
        println!("Transcribing...");
        let wav = samples_to_wav(utterance, self.config.sample_rate)?;

        let transcript = self.pipeline.transcribe(&wav).await?;
        println!("You: {transcript}");

        // Saying just "reset" clears the conversation — the microphone is
        // this surface's only input
        if transcript.eq_ignore_ascii_case("reset") {
            self.pipeline.reset(session);
            println!("Conversation reset");
            return Ok(());
        }

        let exchange = self.pipeline.respond(session, &transcript).await?;
        println!("AI: {}", exchange.reply);

        playback.play_pcm(&exchange.audio).await
    }
}

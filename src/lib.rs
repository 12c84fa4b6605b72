//! Parlance - voice conversation gateway
//!
//! Capture audio, transcribe it, generate a conversational reply, speak the
//! reply. Recognition, generation, and synthesis are all delegated to
//! remote APIs; the local code is the conversation session, the orchestrator
//! sequencing one utterance at a time, and three interchangeable delivery
//! surfaces.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 Delivery Surfaces                    │
//! │   HTTP  │  WebSocket  │  Mic/Speaker  │  Text loop  │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │              Pipeline + Session                      │
//! │   transcribe → reply (history) → synthesize          │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │               Remote Gateways                        │
//! │   STT (ElevenLabs) │ LLM (OpenAI) │ TTS (ElevenLabs)│
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod audio;
pub mod config;
pub mod daemon;
pub mod error;
pub mod gateway;
pub mod pipeline;
pub mod session;
pub mod transcript;

pub use config::Config;
pub use daemon::Daemon;
pub use error::{Error, Result};
pub use pipeline::{Exchange, FALLBACK_REPLY, Pipeline};
pub use session::{ConversationSession, Role, Turn};
pub use transcript::TranscriptLog;

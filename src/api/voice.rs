//! Voice conversation endpoints
//!
//! One request/response per utterance: base64 WAV in, transcript plus reply
//! plus base64 WAV out.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use super::ApiState;
use crate::Error;
use crate::audio::pcm_to_wav;
use crate::gateway::OUTPUT_SAMPLE_RATE;

/// Build voice router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/converse", post(converse))
        .route("/reset", post(reset))
        .with_state(state)
}

/// One-utterance request
#[derive(Debug, Deserialize)]
pub struct ConverseRequest {
    /// Base64-encoded WAV audio
    pub audio: String,
}

/// One-utterance response
#[derive(Debug, Serialize)]
pub struct ConverseResponse {
    pub transcript: String,
    pub reply: String,
    /// Base64-encoded WAV audio of the spoken reply (mono, 16-bit, 22.05 kHz)
    pub audio: String,
}

/// Run one utterance round-trip
async fn converse(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<ConverseRequest>,
) -> Result<Json<ConverseResponse>, ConverseError> {
    if request.audio.is_empty() {
        return Err(ConverseError::BadRequest("Empty audio payload"));
    }

    let audio = BASE64
        .decode(&request.audio)
        .map_err(|_| ConverseError::BadRequest("Invalid base64 audio"))?;

    // Holding the lock across the round-trip serializes executions on the
    // shared session.
    let mut session = state.session.lock().await;
    let exchange = state.pipeline.run(&mut session, &audio).await?;
    drop(session);

    let wav = pcm_to_wav(&exchange.audio, OUTPUT_SAMPLE_RATE)?;

    Ok(Json(ConverseResponse {
        transcript: exchange.transcript,
        reply: exchange.reply,
        audio: BASE64.encode(wav),
    }))
}

/// Reset confirmation
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub message: &'static str,
}

/// Clear the conversation session
async fn reset(State(state): State<Arc<ApiState>>) -> Json<ResetResponse> {
    let mut session = state.session.lock().await;
    state.pipeline.reset(&mut session);
    drop(session);

    Json(ResetResponse {
        message: "Conversation reset",
    })
}

/// Converse endpoint errors
#[derive(Debug)]
pub enum ConverseError {
    BadRequest(&'static str),
    NoSpeech,
    TranscriptionFailed(String),
    SynthesisFailed(String),
    Internal(String),
}

impl From<Error> for ConverseError {
    fn from(e: Error) -> Self {
        match e {
            Error::NoSpeech => Self::NoSpeech,
            Error::Stt(msg) => Self::TranscriptionFailed(msg),
            Error::Tts(msg) => Self::SynthesisFailed(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ConverseError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: ErrorBody,
        }

        #[derive(Serialize)]
        struct ErrorBody {
            code: &'static str,
            message: String,
        }

        let (status, code, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.to_string()),
            Self::NoSpeech => (
                StatusCode::BAD_REQUEST,
                "no_speech",
                "No speech detected".to_string(),
            ),
            Self::TranscriptionFailed(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "transcription_failed",
                msg,
            ),
            Self::SynthesisFailed(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "synthesis_failed", msg)
            }
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        (
            status,
            Json(ErrorResponse {
                error: ErrorBody { code, message },
            }),
        )
            .into_response()
    }
}

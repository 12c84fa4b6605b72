//! WebSocket handler for realtime conversation
//!
//! Each connection gets its own conversation session and sees the round-trip
//! as a stream of events: status updates while each stage runs, then the
//! transcript, reply text, and audio as they become available.

use std::sync::Arc;

use axum::{
    Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
    routing::get,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures::{SinkExt, StreamExt, stream::SplitSink};
use serde::{Deserialize, Serialize};

use super::ApiState;
use crate::Error;
use crate::audio::pcm_to_wav;
use crate::gateway::OUTPUT_SAMPLE_RATE;
use crate::session::ConversationSession;

/// Incoming WebSocket message from client
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsIncoming {
    /// One utterance of base64-encoded WAV audio
    Audio { audio: String },
    /// Clear the conversation session
    Reset,
    /// Ping to keep connection alive
    Ping,
}

/// Outgoing WebSocket message to client
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsOutgoing {
    /// Connection established
    Connected { session_id: String },
    /// Progress update while a stage runs
    Status { message: &'static str },
    /// What the user said
    Transcript { text: String },
    /// What the assistant replied
    Reply { text: String },
    /// Base64-encoded WAV audio of the spoken reply
    Audio { audio: String },
    /// Error occurred
    Error { code: &'static str, message: String },
    /// Pong response
    Pong,
}

/// Build WebSocket router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/ws", get(ws_upgrade))
        .with_state(state)
}

/// Handle WebSocket upgrade request
async fn ws_upgrade(State(state): State<Arc<ApiState>>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle one WebSocket connection
///
/// The connection owns its session, so utterances on it are naturally
/// serialized: the next incoming message is not read until the current
/// round-trip completes.
async fn handle_socket(socket: WebSocket, state: Arc<ApiState>) {
    let (mut sender, mut receiver) = socket.split();
    let session_id = uuid::Uuid::new_v4().to_string();
    let mut session = ConversationSession::new();

    let connected = WsOutgoing::Connected {
        session_id: session_id.clone(),
    };
    if send(&mut sender, &connected).await.is_err() {
        return;
    }

    tracing::info!(session_id = %session_id, "WebSocket connected");

    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => {
                if let Err(e) = handle_message(&text, &state, &mut session, &mut sender).await {
                    let error = WsOutgoing::Error {
                        code: "internal_error",
                        message: e.to_string(),
                    };
                    if send(&mut sender, &error).await.is_err() {
                        break;
                    }
                }
            }
            Message::Close(_) => {
                tracing::info!(session_id = %session_id, "WebSocket closed by client");
                break;
            }
            _ => {}
        }
    }

    tracing::info!(session_id = %session_id, "WebSocket disconnected");
}

/// Handle a single incoming message
async fn handle_message(
    text: &str,
    state: &Arc<ApiState>,
    session: &mut ConversationSession,
    sender: &mut SplitSink<WebSocket, Message>,
) -> crate::Result<()> {
    let incoming: WsIncoming = serde_json::from_str(text)
        .map_err(|e| crate::Error::Config(format!("invalid message: {e}")))?;

    match incoming {
        WsIncoming::Ping => send(sender, &WsOutgoing::Pong).await?,
        WsIncoming::Reset => {
            state.pipeline.reset(session);
            send(
                sender,
                &WsOutgoing::Status {
                    message: "Conversation reset",
                },
            )
            .await?;
        }
        WsIncoming::Audio { audio } => handle_audio(&audio, state, session, sender).await?,
    }

    Ok(())
}

/// Run one utterance through the pipeline, emitting stage events
async fn handle_audio(
    audio_b64: &str,
    state: &Arc<ApiState>,
    session: &mut ConversationSession,
    sender: &mut SplitSink<WebSocket, Message>,
) -> crate::Result<()> {
    let Ok(audio) = BASE64.decode(audio_b64) else {
        return send_error(sender, "bad_request", "Invalid base64 audio").await;
    };

    send(
        sender,
        &WsOutgoing::Status {
            message: "Transcribing...",
        },
    )
    .await?;

    let transcript = match state.pipeline.transcribe(&audio).await {
        Ok(transcript) => transcript,
        Err(Error::NoSpeech) => {
            return send_error(sender, "no_speech", "No speech detected").await;
        }
        Err(e) => {
            tracing::error!(error = %e, "transcription failed");
            return send_error(sender, "transcription_failed", &e.to_string()).await;
        }
    };

    send(
        sender,
        &WsOutgoing::Transcript {
            text: transcript.clone(),
        },
    )
    .await?;
    send(
        sender,
        &WsOutgoing::Status {
            message: "Generating response...",
        },
    )
    .await?;

    let reply = state.pipeline.reply(session, &transcript).await;

    send(sender, &WsOutgoing::Reply { text: reply.clone() }).await?;
    send(
        sender,
        &WsOutgoing::Status {
            message: "Generating speech...",
        },
    )
    .await?;

    match state.pipeline.speak(&reply).await {
        Ok(pcm) => {
            let wav = pcm_to_wav(&pcm, OUTPUT_SAMPLE_RATE)?;
            send(
                sender,
                &WsOutgoing::Audio {
                    audio: BASE64.encode(wav),
                },
            )
            .await?;
        }
        Err(e) => {
            tracing::error!(error = %e, "synthesis failed");
            send_error(sender, "synthesis_failed", &e.to_string()).await?;
        }
    }

    Ok(())
}

/// Serialize and send one outgoing message
async fn send(
    sender: &mut SplitSink<WebSocket, Message>,
    message: &WsOutgoing,
) -> crate::Result<()> {
    let text = serde_json::to_string(message)?;
    sender
        .send(Message::Text(text.into()))
        .await
        .map_err(|e| crate::Error::Config(format!("websocket send failed: {e}")))
}

async fn send_error(
    sender: &mut SplitSink<WebSocket, Message>,
    code: &'static str,
    message: &str,
) -> crate::Result<()> {
    send(
        sender,
        &WsOutgoing::Error {
            code,
            message: message.to_string(),
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_message_deserializes() {
        let json = r#"{"type":"audio","audio":"AAE="}"#;
        let msg: WsIncoming = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, WsIncoming::Audio { audio } if audio == "AAE="));
    }

    #[test]
    fn reset_message_deserializes() {
        let json = r#"{"type":"reset"}"#;
        let msg: WsIncoming = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, WsIncoming::Reset));
    }

    #[test]
    fn transcript_event_serializes() {
        let msg = WsOutgoing::Transcript {
            text: "hello".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"transcript\""));
        assert!(json.contains("\"text\":\"hello\""));
    }

    #[test]
    fn error_event_serializes() {
        let msg = WsOutgoing::Error {
            code: "no_speech",
            message: "No speech detected".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"error\""));
        assert!(json.contains("\"code\":\"no_speech\""));
    }
}

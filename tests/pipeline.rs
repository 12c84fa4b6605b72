//! Pipeline orchestration tests
//!
//! Exercises the turn-taking contract with stub gateways: session ordering,
//! the no-speech short-circuit, the fallback reply, and synthesis failure.

use std::sync::atomic::Ordering;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use parlance::{ConversationSession, Error, FALLBACK_REPLY, Pipeline, Role, TranscriptLog};

mod common;
use common::{FailingLlm, FailingStt, FailingTts, StubLlm, StubStt, StubTts, stub_pipeline};

#[tokio::test]
async fn round_trip_produces_exchange_and_two_turns() {
    let pipeline = stub_pipeline("Hello", "Hi there", b"\x00\x01");
    let mut session = ConversationSession::new();

    let exchange = pipeline.run(&mut session, b"fake-wav").await.unwrap();

    assert_eq!(exchange.transcript, "Hello");
    assert_eq!(exchange.reply, "Hi there");
    assert_eq!(BASE64.encode(&exchange.audio), BASE64.encode(b"\x00\x01"));

    assert_eq!(session.len(), 2);
    assert_eq!(session.turns()[0].role, Role::User);
    assert_eq!(session.turns()[0].text, "Hello");
    assert_eq!(session.turns()[1].role, Role::Assistant);
    assert_eq!(session.turns()[1].text, "Hi there");
}

#[tokio::test]
async fn n_utterances_yield_2n_alternating_turns() {
    let pipeline = stub_pipeline("Hello", "Hi there", b"\x00\x01");
    let mut session = ConversationSession::new();

    for _ in 0..5 {
        pipeline.run(&mut session, b"fake-wav").await.unwrap();
    }

    assert_eq!(session.len(), 10);
    for (i, turn) in session.turns().iter().enumerate() {
        let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
        assert_eq!(turn.role, expected, "turn {i} has wrong role");
    }
}

#[tokio::test]
async fn history_sent_to_llm_is_exactly_the_prior_turns() {
    let llm = StubLlm::new("Hi there");
    let histories = llm.histories.clone();
    let pipeline = Pipeline::new(
        Box::new(StubStt::new("Hello")),
        Box::new(llm),
        Box::new(StubTts::new(b"\x00\x01")),
        TranscriptLog::disabled(),
    );
    let mut session = ConversationSession::new();

    for _ in 0..3 {
        pipeline.run(&mut session, b"fake-wav").await.unwrap();
    }

    let histories = histories.lock().unwrap();
    assert_eq!(histories.len(), 3);
    // Request N carries exactly the turns produced by requests 1..N-1
    for (n, history) in histories.iter().enumerate() {
        assert_eq!(history.len(), 2 * n);
        for (i, (role, text)) in history.iter().enumerate() {
            if i % 2 == 0 {
                assert_eq!((role.as_str(), text.as_str()), ("user", "Hello"));
            } else {
                assert_eq!((role.as_str(), text.as_str()), ("assistant", "Hi there"));
            }
        }
    }
}

#[tokio::test]
async fn empty_transcript_short_circuits() {
    let llm = StubLlm::new("Hi there");
    let tts = StubTts::new(b"\x00\x01");
    let llm_calls = llm.calls.clone();
    let tts_calls = tts.calls.clone();
    let pipeline = Pipeline::new(
        Box::new(StubStt::new("   ")),
        Box::new(llm),
        Box::new(tts),
        TranscriptLog::disabled(),
    );
    let mut session = ConversationSession::new();

    let err = pipeline.run(&mut session, b"fake-wav").await.unwrap_err();

    assert!(matches!(err, Error::NoSpeech));
    assert!(session.is_empty());
    assert_eq!(llm_calls.load(Ordering::SeqCst), 0);
    assert_eq!(tts_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn transcription_failure_leaves_session_unchanged() {
    let pipeline = Pipeline::new(
        Box::new(FailingStt),
        Box::new(StubLlm::new("Hi there")),
        Box::new(StubTts::new(b"\x00\x01")),
        TranscriptLog::disabled(),
    );
    let mut session = ConversationSession::new();

    let err = pipeline.run(&mut session, b"fake-wav").await.unwrap_err();

    assert!(matches!(err, Error::Stt(_)));
    assert!(session.is_empty());
}

#[tokio::test]
async fn llm_failure_yields_fallback_reply() {
    let tts = StubTts::new(b"\x00\x01");
    let spoken = tts.spoken.clone();
    let pipeline = Pipeline::new(
        Box::new(StubStt::new("Hello")),
        Box::new(FailingLlm::new()),
        Box::new(tts),
        TranscriptLog::disabled(),
    );
    let mut session = ConversationSession::new();

    let exchange = pipeline.run(&mut session, b"fake-wav").await.unwrap();

    assert!(!exchange.reply.is_empty());
    assert_eq!(exchange.reply, FALLBACK_REPLY);

    // Fallback replies are recorded as turns so display stays consistent
    assert_eq!(session.len(), 2);
    assert_eq!(session.turns()[1].text, FALLBACK_REPLY);

    // The fallback is what gets spoken
    assert_eq!(spoken.lock().unwrap().as_slice(), [FALLBACK_REPLY]);
}

#[tokio::test]
async fn synthesis_failure_is_a_hard_error() {
    let tts = FailingTts::new();
    let tts_calls = tts.calls.clone();
    let pipeline = Pipeline::new(
        Box::new(StubStt::new("Hello")),
        Box::new(StubLlm::new("Hi there")),
        Box::new(tts),
        TranscriptLog::disabled(),
    );
    let mut session = ConversationSession::new();

    let err = pipeline.run(&mut session, b"fake-wav").await.unwrap_err();

    assert!(matches!(err, Error::Tts(_)));
    assert_eq!(tts_calls.load(Ordering::SeqCst), 1);
    // The reply was produced before synthesis failed; its turns remain
    assert_eq!(session.len(), 2);
}

#[tokio::test]
async fn reset_empties_session_and_history_restarts() {
    let llm = StubLlm::new("Hi there");
    let histories = llm.histories.clone();
    let pipeline = Pipeline::new(
        Box::new(StubStt::new("Hello")),
        Box::new(llm),
        Box::new(StubTts::new(b"\x00\x01")),
        TranscriptLog::disabled(),
    );
    let mut session = ConversationSession::new();

    pipeline.run(&mut session, b"fake-wav").await.unwrap();
    pipeline.reset(&mut session);
    assert!(session.is_empty());

    pipeline.run(&mut session, b"fake-wav").await.unwrap();
    assert_eq!(session.len(), 2);

    // The request after reset saw an empty history again
    let histories = histories.lock().unwrap();
    assert_eq!(histories[1].len(), 0);
}

#[tokio::test]
async fn respond_drives_the_text_surface() {
    let pipeline = stub_pipeline("unused", "Hi there", b"\x00\x01");
    let mut session = ConversationSession::new();

    let exchange = pipeline.respond(&mut session, "Hello").await.unwrap();

    assert_eq!(exchange.transcript, "Hello");
    assert_eq!(exchange.reply, "Hi there");
    assert_eq!(session.len(), 2);
}

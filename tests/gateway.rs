//! Gateway client tests against a local mock server

use parlance::Error;
use parlance::gateway::{
    ElevenLabsStt, ElevenLabsTts, LanguageModel as _, OpenAiChat, SpeechToText as _,
    TextToSpeech as _, VoiceId,
};
use parlance::{Role, Turn};

#[tokio::test]
async fn stt_parses_transcript() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/speech-to-text")
        .match_header("xi-api-key", "test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"text":"hello world"}"#)
        .create_async()
        .await;

    let stt = ElevenLabsStt::new("test-key".to_string(), "scribe_v1".to_string())
        .unwrap()
        .with_base_url(server.url());

    let transcript = stt.transcribe(b"RIFF-fake-wav").await.unwrap();
    assert_eq!(transcript, "hello world");
    mock.assert_async().await;
}

#[tokio::test]
async fn stt_error_status_maps_to_stt_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/speech-to-text")
        .with_status(500)
        .with_body("upstream broke")
        .create_async()
        .await;

    let stt = ElevenLabsStt::new("test-key".to_string(), "scribe_v1".to_string())
        .unwrap()
        .with_base_url(server.url());

    let err = stt.transcribe(b"RIFF-fake-wav").await.unwrap_err();
    assert!(matches!(err, Error::Stt(_)));
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn stt_requires_api_key() {
    let err = ElevenLabsStt::new(String::new(), "scribe_v1".to_string()).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[tokio::test]
async fn chat_sends_history_and_parses_reply() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "model": "gpt-4o-mini",
            "messages": [
                {"role": "user", "content": "Hello"},
                {"role": "assistant", "content": "Hi there"},
                {"role": "user", "content": "How are you?"}
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices":[{"message":{"content":"  Doing well!  "}}]}"#)
        .create_async()
        .await;

    let llm = OpenAiChat::new("sk-test".to_string(), "gpt-4o-mini".to_string())
        .unwrap()
        .with_base_url(server.url());

    let history = vec![
        Turn::new(Role::User, "Hello"),
        Turn::new(Role::Assistant, "Hi there"),
    ];
    let reply = llm.reply(&history, "How are you?").await.unwrap();

    assert_eq!(reply, "Doing well!");
    mock.assert_async().await;
}

#[tokio::test]
async fn chat_prepends_system_prompt() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "messages": [
                {"role": "system", "content": "Be brief."},
                {"role": "user", "content": "Hello"}
            ]
        })))
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"content":"Hi"}}]}"#)
        .create_async()
        .await;

    let llm = OpenAiChat::new("sk-test".to_string(), "gpt-4o-mini".to_string())
        .unwrap()
        .with_system_prompt(Some("Be brief.".to_string()))
        .with_base_url(server.url());

    let reply = llm.reply(&[], "Hello").await.unwrap();
    assert_eq!(reply, "Hi");
    mock.assert_async().await;
}

#[tokio::test]
async fn chat_failure_maps_to_llm_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(429)
        .with_body("rate limited")
        .create_async()
        .await;

    let llm = OpenAiChat::new("sk-test".to_string(), "gpt-4o-mini".to_string())
        .unwrap()
        .with_base_url(server.url());

    let err = llm.reply(&[], "Hello").await.unwrap_err();
    assert!(matches!(err, Error::Llm(_)));
}

#[tokio::test]
async fn chat_empty_completion_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"content":"   "}}]}"#)
        .create_async()
        .await;

    let llm = OpenAiChat::new("sk-test".to_string(), "gpt-4o-mini".to_string())
        .unwrap()
        .with_base_url(server.url());

    let err = llm.reply(&[], "Hello").await.unwrap_err();
    assert!(matches!(err, Error::Llm(_)));
}

#[tokio::test]
async fn tts_returns_raw_pcm_bytes() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/text-to-speech/test-voice")
        .match_query(mockito::Matcher::UrlEncoded(
            "output_format".to_string(),
            "pcm_22050".to_string(),
        ))
        .match_header("xi-api-key", "test-key")
        .with_status(200)
        .with_body([0u8, 1, 2, 3])
        .create_async()
        .await;

    let tts = ElevenLabsTts::new(
        "test-key".to_string(),
        VoiceId::new("test-voice"),
        "eleven_turbo_v2".to_string(),
    )
    .unwrap()
    .with_base_url(server.url());

    let audio = tts.synthesize("Hi there").await.unwrap();
    assert_eq!(audio, vec![0u8, 1, 2, 3]);
    mock.assert_async().await;
}

#[tokio::test]
async fn tts_error_status_maps_to_tts_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/text-to-speech/test-voice")
        .match_query(mockito::Matcher::Any)
        .with_status(401)
        .with_body("bad key")
        .create_async()
        .await;

    let tts = ElevenLabsTts::new(
        "test-key".to_string(),
        VoiceId::new("test-voice"),
        "eleven_turbo_v2".to_string(),
    )
    .unwrap()
    .with_base_url(server.url());

    let err = tts.synthesize("Hi there").await.unwrap_err();
    assert!(matches!(err, Error::Tts(_)));
}

//! Language model gateway (OpenAI chat completions)

use std::time::Duration;

use async_trait::async_trait;

use super::LanguageModel;
use crate::session::{Role, Turn};
use crate::{Error, Result};

/// Default OpenAI API base URL
const API_BASE: &str = "https://api.openai.com";

/// Default chat model
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// Request timeout for completion calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(serde::Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(serde::Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(serde::Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(serde::Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(serde::Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Generates replies via the `OpenAI` chat completion API
///
/// The request payload carries, in order, the optional system prompt, every
/// prior turn of the session, and the new user prompt.
pub struct OpenAiChat {
    client: reqwest::Client,
    api_key: String,
    model: String,
    system_prompt: Option<String>,
    base_url: String,
}

impl OpenAiChat {
    /// Create a new chat client
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing or the HTTP client cannot be
    /// built
    pub fn new(api_key: String, model: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "OpenAI API key required for chat".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_key,
            model,
            system_prompt: None,
            base_url: API_BASE.to_string(),
        })
    }

    /// Set a system prompt prepended to every request
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt;
        self
    }

    /// Override the API base URL (used by tests against a mock server)
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl LanguageModel for OpenAiChat {
    async fn reply(&self, history: &[Turn], prompt: &str) -> Result<String> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        if let Some(system) = &self.system_prompt {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        for turn in history {
            messages.push(ChatMessage {
                role: turn.role.as_str(),
                content: &turn.text,
            });
        }
        messages.push(ChatMessage {
            role: Role::User.as_str(),
            content: prompt,
        });

        tracing::debug!(message_count = messages.len(), "requesting completion");

        let request = ChatRequest {
            model: &self.model,
            messages,
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "completion request failed");
                Error::Llm(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "completion API error");
            return Err(Error::Llm(format!("OpenAI API error {status}: {body}")));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Llm(format!("unparseable completion response: {e}")))?;

        let content = result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| Error::Llm("empty completion".to_string()))?;

        tracing::debug!(reply_chars = content.len(), "completion received");
        Ok(content)
    }
}

//! # OpenAI Chat Completions Client
//!
//! Request/response shapes for `POST /v1/chat/completions` and the client
//! that implements [`CompletionGateway`] with them.

use crate::{config::AppConfig, consts, services::CompletionGateway};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One role/content pair of a prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: consts::ROLE_SYSTEM.to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: consts::ROLE_USER.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    /// Model identifier, e.g. "gpt-4o-mini"
    pub model: String,
    /// Ordered prompt messages
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Builds a single-turn prompt, optionally preceded by a system instruction
    pub fn single_turn(
        model: &str,
        system_prompt: Option<&str>,
        user_text: &str,
        max_tokens: u32,
    ) -> Self {
        let messages = system_prompt
            .map(ChatMessage::system)
            .into_iter()
            .chain(std::iter::once(ChatMessage::user(user_text)))
            .collect();

        Self {
            model: model.to_string(),
            messages,
            max_tokens,
        }
    }

    /// Content of the last user message
    pub fn user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == consts::ROLE_USER)
            .map(|m| m.content.as_str())
    }
}

/// Subset of the chat completions response the relay reads.
///
/// Every level is optional so a malformed response still decodes and ends up
/// as "no usable text" instead of a decode error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl CompletionResponse {
    /// Builds a response with one choice, handy for fakes
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            choices: vec![Choice {
                message: Some(ChoiceMessage {
                    content: Some(content.into()),
                }),
            }],
        }
    }

    /// Trimmed `choices[0].message.content`, `None` when absent or blank
    pub fn reply_text(&self) -> Option<&str> {
        self.choices
            .first()?
            .message
            .as_ref()?
            .content
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

/// Chat completions client authenticated with a bearer API key
pub struct OpenAiClient {
    /// HTTP client for making API requests
    client: reqwest::Client,
    /// Chat completions endpoint
    endpoint: String,
    /// Authentication key
    api_key: String,
    /// Upper bound for one completion call
    timeout: Duration,
}

impl OpenAiClient {
    pub fn new(client: reqwest::Client, app_config: &AppConfig) -> Self {
        Self {
            client,
            endpoint: app_config.openai_chat_completions_url.clone(),
            api_key: app_config.openai_api_key.clone(),
            timeout: app_config.openai_timeout(),
        }
    }
}

#[async_trait]
impl CompletionGateway for OpenAiClient {
    #[tracing::instrument(skip_all, fields(model = %request.model))]
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .context("Failed to send request to OpenAI API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());

            anyhow::bail!("OpenAI API returned error status {}: {}", status, body);
        }

        response
            .json::<CompletionResponse>()
            .await
            .context("Failed to parse OpenAI API response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_turn_request_body() {
        let request = CompletionRequest::single_turn("gpt-4o-mini", None, "hello", 800);

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "model": "gpt-4o-mini",
                "messages": [{"role": "user", "content": "hello"}],
                "max_tokens": 800
            })
        );
        assert_eq!(request.user_text(), Some("hello"));
    }

    #[test]
    fn test_single_turn_with_system_prompt() {
        let request =
            CompletionRequest::single_turn("gpt-3.5-turbo", Some("Be brief."), "hours?", 100);

        assert_eq!(
            request.messages,
            vec![ChatMessage::system("Be brief."), ChatMessage::user("hours?")]
        );
        assert_eq!(request.user_text(), Some("hours?"));
    }

    #[test]
    fn test_reply_text_from_api_response() {
        let body = r#"{
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "  Hi! How can I help?\n"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 9, "completion_tokens": 12, "total_tokens": 21}
        }"#;
        let response: CompletionResponse = serde_json::from_str(body).unwrap();

        assert_eq!(response.reply_text(), Some("Hi! How can I help?"));
    }

    #[test]
    fn test_reply_text_absent() {
        for body in [
            r#"{}"#,
            r#"{"choices": []}"#,
            r#"{"choices": [{"index": 0}]}"#,
            r#"{"choices": [{"message": {"role": "assistant"}}]}"#,
            r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#,
            r#"{"choices": [{"message": {"role": "assistant", "content": "   "}}]}"#,
        ] {
            let response: CompletionResponse = serde_json::from_str(body).unwrap();
            assert_eq!(response.reply_text(), None, "body: {body}");
        }
    }
}

//! # LINE Outgoing Message Schemas
//!
//! This module contains data structures for the LINE reply API.

use serde::{Deserialize, Serialize};

/// Body of `POST /v2/bot/message/reply`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyPayload {
    /// Reply token received with the event
    pub reply_token: String,
    /// Messages to send, in order
    pub messages: Vec<OutgoingTextMessage>,
}

impl ReplyPayload {
    /// Creates a reply carrying a single text message
    pub fn text(reply_token: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            reply_token: reply_token.into(),
            messages: vec![OutgoingTextMessage::new(text)],
        }
    }

    /// Text of the first message, mostly useful for logs and tests
    pub fn first_text(&self) -> Option<&str> {
        self.messages.first().map(|m| m.text.as_str())
    }
}

/// Text message to send to LINE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingTextMessage {
    /// Message type, always "text"
    #[serde(rename = "type")]
    pub msg_type: String,
    /// Text content
    pub text: String,
}

impl OutgoingTextMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            msg_type: "text".to_string(),
            text: text.into(),
        }
    }
}

/// Error body returned by the LINE API on non-2xx responses
#[derive(Debug, Deserialize)]
pub struct LineErrorResponse {
    pub message: String,
    #[serde(default)]
    pub details: Vec<LineErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub struct LineErrorDetail {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub property: String,
}

impl std::fmt::Display for LineErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        for detail in &self.details {
            write!(f, "; {}: {}", detail.property, detail.message)?;
        }
        Ok(())
    }
}

//! # LINE Webhook Schemas
//!
//! This module contains the data structures for LINE Messaging API webhooks.
//! These schemas define the JSON payload LINE posts when webhook events occur
//! (messages, follows, joins, postbacks, etc.).
//!
//! Parsing is lenient: unknown fields are ignored and unknown event or message
//! types are kept as plain strings, so a new platform event never breaks a
//! delivery. An event that cannot be decoded at all is dropped with a warning
//! and its siblings are still processed.

use serde::{Deserialize, Deserializer, Serialize};

/// Root webhook payload from LINE
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct WebhookPayload {
    /// User ID of the bot that should receive the events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    /// Events of this delivery, in delivery order
    #[serde(default, deserialize_with = "deserialize_events")]
    pub events: Vec<Event>,
}

/// Decodes each event on its own; `null` counts as no events.
fn deserialize_events<'de, D>(deserializer: D) -> Result<Vec<Event>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();

    Ok(raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<Event>(value) {
            Ok(event) => Some(event),
            Err(e) => {
                logfire::warn!(
                    "Skipping undecodable event at index {index}: {error}",
                    index = index as i64,
                    error = e.to_string()
                );
                None
            }
        })
        .collect())
}

/// One user or platform action within a delivery
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event type (message, follow, join, postback, ...), empty when absent
    #[serde(rename = "type", default)]
    pub event_type: String,
    /// Channel state, "active" or "standby"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Event time in milliseconds since the epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Where the event came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    /// Unique event id, stable across redeliveries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_event_id: Option<String>,
    /// Redelivery information
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_context: Option<DeliveryContext>,
    /// Single-use token to reply to this event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_token: Option<String>,
    /// Message content (if type is "message")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<EventMessage>,
}

/// Sender of an event
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    /// "user", "group" or "room"
    #[serde(rename = "type", default)]
    pub source_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryContext {
    #[serde(default)]
    pub is_redelivery: bool,
}

/// Message object of a message event
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventMessage {
    /// Message ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Message type (text, image, sticker, ...), empty when absent
    #[serde(rename = "type", default)]
    pub msg_type: String,
    /// Text body (if type is "text")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Kind of an [`Event`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Message,
    Follow,
    Unfollow,
    Join,
    Leave,
    Postback,
    Other(String),
}

impl From<&str> for EventKind {
    fn from(value: &str) -> Self {
        match value {
            "message" => EventKind::Message,
            "follow" => EventKind::Follow,
            "unfollow" => EventKind::Unfollow,
            "join" => EventKind::Join,
            "leave" => EventKind::Leave,
            "postback" => EventKind::Postback,
            other => EventKind::Other(other.to_string()),
        }
    }
}

/// What the relay should do with an event
#[derive(Debug, PartialEq, Eq)]
pub enum Classified<'a> {
    /// A text message that can be answered
    Text { text: &'a str, reply_token: &'a str },
    /// Anything else, with a short description for the logs
    Ignored(String),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        EventKind::from(self.event_type.as_str())
    }

    pub fn is_redelivery(&self) -> bool {
        self.delivery_context
            .as_ref()
            .is_some_and(|ctx| ctx.is_redelivery)
    }

    /// Reply token, if present and not blank
    pub fn reply_token(&self) -> Option<&str> {
        self.reply_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
    }

    /// Classifies the event: only text messages with a reply token are answered.
    pub fn classify(&self) -> Classified<'_> {
        if self.kind() != EventKind::Message {
            return Classified::Ignored(format!("event type {}", self.event_type));
        }

        let Some(message) = self.message.as_ref() else {
            return Classified::Ignored("message event without message".into());
        };

        if message.msg_type != "text" {
            return Classified::Ignored(format!("message type {}", message.msg_type));
        }

        match (message.text.as_deref(), self.reply_token()) {
            (Some(text), Some(reply_token)) => Classified::Text { text, reply_token },
            (None, _) => Classified::Ignored("text message without text".into()),
            (_, None) => Classified::Ignored("text message without reply token".into()),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds a text message event, used across the webhook tests
    pub(crate) fn text_event(text: &str, reply_token: &str) -> Event {
        Event {
            event_type: "message".to_string(),
            mode: Some("active".to_string()),
            timestamp: Some(1_700_000_000_000),
            source: None,
            webhook_event_id: None,
            delivery_context: None,
            reply_token: Some(reply_token.to_string()),
            message: Some(EventMessage {
                id: Some("msg1".to_string()),
                msg_type: "text".to_string(),
                text: Some(text.to_string()),
            }),
        }
    }

    pub(crate) fn follow_event(reply_token: &str) -> Event {
        Event {
            event_type: "follow".to_string(),
            message: None,
            ..text_event("", reply_token)
        }
    }

    #[test]
    fn test_parse_line_delivery() {
        let json = r#"{
            "destination": "Uxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx",
            "events": [
                {
                    "type": "message",
                    "message": {"type": "text", "id": "14353798921116", "text": "Hello, world"},
                    "webhookEventId": "01FZ74A0TDDPYRVKNK77XKC3ZR",
                    "deliveryContext": {"isRedelivery": false},
                    "timestamp": 1625665242211,
                    "source": {"type": "user", "userId": "U80696558e1aa831d4e4b4f1b8e4a1b3c"},
                    "replyToken": "757913772c4646b784d4b7ce46d12671",
                    "mode": "active"
                },
                {
                    "type": "follow",
                    "timestamp": 1625665242214,
                    "source": {"type": "user", "userId": "Ufc729a925b3abef"},
                    "replyToken": "bb173f4d9cf64aed9d408ab4e36339ad",
                    "mode": "active",
                    "follow": {"isUnblocked": false}
                }
            ]
        }"#;

        let payload: WebhookPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.events.len(), 2);

        let message = &payload.events[0];
        assert_eq!(message.kind(), EventKind::Message);
        assert_eq!(
            message.webhook_event_id.as_deref(),
            Some("01FZ74A0TDDPYRVKNK77XKC3ZR")
        );
        assert!(!message.is_redelivery());
        assert_eq!(
            message.classify(),
            Classified::Text {
                text: "Hello, world",
                reply_token: "757913772c4646b784d4b7ce46d12671",
            }
        );

        assert_eq!(payload.events[1].kind(), EventKind::Follow);
        assert!(matches!(payload.events[1].classify(), Classified::Ignored(_)));
    }

    #[test]
    fn test_missing_events_is_empty_delivery() {
        let payload: WebhookPayload = serde_json::from_str(r#"{"destination":"U1"}"#).unwrap();
        assert!(payload.events.is_empty());
    }

    #[test]
    fn test_null_events_is_empty_delivery() {
        let payload: WebhookPayload = serde_json::from_str(r#"{"events":null}"#).unwrap();
        assert!(payload.events.is_empty());
    }

    #[test]
    fn test_incomplete_events_do_not_reject_delivery() {
        let json = r#"{"events":[
            {"type":"message","message":{"type":"text","text":"a"},"replyToken":"tok1"},
            {"type":"message","message":{"text":"b"},"replyToken":"tok2"},
            {"message":{"type":"text","text":"c"},"replyToken":"tok3"}
        ]}"#;

        let payload: WebhookPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.events.len(), 3);
        assert_eq!(
            payload.events[0].classify(),
            Classified::Text {
                text: "a",
                reply_token: "tok1"
            }
        );
        assert_eq!(
            payload.events[1].classify(),
            Classified::Ignored("message type ".into())
        );
        assert_eq!(payload.events[2].kind(), EventKind::Other(String::new()));
        assert!(matches!(payload.events[2].classify(), Classified::Ignored(_)));
    }

    #[test]
    fn test_undecodable_event_is_dropped() {
        let json = r#"{"events":[
            {"type":"message","timestamp":"yesterday","replyToken":"tok0"},
            42,
            {"type":"message","message":{"type":"text","text":"ok"},"replyToken":"tok1"}
        ]}"#;

        let payload: WebhookPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.events.len(), 1);
        assert_eq!(payload.events[0].reply_token(), Some("tok1"));
    }

    #[test]
    fn test_classify_non_text_message() {
        let mut event = text_event("ignored", "tok");
        event.message = Some(EventMessage {
            id: None,
            msg_type: "sticker".to_string(),
            text: None,
        });

        assert_eq!(
            event.classify(),
            Classified::Ignored("message type sticker".into())
        );
    }

    #[test]
    fn test_classify_text_without_reply_token() {
        let mut event = text_event("hello", "");
        assert!(matches!(event.classify(), Classified::Ignored(_)));

        event.reply_token = None;
        assert!(matches!(event.classify(), Classified::Ignored(_)));
    }

    #[test]
    fn test_unknown_event_kind_is_kept() {
        let event: Event =
            serde_json::from_str(r#"{"type":"memberJoined","replyToken":"tok"}"#).unwrap();
        assert_eq!(event.kind(), EventKind::Other("memberJoined".into()));
        assert_eq!(event.reply_token(), Some("tok"));
    }

    #[test]
    fn test_redelivery_flag() {
        let event: Event = serde_json::from_str(
            r#"{"type":"message","deliveryContext":{"isRedelivery":true}}"#,
        )
        .unwrap();
        assert!(event.is_redelivery());
        assert!(matches!(event.classify(), Classified::Ignored(_)));
    }
}

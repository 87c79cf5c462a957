//! # LINE Webhook Handler
//!
//! This module processes the events of a verified webhook delivery after the
//! acknowledgment was sent. Text messages go through the completion gateway
//! and the answer is sent back with the reply gateway; any other event is
//! logged and ignored.
//!
//! Every event is isolated: its failure is recovered with one best-effort
//! apology reply and never stops the events after it. Nothing here returns an
//! error to the caller, outcomes are only reported for logging and tests.

use super::{
    outgoing_schemas::ReplyPayload,
    schemas::{Classified, Event, WebhookPayload},
};
use crate::{
    config::AppConfig,
    consts,
    errors::DispatchError,
    services::{
        ImplCompletionGateway, ImplReplyGateway, dedup::RecentEvents, openai::CompletionRequest,
    },
};
use std::time::Duration;

/// Settings of the per-event pipeline, taken from [`AppConfig`]
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub model: String,
    pub max_tokens: u32,
    pub system_prompt: Option<String>,
    pub completion_timeout: Duration,
    pub concurrent: bool,
}

impl RelaySettings {
    pub fn from_config(app_config: &AppConfig) -> Self {
        Self {
            model: app_config.openai_model.clone(),
            max_tokens: app_config.openai_max_tokens,
            system_prompt: app_config.system_prompt().map(str::to_string),
            completion_timeout: app_config.openai_timeout(),
            concurrent: app_config.dispatch_concurrently,
        }
    }
}

/// Result of the best-effort apology sent after a failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackOutcome {
    Delivered,
    /// The event had no reply token
    Skipped,
    /// The apology failed too; only logged
    Failed(String),
}

/// What happened to one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Replied,
    Ignored,
    /// Already processed in an earlier delivery
    Duplicate,
    /// The pipeline failed and the fallback handler ran
    Recovered(FallbackOutcome),
}

/// Event dispatcher and fallback handler
pub struct Relay {
    completion: ImplCompletionGateway,
    reply: ImplReplyGateway,
    settings: RelaySettings,
    recent_events: Option<RecentEvents>,
}

impl Relay {
    pub fn new(
        completion: ImplCompletionGateway,
        reply: ImplReplyGateway,
        settings: RelaySettings,
    ) -> Self {
        Self {
            completion,
            reply,
            settings,
            recent_events: None,
        }
    }

    /// Skips events whose `webhookEventId` is among the last `capacity` processed
    pub fn with_deduplication(mut self, capacity: usize) -> Self {
        self.recent_events = Some(RecentEvents::new(capacity));
        self
    }

    /// Main webhook processor
    ///
    /// Processes every event of the delivery and returns their outcomes in
    /// delivery order.
    pub async fn process_webhook(&self, payload: WebhookPayload) -> Vec<EventOutcome> {
        if self.settings.concurrent {
            futures::future::join_all(payload.events.iter().map(|event| self.process_event(event)))
                .await
        } else {
            let mut outcomes = Vec::with_capacity(payload.events.len());
            for event in &payload.events {
                outcomes.push(self.process_event(event).await);
            }
            outcomes
        }
    }

    /// Processes one event, containing any failure
    pub async fn process_event(&self, event: &Event) -> EventOutcome {
        if let (Some(event_id), Some(recent)) =
            (event.webhook_event_id.as_deref(), &self.recent_events)
        {
            if !recent.first_time(event_id).await {
                logfire::info!(
                    "Skipping already processed event {event_id} (redelivery={redelivery})",
                    event_id = event_id.to_string(),
                    redelivery = event.is_redelivery()
                );
                return EventOutcome::Duplicate;
            }
        }

        let (text, reply_token) = match event.classify() {
            Classified::Text { text, reply_token } => (text, reply_token),
            Classified::Ignored(reason) => {
                logfire::info!("Unhandled event: {reason}", reason = reason);
                return EventOutcome::Ignored;
            }
        };

        match self.answer_text(text, reply_token).await {
            Ok(()) => EventOutcome::Replied,
            Err(e) => {
                logfire::error!("Event processing error: {error}", error = e.to_string());
                EventOutcome::Recovered(self.send_fallback(event).await)
            }
        }
    }

    /// Completion then reply for one text message
    async fn answer_text(&self, text: &str, reply_token: &str) -> Result<(), DispatchError> {
        let reply_text = self.generate_reply_text(text).await;

        self.reply
            .reply(&ReplyPayload::text(reply_token, reply_text))
            .await
            .map_err(|e| DispatchError::Reply(format!("{e:#}")))
    }

    /// Asks the completion gateway for an answer.
    ///
    /// Timeouts, upstream errors and responses without usable text all become
    /// the fixed apology so the user still gets a reply.
    async fn generate_reply_text(&self, text: &str) -> String {
        let request = CompletionRequest::single_turn(
            &self.settings.model,
            self.settings.system_prompt.as_deref(),
            text,
            self.settings.max_tokens,
        );

        let result =
            tokio::time::timeout(self.settings.completion_timeout, self.completion.complete(&request))
                .await;

        match result {
            Ok(Ok(response)) => match response.reply_text() {
                Some(reply_text) => reply_text.to_string(),
                None => {
                    logfire::warn!("Completion response had no usable text");
                    consts::APOLOGY_NO_ANSWER.to_string()
                }
            },
            Ok(Err(e)) => {
                logfire::error!("Completion request failed: {error}", error = format!("{e:#}"));
                consts::APOLOGY_NO_ANSWER.to_string()
            }
            Err(_) => {
                logfire::error!(
                    "Completion request timed out after {secs}s",
                    secs = self.settings.completion_timeout.as_secs() as i64
                );
                consts::APOLOGY_NO_ANSWER.to_string()
            }
        }
    }

    /// Sends one "please try later" reply for a failed event.
    ///
    /// Fire-and-forget: a failure here is logged and swallowed.
    pub async fn send_fallback(&self, event: &Event) -> FallbackOutcome {
        let Some(reply_token) = event.reply_token() else {
            return FallbackOutcome::Skipped;
        };

        let payload = ReplyPayload::text(reply_token, consts::APOLOGY_ERROR_TRY_LATER);
        match self.reply.reply(&payload).await {
            Ok(()) => FallbackOutcome::Delivered,
            Err(e) => {
                let error = format!("{e:#}");
                logfire::error!("Failed to send fallback reply: {error}", error = error.clone());
                FallbackOutcome::Failed(error)
            }
        }
    }
}

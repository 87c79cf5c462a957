//! # LINE API Client
//!
//! This module provides a client for the LINE Messaging API reply endpoint.
//! It handles authentication and the reply call for text messages.

use super::outgoing_schemas::{LineErrorResponse, ReplyPayload};
use crate::{config::AppConfig, services::ReplyGateway};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

/// LINE API client for replying to webhook events
pub struct LineClient {
    /// HTTP client for making API requests
    client: reqwest::Client,
    /// Reply API endpoint
    endpoint: String,
    /// Channel access token
    access_token: String,
    /// Upper bound for one reply call
    timeout: Duration,
}

impl LineClient {
    /// Creates a new LINE client from the application configuration
    pub fn new(client: reqwest::Client, app_config: &AppConfig) -> Self {
        Self {
            client,
            endpoint: app_config.line_reply_url.clone(),
            access_token: app_config.line_access_token.clone(),
            timeout: app_config.line_reply_timeout(),
        }
    }
}

#[async_trait]
impl ReplyGateway for LineClient {
    #[tracing::instrument(skip_all, fields(messages = payload.messages.len()))]
    async fn reply(&self, payload: &ReplyPayload) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.access_token)
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .json(payload)
            .send()
            .await
            .context("Failed to send request to LINE reply API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());

            // LINE describes failures as {"message", "details"}
            let reason = serde_json::from_str::<LineErrorResponse>(&body)
                .map(|error| error.to_string())
                .unwrap_or(body);

            anyhow::bail!("LINE reply API returned error status {}: {}", status, reason);
        }

        Ok(())
    }
}

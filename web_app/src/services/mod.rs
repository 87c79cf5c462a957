pub mod dedup;
pub mod openai;

use crate::webhook::line::outgoing_schemas::ReplyPayload;
use async_trait::async_trait;
use openai::{CompletionRequest, CompletionResponse};
use std::sync::Arc;

/// Text-completion backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<CompletionResponse>;
}

/// Messaging platform reply API
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReplyGateway: Send + Sync {
    /// Sends `payload`; the reply token inside it is consumed by the platform.
    async fn reply(&self, payload: &ReplyPayload) -> anyhow::Result<()>;
}

pub type ImplCompletionGateway = Arc<dyn CompletionGateway>;
pub type ImplReplyGateway = Arc<dyn ReplyGateway>;

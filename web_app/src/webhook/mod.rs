//! Webhook handlers for external integrations
//!
//! ## Modules
//!
//! - [`line`] - LINE Messaging API webhook relayed to a chat completion API

pub mod line;
pub mod routes;

use crate::config::AppConfig;
use line::handler::Relay;
use std::sync::Arc;

/// State shared by the webhook routes of every worker
pub struct AppState {
    /// Read-only configuration, built once at startup
    pub config: Arc<AppConfig>,
    /// Event dispatcher, cloned into each delivery's task
    pub relay: Arc<Relay>,
}

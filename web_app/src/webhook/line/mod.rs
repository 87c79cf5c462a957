//! LINE webhook integration module
//!
//! This module provides webhook handling for the LINE Messaging API.
//! It includes both the HTTP route handlers and the relay logic that answers
//! incoming text messages with a chat completion.
//!
//! ## Submodules
//!
//! - [`security`] - `X-Line-Signature` verification over the raw body
//! - [`routes`] - HTTP endpoint handlers (verification, acknowledgment, spawn)
//! - [`handler`] - Event dispatcher and fallback handler
//! - [`schemas`] - Incoming webhook payloads
//! - [`outgoing_schemas`] - Reply API payloads
//! - [`client`] - LINE reply API client

pub mod client;
pub mod handler;
pub mod outgoing_schemas;
pub mod routes;
pub mod schemas;
pub mod security;

// Re-export commonly used items for convenience
pub use routes::{health, receive};

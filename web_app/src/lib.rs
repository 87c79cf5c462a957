//! # LINE GPT Relay
//!
//! Receives LINE Messaging API webhooks, verifies their signature, answers
//! each text message with an OpenAI chat completion and sends the answer back
//! through the LINE reply API.

pub mod config;
pub mod consts;
pub mod errors;
pub mod logger;
pub mod services;
pub mod webhook;

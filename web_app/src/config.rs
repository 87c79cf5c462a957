//! Application configuration with security considerations.
//!
//! The configuration is read from the environment once at startup and then
//! shared read-only (behind an `Arc`) with the webhook routes and the relay.
//!
//! # Security Notes
//! - Sensitive fields are clearly marked and should never be logged
//! - Production environments should use secure secret management systems

use envconfig::Envconfig;
use std::time::Duration;

use crate::consts;

/// Relay configuration.
///
/// Credentials default to empty strings so a half-configured deployment still
/// starts; [`AppConfig::missing_credentials`] reports what is absent.
#[derive(Envconfig, Clone)]
pub struct AppConfig {
    /// Environment name to deploy the app (NON-SENSITIVE)
    /// Values: "local", "dev", "staging", "prod"
    #[envconfig(from = "ENV", default = "local")]
    pub env: String,

    /// Host address for web server binding (NON-SENSITIVE)
    #[envconfig(from = "HOST", default = "0.0.0.0")]
    pub host: String,

    /// Port for web server binding (NON-SENSITIVE)
    #[envconfig(from = "PORT", default = "3000")]
    pub port: u16,

    /// Path to SSL private key file, used only in prod (SENSITIVE PATH)
    #[envconfig(from = "PRIVATE_KEY_PATH", default = "server.key")]
    pub private_key_path: String,

    /// Path to SSL certificate file, used only in prod (NON-SENSITIVE)
    #[envconfig(from = "CERTIFICATE_PATH", default = "server.crt")]
    pub certificate_path: String,

    /// 🔒 SENSITIVE: LINE channel secret, key of the `X-Line-Signature` HMAC
    #[envconfig(from = "LINE_CHANNEL_SECRET", default = "")]
    pub line_channel_secret: String,

    /// 🔒 SENSITIVE: LINE channel access token for the reply API
    #[envconfig(from = "LINE_ACCESS_TOKEN", default = "")]
    pub line_access_token: String,

    /// LINE reply API endpoint (NON-SENSITIVE)
    #[envconfig(from = "LINE_REPLY_URL", default = "https://api.line.me/v2/bot/message/reply")]
    pub line_reply_url: String,

    /// Upper bound for a reply API call, in seconds
    #[envconfig(from = "LINE_REPLY_TIMEOUT_SECS", default = "10")]
    pub line_reply_timeout_secs: u64,

    /// 🔒 SENSITIVE: OpenAI API key
    #[envconfig(from = "OPENAI_API_KEY", default = "")]
    pub openai_api_key: String,

    /// Chat completions endpoint (NON-SENSITIVE)
    #[envconfig(
        from = "OPENAI_CHAT_COMPLETIONS_URL",
        default = "https://api.openai.com/v1/chat/completions"
    )]
    pub openai_chat_completions_url: String,

    /// Model identifier sent with every completion request
    #[envconfig(from = "OPENAI_MODEL", default = "gpt-4o-mini")]
    pub openai_model: String,

    /// `max_tokens` sent with every completion request
    #[envconfig(from = "OPENAI_MAX_TOKENS", default = "800")]
    pub openai_max_tokens: u32,

    /// Upper bound for a completion call, in seconds
    #[envconfig(from = "OPENAI_TIMEOUT_SECS", default = "30")]
    pub openai_timeout_secs: u64,

    /// Optional system instruction prepended to every prompt
    #[envconfig(from = "SYSTEM_PROMPT")]
    pub system_prompt: Option<String>,

    /// Process the events of one delivery concurrently instead of in order
    #[envconfig(from = "DISPATCH_CONCURRENTLY", default = "false")]
    pub dispatch_concurrently: bool,

    /// Skip events whose `webhookEventId` was already processed
    #[envconfig(from = "DEDUPLICATE_EVENTS", default = "true")]
    pub deduplicate_events: bool,

    /// How many recent event ids are remembered for deduplication
    #[envconfig(from = "DEDUPLICATION_CAPACITY", default = "1024")]
    pub deduplication_capacity: usize,

    /// 🔒 SENSITIVE: Logfire write token, logs stay local when empty
    #[envconfig(from = "LOGFIRE_TOKEN", default = "")]
    pub logfire_token: String,
}

impl AppConfig {
    /// Checks if running in production environment
    pub fn is_prod(&self) -> bool {
        self.env.to_lowercase() == "prod"
    }

    /// Names of the credential variables that are unset or blank.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        [
            ("LINE_CHANNEL_SECRET", &self.line_channel_secret),
            ("LINE_ACCESS_TOKEN", &self.line_access_token),
            ("OPENAI_API_KEY", &self.openai_api_key),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn openai_timeout(&self) -> Duration {
        Duration::from_secs(self.openai_timeout_secs)
    }

    pub fn line_reply_timeout(&self) -> Duration {
        Duration::from_secs(self.line_reply_timeout_secs)
    }

    /// System prompt with blank values treated as unset
    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt
            .as_deref()
            .map(str::trim)
            .filter(|prompt| !prompt.is_empty())
    }

    /// Logs a warning for every missing credential.
    ///
    /// Startup continues: a missing channel secret only means every delivery
    /// is rejected, missing tokens mean the upstream calls fail and fall back.
    pub fn warn_missing_credentials(&self) {
        let missing = self.missing_credentials();
        if missing.is_empty() {
            return;
        }

        logfire::warn!(
            "Missing environment variables: {missing}. Please set {expected}",
            missing = missing.join(", "),
            expected = consts::REQUIRED_CREDENTIALS.join(", ")
        );
    }
}

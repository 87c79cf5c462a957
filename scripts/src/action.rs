use clap::{Args, Parser, Subcommand};

use crate::{config, delivery};
use line_gpt_relay::{consts, webhook::line::security};

#[derive(Args, Debug, Clone)]
pub struct SignArgs {
    /// File holding the exact webhook body to sign
    #[arg(short, long)]
    file: String,
}

#[derive(Args, Debug, Clone)]
pub struct SendTextArgs {
    /// Webhook URL of a running relay
    #[arg(short, long, default_value = "http://localhost:3000/webhook")]
    url: String,
    /// Text of the user message
    #[arg(short, long)]
    text: String,
    #[arg(short, long, default_value = "test-reply-token")]
    reply_token: String,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Action {
    /// Prints the X-Line-Signature of a body file
    Sign(SignArgs),
    /// Posts a signed one-message delivery to a relay
    SendText(SendTextArgs),
}

/// Tools to exercise a LINE GPT relay locally
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct AppArgs {
    #[command(subcommand)]
    pub action: Action,
}

impl AppArgs {
    pub async fn run(&self) -> anyhow::Result<()> {
        let secret = config::APP_CONFIG.line_channel_secret.as_bytes();

        match &self.action {
            Action::Sign(SignArgs { file }) => {
                let body = tokio::fs::read(file).await?;
                println!("{}", security::compute_signature(&body, secret));
                Ok(())
            }
            Action::SendText(SendTextArgs {
                url,
                text,
                reply_token,
            }) => {
                let body = delivery::text_delivery(text, reply_token)?;
                let signature = security::compute_signature(&body, secret);

                let response = reqwest::Client::new()
                    .post(url)
                    .header(consts::LINE_SIGNATURE_HEADER, signature)
                    .header("content-type", "application/json")
                    .body(body)
                    .send()
                    .await?;

                println!("{} {}", response.status(), response.text().await?);
                Ok(())
            }
        }
    }
}

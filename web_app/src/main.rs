//! # LINE GPT Relay
//!
//! Main entry point: loads the configuration, sets up logging, builds the
//! gateway clients and serves the webhook.

use envconfig::Envconfig;
use line_gpt_relay::{
    config::AppConfig,
    logger,
    services::{ImplCompletionGateway, ImplReplyGateway, openai::OpenAiClient},
    webhook::{
        self, AppState,
        line::{
            client::LineClient,
            handler::{Relay, RelaySettings},
        },
    },
};
use logfire::config::SendToLogfire;
use ntex::web;
use openssl::ssl::{SslAcceptor, SslFiletype, SslMethod};
use std::sync::Arc;

#[ntex::main]
async fn main() -> anyhow::Result<()> {
    // Initialize configuration
    let app_config = Arc::new(AppConfig::init_from_env()?);

    // Initialize logging
    let logfire_config = logfire::configure()
        .install_panic_handler()
        .send_to_logfire(SendToLogfire::IfTokenPresent);
    let shutdown_handler = if app_config.logfire_token.trim().is_empty() {
        logfire_config.finish()?
    } else {
        logfire_config.with_token(&app_config.logfire_token).finish()?
    };
    if let Err(e) = logger::setup_simple_logger() {
        logfire::warn!(
            "stdout logger not installed: {error}",
            error = e.to_string()
        );
    }

    app_config.warn_missing_credentials();

    let relay = Arc::new(build_relay(&app_config));

    configure_and_run_server(app_config, relay).await?;

    shutdown_handler.shutdown()?;

    Ok(())
}

/// Builds the relay core on top of the OpenAI and LINE clients
fn build_relay(app_config: &AppConfig) -> Relay {
    let http_client = reqwest::Client::new();

    let completion: ImplCompletionGateway =
        Arc::new(OpenAiClient::new(http_client.clone(), app_config));
    let reply: ImplReplyGateway = Arc::new(LineClient::new(http_client, app_config));

    let relay = Relay::new(completion, reply, RelaySettings::from_config(app_config));
    if app_config.deduplicate_events {
        return relay.with_deduplication(app_config.deduplication_capacity);
    }
    relay
}

/// Configures SSL acceptor for production environments
fn setup_ssl_acceptor(app_config: &AppConfig) -> anyhow::Result<openssl::ssl::SslAcceptorBuilder> {
    let mut ssl_acceptor = SslAcceptor::mozilla_intermediate(SslMethod::tls_server())
        .map_err(|e| anyhow::anyhow!("Failed to create SSL acceptor: {}", e))?;

    ssl_acceptor
        .set_private_key_file(&app_config.private_key_path, SslFiletype::PEM)
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to load private key from {}: {}",
                app_config.private_key_path,
                e
            )
        })?;

    ssl_acceptor
        .set_certificate_file(&app_config.certificate_path, SslFiletype::PEM)
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to load certificate from {}: {}",
                app_config.certificate_path,
                e
            )
        })?;

    Ok(ssl_acceptor)
}

/// Configures and starts the web server with appropriate SSL settings
async fn configure_and_run_server(
    app_config: Arc<AppConfig>,
    relay: Arc<Relay>,
) -> anyhow::Result<()> {
    let server_addr = (app_config.host.clone(), app_config.port);
    let is_prod = app_config.is_prod();

    let state_config = app_config.clone();
    let server = web::server(move || {
        web::App::new()
            .wrap(web::middleware::Logger::default())
            .state(AppState {
                config: state_config.clone(),
                relay: relay.clone(),
            })
            .configure(webhook::routes::line)
    });

    let bound_server = if is_prod {
        let ssl_acceptor = setup_ssl_acceptor(&app_config)?;
        server.bind_openssl(server_addr, ssl_acceptor)?
    } else {
        server.bind(server_addr)?
    };

    logfire::info!(
        "Server started on port {port}",
        port = i64::from(app_config.port)
    );

    bound_server
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}

//! datachat - terminal client for a natural-language-to-SQL backend
//!
//! Keeps the chat conversation locally and forwards each question to the
//! backend over HTTP.

mod api;
mod config;
mod console;
mod conversation;
mod datasources;
mod runtime;

use api::{HttpBackend, LoggingBackend, QueryClient};
use config::ClientConfig;
use conversation::Conversation;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging; stderr keeps logs out of the transcript
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "datachat=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Configuration, fixed for the whole session
    let config = ClientConfig::from_env()?;
    tracing::info!(
        base_url = %config.base_url,
        tenant = ?config.tenant_id,
        "Backend configured"
    );

    let backend = LoggingBackend::new(HttpBackend::new(&config)?);
    let client = Arc::new(QueryClient::new(backend, &config));

    let (session, events) =
        runtime::spawn_session(client.clone(), Conversation::with_greeting(console::GREETING));

    println!("{}", console::HELP);

    let stdin = BufReader::new(tokio::io::stdin());
    console::run(stdin, &mut std::io::stdout(), client.as_ref(), session, events).await?;

    tracing::info!("Exiting");
    Ok(())
}

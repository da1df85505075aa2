//! chat-relay HTTP Server
//!
//! Loads configuration, builds the inference client and serves the API.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use relay_core::{ConversationStore, Relay};
use relay_server::{AppState, ServerConfig, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment first so RUST_LOG from .env applies
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    // Initialize inference client
    let client = relay_runtime::build(config.provider, config.inference_timeout)
        .await
        .with_context(|| format!("failed to initialize {} provider", config.provider))?;
    tracing::info!(
        provider = client.name(),
        timeout_secs = config.inference_timeout.as_secs(),
        "Inference client configured"
    );

    let store = Arc::new(ConversationStore::new());
    let relay = Relay::new(client, Arc::clone(&store), config.relay_config());
    let app = router(AppState::new(relay));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("chat-relay listening on http://{}", config.bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET    /api/health             - Health check");
    tracing::info!("  POST   /api/chat               - Send message");
    tracing::info!("  GET    /api/conversations      - List conversations");
    tracing::info!("  GET    /api/conversations/{{id}} - Conversation history");
    tracing::info!("  DELETE /api/conversations/{{id}} - Clear conversation");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if !store.is_empty() {
        tracing::info!(conversations = store.len(), "Discarding in-memory conversations");
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        // Keep serving; the process can still be killed.
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

// Entry point for the signature webhook server

use std::sync::Arc;

use anyhow::{Context, Result};
use server_core::domains::fee_agreements::webhook::{router, WebhookState};
use server_core::kernel::HttpSignatureEventSink;
use server_core::WebhookConfig;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting signature webhook server");

    let config = WebhookConfig::from_env().context("Failed to load configuration")?;
    tracing::info!(
        secrets = config.hmac_secrets.len(),
        forward_url = %config.forward_url,
        "Configuration loaded"
    );

    let state = WebhookState {
        secrets: Arc::new(config.hmac_secrets),
        sink: Arc::new(HttpSignatureEventSink::new(config.forward_url)),
    };
    let app = router(state).layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

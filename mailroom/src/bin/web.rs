//! Mailroom web server.
//!
//! Serves the send endpoint, the signed webhook receivers and the double
//! opt-in endpoints on `0.0.0.0:$PORT`.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mailroom::{router, AppState, Client, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("web_server_starting");

    let config = Config::from_env();
    info!(
        port = config.port,
        api_base_url = %config.api_base_url,
        audience_configured = config.audience_id.is_some(),
        webhook_secret_configured = config.webhook_secret.is_some(),
        webhook_max_body_bytes = config.webhook_max_body_bytes,
        "config_loaded"
    );

    let client = Client::from_config(&config).context("Failed to create API client")?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = router(AppState::new(config, client));

    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "web_server_listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("web_server_shutdown_complete");

    Ok(())
}

/// Completes on SIGINT or SIGTERM. If a handler cannot be installed that
/// signal is never observed.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "sigint_handler_failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "sigterm_handler_failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("web_server_shutting_down");
}

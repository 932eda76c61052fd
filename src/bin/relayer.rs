//! Trade Relayer binary.

use std::sync::Arc;
use trade_relayer::{create_router, AppState, Config};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Trade Relayer");

    let config: Config = config::Config::builder()
        .add_source(config::File::with_name("relayer").required(false))
        .add_source(config::Environment::with_prefix("RELAYER"))
        .build()
        .and_then(|c| c.try_deserialize())
        .unwrap_or_else(|e| {
            // Fall back only when no config exists; parsing errors fail hard.
            let err_str = format!("{e}");
            if err_str.contains("not found") || err_str.contains("missing field") {
                warn!(error = %e, "No config file found, using defaults");
                Config::default()
            } else {
                error!(error = %e, "FATAL: Config error — fix env vars or relayer.toml");
                std::process::exit(1);
            }
        });

    if std::env::var("RELAYER_API_KEY")
        .map(|k| !k.is_empty())
        .unwrap_or(false)
    {
        info!("API key auth enabled");
    } else {
        warn!("RELAYER_API_KEY not set — /execute-trade is unprotected (dev mode)");
    }

    info!(contract = %config.contract_address, rpc = %config.rpc_url, "Configuration loaded");

    let bind_address = config.bind_address.clone();
    let state = Arc::new(AppState::new(config).await?);

    info!(
        signer = %format!("{:#x}", state.eth.signer_address()),
        chain_id = state.eth.chain_id(),
        "Relayer ready"
    );

    let app = create_router(state);

    info!(address = %bind_address, "Listening");

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Relayer shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}

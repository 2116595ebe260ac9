//! Mentor chat relay server binary.
//!
//! Serves the chat API, runs the idle-session sweeper, and clears every
//! session on shutdown.

use std::sync::Arc;

use clap::Parser;
use mentor_core::ChatRelay;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// CLI arguments for the chat relay server.
#[derive(Parser, Debug)]
#[command(name = "mentor_api_server", about = "Mentor chat relay server")]
struct Args {
    /// Host to bind to.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on (0 = ephemeral).
    #[arg(long, env = "PORT", default_value_t = 8000)]
    port: u16,

    /// Run in production mode: error responses omit internal details.
    #[arg(long, default_value_t = false)]
    production: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new("info,mentor_api=debug,mentor_core=debug")
                }),
        )
        .init();

    let args = Args::parse();

    let mut config = mentor_api::config::ApiConfig::from_env();
    config.bind_addr = format!("{}:{}", args.host, args.port);
    if args.production {
        config.expose_error_details = false;
    }

    let model = mentor_core::model::from_env(config.provider)?;
    info!(
        model = model.name(),
        provider = ?config.provider,
        timeout = ?config.relay.request_timeout,
        idle_ttl = ?config.relay.session_idle_ttl,
        "starting mentor_api_server"
    );
    if !config.expose_error_details {
        info!("production mode: error details suppressed");
    }

    let relay = Arc::new(ChatRelay::new(model, config.relay.clone()));

    let cancel = CancellationToken::new();
    let sweeper = relay.spawn_idle_sweeper(cancel.clone());

    let state = mentor_api::AppState {
        relay: Arc::clone(&relay),
        config: config.clone(),
    };
    let app = mentor_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, "REST API listening");
    info!("health check: http://{local_addr}/api/health");

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await;

    cancel.cancel();
    if let Some(handle) = sweeper {
        let _ = handle.await;
    }

    let cleared = relay.clear_all();
    info!(cleared, "shutting down, chat sessions cleared");

    result?;

    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM, or when `cancel` fires.
async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
        _ = cancel.cancelled() => {},
    }
    info!("shutdown signal received");
}

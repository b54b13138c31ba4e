use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::serve;
use event_collector::{config::log_level_from_env, create_router, ApiState, CollectorConfig};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(&log_level_from_env());
    let config = CollectorConfig::from_env().context("failed to load configuration")?;

    info!(
        output = %config.batch_output_file.display(),
        source_config = %config.source_config_path.display(),
        "event-collector starting"
    );

    let addr: SocketAddr = config
        .listen_addr()
        .parse()
        .context("invalid server bind address")?;

    let state = Arc::new(ApiState::new(config).context("failed to build collector state")?);
    if let Some(filter) = &state.filter {
        info!(
            disposition = %filter.rule().disposition,
            denylist = filter.rule().denylist.len(),
            prefix = ?filter.rule().prefix,
            "deny rule loaded"
        );
    }

    let router = create_router(Arc::clone(&state));

    let listener = TcpListener::bind(addr)
        .await
        .context("failed to bind TCP listener")?;
    let local_addr = listener
        .local_addr()
        .context("failed to read bound address")?;
    info!(%local_addr, "event-collector listening");

    serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server encountered an unrecoverable error")?;

    info!("event-collector shutdown complete");
    Ok(())
}

fn init_tracing(log_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}

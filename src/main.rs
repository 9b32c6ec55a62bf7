// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use menu_server::{
    api::router,
    config::{Config, LogFormat, DEFAULT_LOG_FILTER, LOG_FORMAT_ENV, MIGRATE_ENV},
    state::AppState,
    storage::ItemStore,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        tracing::error!("Menu server failed: {e}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let format = std::env::var(LOG_FORMAT_ENV)
        .ok()
        .and_then(|v| v.parse::<LogFormat>().ok())
        .unwrap_or_default();

    match format {
        LogFormat::Json => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    tracing::info!(
        database = %config.database_path.display(),
        jwks_url = %config.jwks_url,
        migration = ?config.migration,
        "Loaded configuration"
    );

    let store = ItemStore::open(&config.database_path)?;
    store.apply_migration(config.migration)?;
    if !store.is_ready() {
        tracing::warn!("Item tables are missing; start once with {MIGRATE_ENV}=create");
    }

    let auth = config.auth_config()?;
    if let Err(e) = auth.jwks.refresh().await {
        // Not fatal: keys are fetched again on the first gated request.
        tracing::warn!(error = %e, "Could not prefetch JWKS");
    }

    let app = router(AppState::new(store, auth));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Menu server listening on http://{} (docs at /docs)", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Menu server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}

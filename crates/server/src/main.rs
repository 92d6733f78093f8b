mod api;
mod bootstrap;
mod forms;
mod health;
mod notifier;
mod pages;
mod state;

use std::time::Duration;

use anyhow::Result;
use econnect_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use econnect_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;

    let refresh_secs = app.config.zonal.refresh_interval_secs;
    if refresh_secs > 0 {
        econnect_erp::spawn_refresh(
            app.state.directory.clone(),
            app.state.erp.clone(),
            Duration::from_secs(refresh_secs),
        );
        tracing::info!(
            event_name = "system.server.zonal_refresh_enabled",
            correlation_id = "bootstrap",
            interval_secs = refresh_secs,
            "periodic zonal map refresh enabled"
        );
    }

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    let router = state::router(app.state, &app.config);

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        "econnect-server listening"
    );
    axum::serve(listener, router).with_graceful_shutdown(wait_for_shutdown()).await?;
    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "econnect-server stopping"
    );

    Ok(())
}

async fn wait_for_shutdown() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(
            event_name = "system.server.signal_error",
            correlation_id = "shutdown",
            error = %error,
            "could not listen for shutdown signal"
        );
    }
}

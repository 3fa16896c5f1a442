mod bootstrap;
mod console;
mod health;

use anyhow::Result;
use bootstrap::BootstrapError;
use plandesk_core::config::{AppConfig, LoadOptions};
use plandesk_core::errors::ApplicationError;

fn init_logging(config: &AppConfig) {
    use plandesk_core::config::LogFormat::*;
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
    // Logging needs the loaded config, so it comes up before bootstrap
    let config = AppConfig::load(LoadOptions::default())
        .map_err(|error| ApplicationError::from(BootstrapError::from(error)))?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).map_err(ApplicationError::from)?;

    let router = console::router(app.agent_runtime.clone(), bootstrap::powered_by(&app.config))
        .merge(health::router(app.chat_endpoint.clone()));

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        "plandesk-server listening"
    );
    axum::serve(listener, router).with_graceful_shutdown(wait_for_shutdown()).await?;
    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "plandesk-server stopping"
    );

    Ok(())
}

async fn wait_for_shutdown() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(
            event_name = "system.server.signal_error",
            correlation_id = "shutdown",
            error = %error,
            "failed to listen for shutdown signal"
        );
    }
}

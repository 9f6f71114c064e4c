mod bootstrap;

use anyhow::Result;
use welcomebot_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use tracing::Level;
    use welcomebot_core::config::LogFormat::*;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt()
                .with_target(false)
                .with_file(true)
                .with_line_number(true)
                .with_max_level(log_level)
                .json()
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Tokens are validated here; a missing or mis-prefixed one aborts startup.
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config)?;

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        api_base_url = %app.config.slack.api_base_url,
        max_retries = app.config.socket.max_retries,
        "welcomebot started"
    );

    tokio::select! {
        result = app.slack_runner.start() => result?,
        result = wait_for_shutdown() => result?,
    }

    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "welcomebot stopping"
    );

    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}

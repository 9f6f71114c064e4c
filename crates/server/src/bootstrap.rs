use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use welcomebot_core::{
    config::AppConfig,
    templates::{TemplateError, TemplateRenderer},
};
use welcomebot_slack::{
    api::SlackWebClient,
    events::welcome_dispatcher,
    socket::{ReconnectPolicy, SocketModeRunner},
    transport::WebSocketTransport,
};

pub struct Application {
    pub config: AppConfig,
    pub slack_runner: SocketModeRunner,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("welcome templates failed to compile: {0}")]
    Templates(#[source] TemplateError),
    #[error("slack http client could not be built: {0}")]
    HttpClient(#[source] reqwest::Error),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let renderer = Arc::new(TemplateRenderer::new().map_err(BootstrapError::Templates)?);
    info!(
        event_name = "system.bootstrap.templates_compiled",
        correlation_id = "bootstrap",
        "welcome templates compiled"
    );

    let client =
        Arc::new(SlackWebClient::new(&config.slack).map_err(BootstrapError::HttpClient)?);
    let transport = Arc::new(WebSocketTransport::new(client.clone()));
    let dispatcher = welcome_dispatcher(client, renderer);
    let reconnect_policy = ReconnectPolicy {
        max_retries: config.socket.max_retries,
        base_delay_ms: config.socket.base_delay_ms,
        max_delay_ms: config.socket.max_delay_ms,
    };

    Ok(Application {
        slack_runner: SocketModeRunner::new(transport, dispatcher, reconnect_policy),
        config,
    })
}

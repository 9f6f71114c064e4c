//! Slack Web API calls used by the bot.
//!
//! `chat.postEphemeral`, `chat.postMessage` and `conversations.open` go out
//! with the bot token; `apps.connections.open` uses the app-level token and
//! hands back the Socket Mode WebSocket URL.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info};
use welcomebot_core::config::SlackConfig;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageReceipt {
    pub channel_id: String,
    pub ts: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// Channel post visible only to `user_id`.
    Ephemeral { channel_id: String, user_id: String },
    /// Regular post, used for DM conversations.
    Direct { channel_id: String },
}

impl Delivery {
    pub fn is_ephemeral(&self) -> bool {
        matches!(self, Self::Ephemeral { .. })
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("slack api `{method}` failed: {error}")]
    Slack { method: &'static str, error: String },
    #[error("slack api `{method}` request failed: {source}")]
    Http {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("slack api `{method}` response is missing `{field}`")]
    MissingField { method: &'static str, field: &'static str },
}

#[async_trait]
pub trait SlackApi: Send + Sync {
    /// Opens (or reuses) a DM with `user_id` and returns its channel id.
    async fn open_conversation(&self, user_id: &str) -> Result<String, ApiError>;
    async fn post_ephemeral(
        &self,
        channel_id: &str,
        user_id: &str,
        text: &str,
    ) -> Result<MessageReceipt, ApiError>;
    async fn post_message(&self, channel_id: &str, text: &str) -> Result<MessageReceipt, ApiError>;
}

pub async fn send(
    api: &dyn SlackApi,
    delivery: &Delivery,
    text: &str,
) -> Result<MessageReceipt, ApiError> {
    let receipt = match delivery {
        Delivery::Ephemeral { channel_id, user_id } => {
            api.post_ephemeral(channel_id, user_id, text).await?
        }
        Delivery::Direct { channel_id } => api.post_message(channel_id, text).await?,
    };

    info!(
        event_name = "egress.slack.message_sent",
        channel_id = %receipt.channel_id,
        ts = %receipt.ts,
        ephemeral = delivery.is_ephemeral(),
        "message successfully sent"
    );
    Ok(receipt)
}

#[derive(Debug, Default, Deserialize)]
struct ApiResponse {
    ok: bool,
    error: Option<String>,
    url: Option<String>,
    channel: Option<ChannelField>,
    ts: Option<String>,
    message_ts: Option<String>,
}

/// `chat.*` returns the channel as a bare id, `conversations.open` as an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChannelField {
    Id(String),
    Object { id: String },
}

impl ChannelField {
    fn into_id(self) -> String {
        match self {
            Self::Id(id) | Self::Object { id } => id,
        }
    }
}

pub struct SlackWebClient {
    http: reqwest::Client,
    base_url: String,
    app_token: SecretString,
    bot_token: SecretString,
}

impl SlackWebClient {
    pub fn new(config: &SlackConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_owned(),
            app_token: config.app_token.clone(),
            bot_token: config.bot_token.clone(),
        })
    }

    /// Requests a fresh Socket Mode URL. Each URL is single-use.
    pub async fn open_socket_url(&self) -> Result<String, ApiError> {
        const METHOD: &str = "apps.connections.open";
        let response = self.call(METHOD, &self.app_token, None).await?;
        response.url.ok_or(ApiError::MissingField { method: METHOD, field: "url" })
    }

    async fn call(
        &self,
        method: &'static str,
        token: &SecretString,
        body: Option<Value>,
    ) -> Result<ApiResponse, ApiError> {
        let mut request = self
            .http
            .post(format!("{}/{method}", self.base_url))
            .bearer_auth(token.expose_secret());
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|source| ApiError::Http { method, source })?;
        let payload: ApiResponse =
            response.json().await.map_err(|source| ApiError::Http { method, source })?;

        check_ok(method, payload)
    }
}

fn check_ok(method: &'static str, payload: ApiResponse) -> Result<ApiResponse, ApiError> {
    if payload.ok {
        debug!(method, "slack api call succeeded");
        return Ok(payload);
    }

    Err(ApiError::Slack {
        method,
        error: payload.error.unwrap_or_else(|| "unknown".to_owned()),
    })
}

fn receipt_from(
    method: &'static str,
    payload: ApiResponse,
    requested_channel: &str,
) -> Result<MessageReceipt, ApiError> {
    let ts = payload
        .ts
        .or(payload.message_ts)
        .ok_or(ApiError::MissingField { method, field: "ts" })?;
    let channel_id =
        payload.channel.map(ChannelField::into_id).unwrap_or_else(|| requested_channel.to_owned());

    Ok(MessageReceipt { channel_id, ts })
}

#[async_trait]
impl SlackApi for SlackWebClient {
    async fn open_conversation(&self, user_id: &str) -> Result<String, ApiError> {
        const METHOD: &str = "conversations.open";
        let response =
            self.call(METHOD, &self.bot_token, Some(json!({ "users": user_id }))).await?;
        response
            .channel
            .map(ChannelField::into_id)
            .ok_or(ApiError::MissingField { method: METHOD, field: "channel.id" })
    }

    async fn post_ephemeral(
        &self,
        channel_id: &str,
        user_id: &str,
        text: &str,
    ) -> Result<MessageReceipt, ApiError> {
        const METHOD: &str = "chat.postEphemeral";
        let body = json!({ "channel": channel_id, "user": user_id, "text": text });
        let response = self.call(METHOD, &self.bot_token, Some(body)).await?;
        receipt_from(METHOD, response, channel_id)
    }

    async fn post_message(&self, channel_id: &str, text: &str) -> Result<MessageReceipt, ApiError> {
        const METHOD: &str = "chat.postMessage";
        let body = json!({ "channel": channel_id, "text": text });
        let response = self.call(METHOD, &self.bot_token, Some(body)).await?;
        receipt_from(METHOD, response, channel_id)
    }
}

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, error, info, trace, warn};

use crate::events::{EventContext, EventDispatcher, HandlerResult, SlackEnvelope, SlackEvent};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport failed to connect: {0}")]
    Connect(String),
    #[error("transport read failed: {0}")]
    Receive(String),
    #[error("transport ack failed: {0}")]
    Acknowledge(String),
    #[error("transport disconnect failed: {0}")]
    Disconnect(String),
    /// The server ended the session (refresh, close frame); reconnecting is expected.
    #[error("server closed the session: {0}")]
    Disconnected(String),
}

#[derive(Debug, Error)]
pub enum SocketError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("socket mode gave up after {attempts} connection attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: TransportError,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self { max_retries: 5, base_delay_ms: 250, max_delay_ms: 5_000 }
    }
}

impl ReconnectPolicy {
    fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(16);
        let multiplier = 1_u64 << exponent;
        let delay_ms = self.base_delay_ms.saturating_mul(multiplier).min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }
}

#[async_trait]
pub trait SocketTransport: Send + Sync {
    async fn connect(&self) -> Result<(), TransportError>;
    /// `Ok(None)` means the stream is finished for good and the runner should stop.
    async fn next_envelope(&self) -> Result<Option<SlackEnvelope>, TransportError>;
    async fn acknowledge(&self, envelope_id: &str) -> Result<(), TransportError>;
    async fn disconnect(&self) -> Result<(), TransportError>;
}

/// Lifecycle callbacks. Observability only; they cannot change what the runner does.
pub trait ConnectionHooks: Send + Sync {
    fn on_connecting(&self, attempt: u32);
    fn on_connection_error(&self, attempt: u32, error: &TransportError);
    fn on_connected(&self, attempt: u32);
}

#[derive(Default)]
pub struct LoggingHooks;

impl ConnectionHooks for LoggingHooks {
    fn on_connecting(&self, attempt: u32) {
        info!(
            event_name = "system.socket.connecting",
            attempt,
            "connecting to Slack with Socket Mode..."
        );
    }

    fn on_connection_error(&self, attempt: u32, error: &TransportError) {
        error!(
            event_name = "system.socket.connection_error",
            attempt,
            error = %error,
            "connection failed. Retrying later..."
        );
    }

    fn on_connected(&self, attempt: u32) {
        info!(
            event_name = "system.socket.connected",
            attempt,
            "connected to Slack with Socket Mode."
        );
    }
}

pub struct SocketModeRunner {
    transport: Arc<dyn SocketTransport>,
    dispatcher: EventDispatcher,
    reconnect_policy: ReconnectPolicy,
    hooks: Arc<dyn ConnectionHooks>,
}

impl SocketModeRunner {
    pub fn new(
        transport: Arc<dyn SocketTransport>,
        dispatcher: EventDispatcher,
        reconnect_policy: ReconnectPolicy,
    ) -> Self {
        Self { transport, dispatcher, reconnect_policy, hooks: Arc::new(LoggingHooks) }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ConnectionHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Runs until the transport reports end of stream or reconnects are exhausted.
    ///
    /// The failure counter resets after every successful connect, and a
    /// server-initiated disconnect reconnects immediately without using it.
    pub async fn start(&self) -> Result<(), SocketError> {
        let mut attempt = 0_u32;

        loop {
            self.hooks.on_connecting(attempt);

            let failure = match self.transport.connect().await {
                Ok(()) => {
                    self.hooks.on_connected(attempt);
                    attempt = 0;

                    match self.pump().await {
                        Ok(()) => {
                            info!("socket mode transport stream closed");
                            self.transport.disconnect().await?;
                            return Ok(());
                        }
                        Err(TransportError::Disconnected(reason)) => {
                            info!(
                                event_name = "system.socket.server_disconnect",
                                reason = %reason,
                                "socket mode session ended by server; reconnecting"
                            );
                            self.close_session().await;
                            continue;
                        }
                        Err(transport_error) => {
                            self.close_session().await;
                            transport_error
                        }
                    }
                }
                Err(transport_error) => transport_error,
            };

            self.hooks.on_connection_error(attempt, &failure);

            if attempt >= self.reconnect_policy.max_retries {
                warn!(
                    max_retries = self.reconnect_policy.max_retries,
                    error = %failure,
                    "socket mode retries exhausted"
                );
                return Err(SocketError::RetriesExhausted {
                    attempts: attempt + 1,
                    source: failure,
                });
            }

            let delay = self.reconnect_policy.backoff(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            attempt += 1;
        }
    }

    async fn pump(&self) -> Result<(), TransportError> {
        loop {
            let Some(envelope) = self.transport.next_envelope().await? else {
                return Ok(());
            };
            self.handle_envelope(&envelope).await;
        }
    }

    async fn close_session(&self) {
        if let Err(error) = self.transport.disconnect().await {
            debug!(error = %error, "socket mode transport cleanup failed");
        }
    }

    async fn handle_envelope(&self, envelope: &SlackEnvelope) {
        if !envelope.is_events_api() {
            trace!(
                event_name = "ingress.slack.envelope_ignored",
                envelope_id = %envelope.envelope_id,
                envelope_type = envelope.envelope_type.as_str(),
                "event ignored"
            );
            return;
        }

        let (user_id, channel_id) = correlation_fields(envelope);

        info!(
            event_name = "ingress.slack.envelope_received",
            envelope_id = %envelope.envelope_id,
            event_type = ?envelope.event.event_type(),
            correlation_id = %envelope.envelope_id,
            user_id = user_id.unwrap_or("unknown"),
            channel_id = channel_id.unwrap_or("unknown"),
            "received slack envelope"
        );

        if let Err(error) = self.transport.acknowledge(&envelope.envelope_id).await {
            warn!(
                event_name = "ingress.slack.ack_sent",
                envelope_id = %envelope.envelope_id,
                correlation_id = %envelope.envelope_id,
                error = %error,
                "failed to acknowledge slack envelope"
            );
        } else {
            debug!(
                event_name = "ingress.slack.ack_sent",
                envelope_id = %envelope.envelope_id,
                correlation_id = %envelope.envelope_id,
                "acknowledged slack envelope"
            );
        }

        let context = EventContext { correlation_id: envelope.envelope_id.clone() };
        match self.dispatcher.dispatch(envelope, &context).await {
            Ok(HandlerResult::Delivered(receipt)) => {
                debug!(
                    correlation_id = %envelope.envelope_id,
                    channel_id = %receipt.channel_id,
                    ts = %receipt.ts,
                    "welcome message delivered"
                );
            }
            Ok(HandlerResult::Skipped | HandlerResult::Ignored) => {}
            Err(error) => {
                warn!(
                    envelope_id = %envelope.envelope_id,
                    correlation_id = %envelope.envelope_id,
                    user_id = user_id.unwrap_or("unknown"),
                    channel_id = channel_id.unwrap_or("unknown"),
                    error = %error,
                    "event dispatch failed; continuing socket loop"
                );
            }
        }
    }
}

fn correlation_fields(envelope: &SlackEnvelope) -> (Option<&str>, Option<&str>) {
    match &envelope.event {
        SlackEvent::MemberJoinedChannel(event) => {
            (Some(event.user_id.as_str()), Some(event.channel_id.as_str()))
        }
        SlackEvent::TeamJoin(event) => (Some(event.user_id.as_str()), None),
        SlackEvent::Unsupported { .. } => (None, None),
    }
}

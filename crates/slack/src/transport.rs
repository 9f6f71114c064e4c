//! Socket Mode over a real WebSocket.
//!
//! `connect` asks the Web API for a single-use `wss://` URL and performs the
//! handshake. Reads and writes are split so acks can be written while the
//! reader is parked on the next frame.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use serde_json::json;
use tokio::{net::TcpStream, sync::Mutex};
use tokio_tungstenite::{
    connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, info, trace};

use crate::{
    api::SlackWebClient,
    events::{parse_socket_frame, SlackEnvelope, SocketFrame},
    socket::{SocketTransport, TransportError},
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct WebSocketTransport {
    client: Arc<SlackWebClient>,
    writer: Mutex<Option<SplitSink<WsStream, Message>>>,
    reader: Mutex<Option<SplitStream<WsStream>>>,
}

impl WebSocketTransport {
    pub fn new(client: Arc<SlackWebClient>) -> Self {
        Self { client, writer: Mutex::new(None), reader: Mutex::new(None) }
    }

    async fn write(&self, message: Message) -> Result<(), String> {
        let mut writer = self.writer.lock().await;
        let Some(sink) = writer.as_mut() else {
            return Err("socket is not connected".to_owned());
        };
        sink.send(message).await.map_err(|error| error.to_string())
    }
}

/// Maps one decoded frame to what the reader loop should do with it.
fn route_frame(frame: SocketFrame) -> Result<Option<SlackEnvelope>, TransportError> {
    match frame {
        SocketFrame::Envelope(envelope) => Ok(Some(envelope)),
        SocketFrame::Hello { num_connections } => {
            info!(
                event_name = "system.socket.hello",
                num_connections = num_connections.unwrap_or_default(),
                "received Socket Mode hello"
            );
            Ok(None)
        }
        SocketFrame::Disconnect { reason } => Err(TransportError::Disconnected(reason)),
    }
}

#[async_trait]
impl SocketTransport for WebSocketTransport {
    async fn connect(&self) -> Result<(), TransportError> {
        let url = self
            .client
            .open_socket_url()
            .await
            .map_err(|error| TransportError::Connect(error.to_string()))?;
        debug!("obtained Socket Mode URL");

        let (stream, _response) = connect_async(url.as_str())
            .await
            .map_err(|error| TransportError::Connect(error.to_string()))?;
        let (write, read) = stream.split();

        *self.writer.lock().await = Some(write);
        *self.reader.lock().await = Some(read);
        Ok(())
    }

    async fn next_envelope(&self) -> Result<Option<SlackEnvelope>, TransportError> {
        let mut reader = self.reader.lock().await;
        let Some(stream) = reader.as_mut() else {
            return Err(TransportError::Receive("socket is not connected".to_owned()));
        };

        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => match parse_socket_frame(&text) {
                    Ok(frame) => {
                        if let Some(envelope) = route_frame(frame)? {
                            return Ok(Some(envelope));
                        }
                    }
                    Err(error) => {
                        debug!(error = %error, "discarding unparseable Socket Mode frame");
                    }
                },
                Some(Ok(Message::Close(_))) => {
                    return Err(TransportError::Disconnected("close frame".to_owned()));
                }
                Some(Ok(other)) => trace!(frame = ?other, "ignoring non-text frame"),
                Some(Err(error)) => return Err(TransportError::Receive(error.to_string())),
                None => return Err(TransportError::Disconnected("stream ended".to_owned())),
            }
        }
    }

    async fn acknowledge(&self, envelope_id: &str) -> Result<(), TransportError> {
        let ack = json!({ "envelope_id": envelope_id }).to_string();
        self.write(Message::Text(ack.into())).await.map_err(TransportError::Acknowledge)
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        let writer = self.writer.lock().await.take();
        self.reader.lock().await.take();

        if let Some(mut sink) = writer {
            sink.close().await.map_err(|error| TransportError::Disconnect(error.to_string()))?;
        }
        Ok(())
    }
}

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};
use welcomebot_core::templates::{
    select_template, RenderInput, TemplateError, TemplateRenderer, WelcomeTemplate,
};

use crate::api::{send, ApiError, Delivery, MessageReceipt, SlackApi};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlackEnvelope {
    pub envelope_id: String,
    pub envelope_type: EnvelopeType,
    pub event: SlackEvent,
}

impl SlackEnvelope {
    pub fn is_events_api(&self) -> bool {
        self.envelope_type == EnvelopeType::EventsApi
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnvelopeType {
    EventsApi,
    SlashCommands,
    Interactive,
    Other(String),
}

impl EnvelopeType {
    fn parse(value: &str) -> Self {
        match value {
            "events_api" => Self::EventsApi,
            "slash_commands" => Self::SlashCommands,
            "interactive" => Self::Interactive,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::EventsApi => "events_api",
            Self::SlashCommands => "slash_commands",
            Self::Interactive => "interactive",
            Self::Other(value) => value,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlackEvent {
    MemberJoinedChannel(MemberJoinedChannelEvent),
    TeamJoin(TeamJoinEvent),
    Unsupported { event_type: String },
}

impl SlackEvent {
    pub fn event_type(&self) -> SlackEventType {
        match self {
            Self::MemberJoinedChannel(_) => SlackEventType::MemberJoinedChannel,
            Self::TeamJoin(_) => SlackEventType::TeamJoin,
            Self::Unsupported { .. } => SlackEventType::Unsupported,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SlackEventType {
    MemberJoinedChannel,
    TeamJoin,
    Unsupported,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberJoinedChannelEvent {
    pub user_id: String,
    pub channel_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TeamJoinEvent {
    pub user_id: String,
    pub user_name: Option<String>,
}

/// A decoded Socket Mode text frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SocketFrame {
    Hello { num_connections: Option<u32> },
    Disconnect { reason: String },
    Envelope(SlackEnvelope),
}

#[derive(Debug, Error)]
pub enum EnvelopeParseError {
    #[error("invalid socket mode frame: {0}")]
    Json(#[from] serde_json::Error),
    #[error("socket mode frame is missing `{0}`")]
    MissingField(&'static str),
}

#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    frame_type: String,
    envelope_id: Option<String>,
    payload: Option<RawPayload>,
    reason: Option<String>,
    num_connections: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawPayload {
    #[serde(rename = "type")]
    payload_type: Option<String>,
    event: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawMemberJoinedChannel {
    user: String,
    channel: String,
}

#[derive(Debug, Deserialize)]
struct RawTeamJoin {
    user: RawUser,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    id: String,
    name: Option<String>,
}

pub fn parse_socket_frame(text: &str) -> Result<SocketFrame, EnvelopeParseError> {
    let raw: RawFrame = serde_json::from_str(text)?;

    match raw.frame_type.as_str() {
        "hello" => return Ok(SocketFrame::Hello { num_connections: raw.num_connections }),
        "disconnect" => {
            return Ok(SocketFrame::Disconnect {
                reason: raw.reason.unwrap_or_else(|| "unknown".to_owned()),
            })
        }
        _ => {}
    }

    let envelope_id = raw.envelope_id.ok_or(EnvelopeParseError::MissingField("envelope_id"))?;
    let envelope_type = EnvelopeType::parse(&raw.frame_type);
    let event = match (&envelope_type, raw.payload) {
        (EnvelopeType::EventsApi, payload) => events_api_event(&envelope_id, payload),
        (other, _) => SlackEvent::Unsupported { event_type: other.as_str().to_owned() },
    };

    Ok(SocketFrame::Envelope(SlackEnvelope { envelope_id, envelope_type, event }))
}

/// A broken inner event still yields an envelope so the runner can ack it.
fn events_api_event(envelope_id: &str, payload: Option<RawPayload>) -> SlackEvent {
    let declared_type = payload
        .as_ref()
        .and_then(|payload| payload.event.as_ref())
        .and_then(|event| event.get("type"))
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_owned();

    let parsed = match payload {
        Some(payload) => parse_events_api_payload(payload),
        None => Err(EnvelopeParseError::MissingField("payload")),
    };

    parsed.unwrap_or_else(|error| {
        warn!(
            event_name = "ingress.slack.event_malformed",
            envelope_id = %envelope_id,
            event_type = %declared_type,
            error = %error,
            "malformed events api payload; acking without dispatch"
        );
        SlackEvent::Unsupported { event_type: declared_type }
    })
}

fn parse_events_api_payload(payload: RawPayload) -> Result<SlackEvent, EnvelopeParseError> {
    let payload_type = payload.payload_type.as_deref().unwrap_or("unknown");
    if payload_type != "event_callback" {
        return Ok(SlackEvent::Unsupported { event_type: payload_type.to_owned() });
    }

    let event = payload.event.ok_or(EnvelopeParseError::MissingField("payload.event"))?;
    let event_type = event.get("type").and_then(Value::as_str).unwrap_or("unknown").to_owned();

    match event_type.as_str() {
        "member_joined_channel" => {
            let raw: RawMemberJoinedChannel = serde_json::from_value(event)?;
            Ok(SlackEvent::MemberJoinedChannel(MemberJoinedChannelEvent {
                user_id: raw.user,
                channel_id: raw.channel,
            }))
        }
        "team_join" => {
            let raw: RawTeamJoin = serde_json::from_value(event)?;
            Ok(SlackEvent::TeamJoin(TeamJoinEvent { user_id: raw.user.id, user_name: raw.user.name }))
        }
        _ => Ok(SlackEvent::Unsupported { event_type }),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventContext {
    pub correlation_id: String,
}

impl Default for EventContext {
    fn default() -> Self {
        Self { correlation_id: "unknown-correlation-id".to_owned() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandlerResult {
    Delivered(MessageReceipt),
    Skipped,
    Ignored,
}

#[derive(Debug, Error)]
pub enum EventHandlerError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    fn event_type(&self) -> SlackEventType;
    async fn handle(
        &self,
        envelope: &SlackEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError>;
}

#[derive(Default)]
pub struct EventDispatcher {
    handlers: HashMap<SlackEventType, Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H>(&mut self, handler: H)
    where
        H: EventHandler + 'static,
    {
        self.handlers.insert(handler.event_type(), Arc::new(handler));
    }

    pub async fn dispatch(
        &self,
        envelope: &SlackEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let Some(handler) = self.handlers.get(&envelope.event.event_type()) else {
            return Ok(HandlerResult::Ignored);
        };

        handler.handle(envelope, ctx).await
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

/// Builds the dispatcher used in production: one handler per membership event.
pub fn welcome_dispatcher(
    api: Arc<dyn SlackApi>,
    renderer: Arc<TemplateRenderer>,
) -> EventDispatcher {
    let mut dispatcher = EventDispatcher::new();
    dispatcher.register(MemberJoinedChannelHandler::new(api.clone(), renderer.clone()));
    dispatcher.register(TeamJoinHandler::new(api, renderer));
    dispatcher
}

/// Posts the channel's onboarding message, visible only to the joining user.
pub struct MemberJoinedChannelHandler {
    api: Arc<dyn SlackApi>,
    renderer: Arc<TemplateRenderer>,
}

impl MemberJoinedChannelHandler {
    pub fn new(api: Arc<dyn SlackApi>, renderer: Arc<TemplateRenderer>) -> Self {
        Self { api, renderer }
    }
}

#[async_trait]
impl EventHandler for MemberJoinedChannelHandler {
    fn event_type(&self) -> SlackEventType {
        SlackEventType::MemberJoinedChannel
    }

    async fn handle(
        &self,
        envelope: &SlackEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let SlackEvent::MemberJoinedChannel(event) = &envelope.event else {
            return Ok(HandlerResult::Ignored);
        };

        debug!(
            correlation_id = %ctx.correlation_id,
            user_id = %event.user_id,
            channel_id = %event.channel_id,
            "user joined channel"
        );

        let Some(template) = select_template(&event.channel_id) else {
            info!(
                event_name = "welcome.template_missing",
                correlation_id = %ctx.correlation_id,
                channel_id = %event.channel_id,
                "no template for channel"
            );
            return Ok(HandlerResult::Skipped);
        };

        let text =
            self.renderer.render(template, &RenderInput::new(&event.user_id, &event.channel_id))?;
        let delivery = Delivery::Ephemeral {
            channel_id: event.channel_id.clone(),
            user_id: event.user_id.clone(),
        };
        let receipt = send(self.api.as_ref(), &delivery, &text).await?;
        Ok(HandlerResult::Delivered(receipt))
    }
}

/// Greets new workspace members over a direct message.
pub struct TeamJoinHandler {
    api: Arc<dyn SlackApi>,
    renderer: Arc<TemplateRenderer>,
}

impl TeamJoinHandler {
    pub fn new(api: Arc<dyn SlackApi>, renderer: Arc<TemplateRenderer>) -> Self {
        Self { api, renderer }
    }
}

#[async_trait]
impl EventHandler for TeamJoinHandler {
    fn event_type(&self) -> SlackEventType {
        SlackEventType::TeamJoin
    }

    async fn handle(
        &self,
        envelope: &SlackEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let SlackEvent::TeamJoin(event) = &envelope.event else {
            return Ok(HandlerResult::Ignored);
        };

        debug!(
            correlation_id = %ctx.correlation_id,
            user_id = %event.user_id,
            user_name = event.user_name.as_deref().unwrap_or("unknown"),
            "user joined workspace"
        );

        let channel_id = self.api.open_conversation(&event.user_id).await?;
        let text = self
            .renderer
            .render(WelcomeTemplate::NewMember, &RenderInput::new(&event.user_id, &channel_id))?;
        let receipt = send(self.api.as_ref(), &Delivery::Direct { channel_id }, &text).await?;
        Ok(HandlerResult::Delivered(receipt))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{
        parse_socket_frame, welcome_dispatcher, EnvelopeParseError, EnvelopeType, EventContext,
        EventDispatcher, EventHandlerError, HandlerResult, MemberJoinedChannelEvent,
        SlackEnvelope, SlackEvent, SocketFrame, TeamJoinEvent,
    };
    use crate::api::fake::{ApiCall, RecordingSlackApi};
    use crate::api::{ApiError, MessageReceipt};
    use serde_json::Value;
    use std::io;
    use std::sync::Mutex as StdMutex;
    use tracing_subscriber::fmt::MakeWriter;
    use welcomebot_core::templates::TemplateRenderer;

    fn renderer() -> Arc<TemplateRenderer> {
        Arc::new(TemplateRenderer::new().expect("templates compile"))
    }

    /// JSON log sink shared between the subscriber and the assertions.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<StdMutex<Vec<u8>>>);

    impl CapturedLogs {
        fn records(&self) -> Vec<Value> {
            let bytes = self.0.lock().map(|bytes| bytes.clone()).unwrap_or_default();
            String::from_utf8_lossy(&bytes)
                .lines()
                .filter_map(|line| serde_json::from_str(line).ok())
                .collect()
        }

        fn with_event_name(&self, event_name: &str) -> Vec<Value> {
            self.records()
                .into_iter()
                .filter(|record| record["fields"]["event_name"] == event_name)
                .collect()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if let Ok(mut bytes) = self.0.lock() {
                bytes.extend_from_slice(buf);
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn member_joined(envelope_id: &str, user_id: &str, channel_id: &str) -> SlackEnvelope {
        SlackEnvelope {
            envelope_id: envelope_id.to_owned(),
            envelope_type: EnvelopeType::EventsApi,
            event: SlackEvent::MemberJoinedChannel(MemberJoinedChannelEvent {
                user_id: user_id.to_owned(),
                channel_id: channel_id.to_owned(),
            }),
        }
    }

    #[test]
    fn parses_member_joined_channel_envelope() {
        let frame = parse_socket_frame(
            r#"{
                "envelope_id": "env-1",
                "type": "events_api",
                "accepts_response_payload": false,
                "payload": {
                    "type": "event_callback",
                    "team_id": "T1",
                    "event": {
                        "type": "member_joined_channel",
                        "user": "U1",
                        "channel": "C02KHAE8VLZ",
                        "channel_type": "C",
                        "team": "T1"
                    }
                }
            }"#,
        )
        .expect("frame parses");

        assert_eq!(frame, SocketFrame::Envelope(member_joined("env-1", "U1", "C02KHAE8VLZ")));
    }

    #[test]
    fn parses_team_join_user_object() {
        let frame = parse_socket_frame(
            r#"{
                "envelope_id": "env-2",
                "type": "events_api",
                "payload": {
                    "type": "event_callback",
                    "event": {
                        "type": "team_join",
                        "user": { "id": "U2", "name": "ada", "real_name": "Ada" }
                    }
                }
            }"#,
        )
        .expect("frame parses");

        let SocketFrame::Envelope(envelope) = frame else {
            panic!("expected envelope frame");
        };
        assert_eq!(
            envelope.event,
            SlackEvent::TeamJoin(TeamJoinEvent {
                user_id: "U2".to_owned(),
                user_name: Some("ada".to_owned()),
            })
        );
    }

    #[test]
    fn other_callback_events_are_unsupported() {
        let frame = parse_socket_frame(
            r#"{"envelope_id":"env-3","type":"events_api","payload":{"type":"event_callback","event":{"type":"reaction_added","user":"U3"}}}"#,
        )
        .expect("frame parses");

        let SocketFrame::Envelope(envelope) = frame else {
            panic!("expected envelope frame");
        };
        assert!(envelope.is_events_api());
        assert_eq!(envelope.event, SlackEvent::Unsupported { event_type: "reaction_added".to_owned() });
    }

    #[test]
    fn non_callback_events_api_payloads_are_unsupported() {
        let frame = parse_socket_frame(
            r#"{"envelope_id":"env-4","type":"events_api","payload":{"type":"app_rate_limited"}}"#,
        )
        .expect("frame parses");

        let SocketFrame::Envelope(envelope) = frame else {
            panic!("expected envelope frame");
        };
        assert_eq!(
            envelope.event,
            SlackEvent::Unsupported { event_type: "app_rate_limited".to_owned() }
        );
    }

    #[test]
    fn slash_command_envelopes_are_not_events_api() {
        let frame = parse_socket_frame(
            r#"{"envelope_id":"env-5","type":"slash_commands","payload":{"command":"/welcome","text":""}}"#,
        )
        .expect("frame parses");

        let SocketFrame::Envelope(envelope) = frame else {
            panic!("expected envelope frame");
        };
        assert_eq!(envelope.envelope_type, EnvelopeType::SlashCommands);
        assert!(!envelope.is_events_api());
    }

    #[test]
    fn parses_control_frames() {
        assert_eq!(
            parse_socket_frame(r#"{"type":"hello","num_connections":1}"#).expect("hello"),
            SocketFrame::Hello { num_connections: Some(1) }
        );
        assert_eq!(
            parse_socket_frame(r#"{"type":"disconnect","reason":"refresh_requested"}"#)
                .expect("disconnect"),
            SocketFrame::Disconnect { reason: "refresh_requested".to_owned() }
        );
    }

    #[test]
    fn rejects_envelope_without_id() {
        let error = parse_socket_frame(r#"{"type":"events_api","payload":{}}"#)
            .expect_err("missing envelope id");
        assert!(matches!(error, EnvelopeParseError::MissingField("envelope_id")));
    }

    #[test]
    fn malformed_member_joined_event_keeps_its_envelope() {
        let frame = parse_socket_frame(
            r#"{"envelope_id":"env-6","type":"events_api","payload":{"type":"event_callback","event":{"type":"member_joined_channel","user":"U1"}}}"#,
        )
        .expect("envelope survives a broken event");

        assert_eq!(
            frame,
            SocketFrame::Envelope(SlackEnvelope {
                envelope_id: "env-6".to_owned(),
                envelope_type: EnvelopeType::EventsApi,
                event: SlackEvent::Unsupported { event_type: "member_joined_channel".to_owned() },
            })
        );
    }

    #[test]
    fn events_api_envelope_without_payload_is_unsupported() {
        let frame = parse_socket_frame(r#"{"envelope_id":"env-6b","type":"events_api"}"#)
            .expect("envelope survives a missing payload");

        let SocketFrame::Envelope(envelope) = frame else {
            panic!("expected envelope frame");
        };
        assert!(envelope.is_events_api());
        assert_eq!(envelope.event, SlackEvent::Unsupported { event_type: "unknown".to_owned() });
    }

    #[test]
    fn rejects_frames_that_are_not_json() {
        let error = parse_socket_frame("not json").expect_err("invalid json");
        assert!(matches!(error, EnvelopeParseError::Json(_)));
    }

    #[test]
    fn welcome_dispatcher_registers_membership_handlers() {
        let api = Arc::new(RecordingSlackApi::default());
        let dispatcher = welcome_dispatcher(api, renderer());
        assert_eq!(dispatcher.handler_count(), 2);
    }

    #[tokio::test]
    async fn dispatcher_returns_ignored_when_no_handler_registered() {
        let dispatcher = EventDispatcher::new();
        let envelope = member_joined("env-7", "U1", "C02KHAE8VLZ");

        let result =
            dispatcher.dispatch(&envelope, &EventContext::default()).await.expect("dispatch");

        assert_eq!(result, HandlerResult::Ignored);
    }

    #[tokio::test]
    async fn member_join_on_mapped_channel_posts_ephemeral_welcome() {
        let api = Arc::new(RecordingSlackApi::default());
        let dispatcher = welcome_dispatcher(api.clone(), renderer());

        let result = dispatcher
            .dispatch(&member_joined("env-8", "U1", "C02KHAE8VLZ"), &EventContext::default())
            .await
            .expect("dispatch");

        assert!(matches!(result, HandlerResult::Delivered(_)));
        let calls = api.calls().await;
        assert_eq!(calls.len(), 1);
        let ApiCall::PostEphemeral { channel_id, user_id, text } = &calls[0] else {
            panic!("expected an ephemeral post, got {calls:?}");
        };
        assert_eq!(channel_id, "C02KHAE8VLZ");
        assert_eq!(user_id, "U1");
        assert!(text.contains("<@U1>"));
        assert!(text.contains("<#C02KHAE8VLZ>"));
    }

    #[tokio::test]
    async fn member_join_on_unmapped_channel_sends_nothing() {
        let api = Arc::new(RecordingSlackApi::default());
        let dispatcher = welcome_dispatcher(api.clone(), renderer());

        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_writer(logs.clone())
            .with_max_level(tracing::Level::INFO)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let result = dispatcher
            .dispatch(&member_joined("env-9", "U1", "C0RANDOM01"), &EventContext::default())
            .await
            .expect("dispatch");

        assert_eq!(result, HandlerResult::Skipped);
        assert!(api.calls().await.is_empty());
        let missing = logs.with_event_name("welcome.template_missing");
        assert_eq!(missing.len(), 1, "expected one missing-template record, got {missing:?}");
        assert_eq!(missing[0]["fields"]["channel_id"], "C0RANDOM01");
        assert_eq!(missing[0]["fields"]["message"], "no template for channel");
    }

    #[tokio::test]
    async fn team_join_opens_conversation_then_sends_direct_message() {
        let api = Arc::new(RecordingSlackApi::default());
        let dispatcher = welcome_dispatcher(api.clone(), renderer());
        let envelope = SlackEnvelope {
            envelope_id: "env-10".to_owned(),
            envelope_type: EnvelopeType::EventsApi,
            event: SlackEvent::TeamJoin(TeamJoinEvent {
                user_id: "U4".to_owned(),
                user_name: None,
            }),
        };

        let result =
            dispatcher.dispatch(&envelope, &EventContext::default()).await.expect("dispatch");

        assert_eq!(
            result,
            HandlerResult::Delivered(MessageReceipt {
                channel_id: "D-U4".to_owned(),
                ts: "1700000000.000100".to_owned(),
            })
        );
        let calls = api.calls().await;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], ApiCall::OpenConversation { user_id: "U4".to_owned() });
        let ApiCall::PostMessage { channel_id, text } = &calls[1] else {
            panic!("expected a direct message, got {calls:?}");
        };
        assert_eq!(channel_id, "D-U4");
        assert!(text.starts_with("Hello, <@U4>,  and welcome to NetBird's community Slack!"));
    }

    #[tokio::test]
    async fn team_join_stops_when_conversation_cannot_be_opened() {
        let api = Arc::new(RecordingSlackApi::failing_open("user_not_found"));
        let dispatcher = welcome_dispatcher(api.clone(), renderer());
        let envelope = SlackEnvelope {
            envelope_id: "env-11".to_owned(),
            envelope_type: EnvelopeType::EventsApi,
            event: SlackEvent::TeamJoin(TeamJoinEvent {
                user_id: "U5".to_owned(),
                user_name: Some("grace".to_owned()),
            }),
        };

        let error = dispatcher
            .dispatch(&envelope, &EventContext::default())
            .await
            .expect_err("open failure surfaces");

        assert!(error.to_string().contains("user_not_found"));
        assert_eq!(api.calls().await, vec![ApiCall::OpenConversation { user_id: "U5".to_owned() }]);
    }

    #[tokio::test]
    async fn send_failure_is_reported_to_caller() {
        let api = Arc::new(RecordingSlackApi::failing_posts("channel_not_found"));
        let dispatcher = welcome_dispatcher(api.clone(), renderer());

        let error = dispatcher
            .dispatch(&member_joined("env-12", "U6", "C05T5K65X7U"), &EventContext::default())
            .await
            .expect_err("send failure surfaces");

        assert!(matches!(
            &error,
            EventHandlerError::Api(ApiError::Slack { method: "chat.postEphemeral", error })
                if error == "channel_not_found"
        ));
        assert!(error.to_string().contains("chat.postEphemeral"));
        assert_eq!(api.calls().await.len(), 1);
    }

    #[tokio::test]
    async fn unsupported_events_are_ignored() {
        let api = Arc::new(RecordingSlackApi::default());
        let dispatcher = welcome_dispatcher(api.clone(), renderer());
        let envelope = SlackEnvelope {
            envelope_id: "env-13".to_owned(),
            envelope_type: EnvelopeType::EventsApi,
            event: SlackEvent::Unsupported { event_type: "reaction_added".to_owned() },
        };

        let result =
            dispatcher.dispatch(&envelope, &EventContext::default()).await.expect("dispatch");

        assert_eq!(result, HandlerResult::Ignored);
        assert!(api.calls().await.is_empty());
    }
}

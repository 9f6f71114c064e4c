//! Slack Integration - Socket Mode onboarding bot
//!
//! This crate provides the Slack side of welcomebot:
//! - **Socket Mode** (`socket`) - connection supervisor with reconnection and lifecycle hooks
//! - **Transport** (`transport`) - WebSocket implementation of the Socket Mode transport
//! - **Events** (`events`) - envelope decoding, event router, membership handlers
//! - **Web API** (`api`) - `chat.postEphemeral`, `chat.postMessage`, `conversations.open`
//!
//! # Getting Started
//!
//! 1. Create a Slack app at https://api.slack.com/apps
//! 2. Enable Socket Mode and subscribe to `member_joined_channel` and `team_join`
//! 3. Grant `chat:write` and `im:write`
//! 4. Set env vars: `SLACK_APP_TOKEN`, `SLACK_BOT_TOKEN`
//!
//! # Architecture
//!
//! ```text
//! Slack → SocketModeRunner → ack → EventDispatcher → Handler → template → Web API
//! ```
//!
//! # Key Types
//!
//! - `SocketModeRunner` - event loop with reconnection logic
//! - `EventDispatcher` - routes events to the membership handlers
//! - `SlackApi` - outbound seam, implemented by `SlackWebClient`

pub mod api;
pub mod events;
pub mod socket;
pub mod transport;

//! # Commish Channels
//! The chat-platform delivery boundary.
//!
//! The orchestration core only ever talks to [`DeliveryChannel`]; the
//! Discord REST implementation lives in [`discord`] and the slash-command
//! payloads the bot registers live in [`commands`].

pub mod commands;
pub mod discord;

use async_trait::async_trait;
use commish_core::error::Result;

pub use discord::DiscordClient;

/// A chat-platform member as the bot sees it.
#[derive(Debug, Clone)]
pub struct Member {
    pub id: String,
    pub display_name: String,
    /// Automated accounts are skipped by reminder logic.
    pub bot: bool,
}

/// Optional structured payload attached to an announcement (an embed, in
/// Discord terms). Built at the boundary, passed through opaquely.
#[derive(Debug, Clone)]
pub struct MessagePayload {
    pub embed: serde_json::Value,
}

/// Outbound message delivery. Every send can fail independently; callers
/// catch failures per recipient so one bad delivery never blocks the rest.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Post to the league's announcement channel.
    async fn send_announcement(&self, text: &str, payload: Option<&MessagePayload>) -> Result<()>;

    /// Direct-message a single member.
    async fn send_direct(&self, member_id: &str, text: &str) -> Result<()>;

    /// Current membership of the announcement channel's guild.
    async fn members(&self) -> Result<Vec<Member>>;

    /// Platform mention markup for a member.
    fn mention(&self, member_id: &str) -> String;

    /// Platform mention markup for a channel.
    fn channel_mention(&self, channel_id: &str) -> String;
}

//! Discord REST client (API v10) for announcements, DMs, membership and
//! command registration.

use async_trait::async_trait;
use commish_core::config::DiscordConfig;
use commish_core::error::{CommishError, Result};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{DeliveryChannel, Member, MessagePayload};

const API_BASE: &str = "https://discord.com/api/v10";

/// Bot-token REST client bound to one guild and one announcement channel.
#[derive(Debug)]
pub struct DiscordClient {
    config: DiscordConfig,
    announce_channel_id: String,
    client: reqwest::Client,
}

impl DiscordClient {
    /// Build the client and resolve the announcement channel: the test
    /// channel in dev mode, the main channel otherwise. An unresolvable
    /// channel or missing credentials is fatal at startup.
    pub fn new(config: DiscordConfig, dev_mode: bool) -> Result<Self> {
        if config.token.is_empty() {
            return Err(CommishError::MissingConfiguration(
                "discord.token is not set".into(),
            ));
        }
        if config.guild_id.is_empty() {
            return Err(CommishError::MissingConfiguration(
                "discord.guild_id is not set".into(),
            ));
        }

        let announce_channel_id = if dev_mode {
            config.test_channel_id.clone()
        } else {
            config.main_channel_id.clone()
        };
        if announce_channel_id.is_empty() {
            return Err(CommishError::MissingConfiguration(
                "unable to establish main channel".into(),
            ));
        }

        Ok(Self {
            config,
            announce_channel_id,
            client: reqwest::Client::new(),
        })
    }

    fn api_url(path: &str) -> String {
        format!("{API_BASE}/{path}")
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<T> {
        let url = Self::api_url(path);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bot {}", self.config.token))
            .json(body)
            .timeout(std::time::Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| CommishError::Channel(format!("POST {path} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CommishError::Channel(format!(
                "POST {path} returned {status}: {body}"
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CommishError::Channel(format!("Invalid response from {path}: {e}")))
    }

    async fn send_channel_message(
        &self,
        channel_id: &str,
        text: &str,
        payload: Option<&MessagePayload>,
    ) -> Result<()> {
        let mut body = json!({ "content": text });
        if let Some(payload) = payload {
            body["embeds"] = json!([payload.embed]);
        }
        let _: Value = self
            .post_json(&format!("channels/{channel_id}/messages"), &body)
            .await?;
        Ok(())
    }

    /// Bulk-overwrite the guild's application commands. Called once at
    /// startup, before the tickers start.
    pub async fn set_guild_commands(&self, commands: &[Value]) -> Result<()> {
        if self.config.application_id.is_empty() {
            return Err(CommishError::MissingConfiguration(
                "discord.application_id is not set".into(),
            ));
        }
        let path = format!(
            "applications/{}/guilds/{}/commands",
            self.config.application_id, self.config.guild_id
        );
        let url = Self::api_url(&path);
        tracing::info!(
            "Refreshing {} application commands for guild {}",
            commands.len(),
            self.config.guild_id
        );
        let response = self
            .client
            .put(&url)
            .header("Authorization", format!("Bot {}", self.config.token))
            .json(&commands)
            .timeout(std::time::Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| CommishError::Channel(format!("PUT {path} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CommishError::Channel(format!(
                "PUT {path} returned {status}: {body}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct DmChannel {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GuildMember {
    user: DiscordUser,
    #[serde(default)]
    nick: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DiscordUser {
    id: String,
    username: String,
    #[serde(default)]
    bot: bool,
}

#[async_trait]
impl DeliveryChannel for DiscordClient {
    async fn send_announcement(&self, text: &str, payload: Option<&MessagePayload>) -> Result<()> {
        self.send_channel_message(&self.announce_channel_id, text, payload)
            .await
    }

    async fn send_direct(&self, member_id: &str, text: &str) -> Result<()> {
        let dm: DmChannel = self
            .post_json("users/@me/channels", &json!({ "recipient_id": member_id }))
            .await?;
        self.send_channel_message(&dm.id, text, None).await
    }

    async fn members(&self) -> Result<Vec<Member>> {
        let path = format!("guilds/{}/members", self.config.guild_id);
        let url = Self::api_url(&path);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bot {}", self.config.token))
            .query(&[("limit", "1000")])
            .timeout(std::time::Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| CommishError::Channel(format!("GET {path} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(CommishError::Channel(format!(
                "GET {path} returned {status}"
            )));
        }

        let raw: Vec<GuildMember> = response
            .json()
            .await
            .map_err(|e| CommishError::Channel(format!("Invalid member list: {e}")))?;

        Ok(raw
            .into_iter()
            .map(|m| Member {
                display_name: m.nick.unwrap_or_else(|| m.user.username.clone()),
                id: m.user.id,
                bot: m.user.bot,
            })
            .collect())
    }

    fn mention(&self, member_id: &str) -> String {
        format!("<@{member_id}>")
    }

    fn channel_mention(&self, channel_id: &str) -> String {
        format!("<#{channel_id}>")
    }
}

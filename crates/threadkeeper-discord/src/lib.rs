// SPDX-FileCopyrightText: 2026 Threadkeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discord platform adapter for Threadkeeper.
//!
//! [`DiscordPlatform`] implements [`ChatPlatform`] over serenity's REST
//! client; [`gateway::run`] connects to the gateway and feeds reaction and
//! button events into the workflow through [`handler::Handler`].

mod convert;
pub mod gateway;
pub mod handler;

use std::sync::Arc;

use async_trait::async_trait;
use serenity::all::{
    ChannelId as DiscordChannelId, ChannelType, CreateChannel, CreateInteractionResponse,
    CreateInteractionResponseFollowup, CreateInteractionResponseMessage, CreateThread,
    EditThread, GetMessages, GuildId as DiscordGuildId, Http, InteractionId,
    ReactionType,
};
use tracing::debug;

use threadkeeper_core::error::ThreadkeeperError;
use threadkeeper_core::traits::adapter::PluginAdapter;
use threadkeeper_core::traits::platform::ChatPlatform;
use threadkeeper_core::types::{
    ChannelId, ChannelInfo, ChannelKind, ChatMessage, ChatUser, GuildId,
    HealthStatus, InteractionHandle, MessageId, OutboundMessage, ThreadState,
};

/// Discord implementation of [`ChatPlatform`].
pub struct DiscordPlatform {
    http: Arc<Http>,
}

impl DiscordPlatform {
    /// Creates a REST-only client for `token`.
    pub fn new(token: &str) -> Self {
        Self::with_http(Arc::new(Http::new(token)))
    }

    pub fn with_http(http: Arc<Http>) -> Self {
        Self { http }
    }

    fn http(&self) -> &Http {
        &self.http
    }
}

fn cid(id: ChannelId) -> DiscordChannelId {
    DiscordChannelId::new(id.0)
}

#[async_trait]
impl PluginAdapter for DiscordPlatform {
    fn name(&self) -> &str {
        "discord"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, ThreadkeeperError> {
        match self.http.get_current_user().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) if convert::is_unauthorized(&e) => {
                Ok(HealthStatus::Unhealthy("Discord rejected the bot token".into()))
            }
            Err(e) => Ok(HealthStatus::Degraded(format!("Discord API error: {e}"))),
        }
    }

    /// The REST client holds no connections of its own; the gateway client
    /// is shut down by [`gateway::run`].
    async fn shutdown(&self) -> Result<(), ThreadkeeperError> {
        debug!("discord adapter shut down");
        Ok(())
    }
}

#[async_trait]
impl ChatPlatform for DiscordPlatform {
    async fn current_user(&self) -> Result<ChatUser, ThreadkeeperError> {
        let me = self
            .http
            .get_current_user()
            .await
            .map_err(convert::map_err("user", "@me"))?;
        Ok(convert::user(&me))
    }

    async fn channel(&self, id: ChannelId) -> Result<ChannelInfo, ThreadkeeperError> {
        let channel = cid(id)
            .to_channel(self.http())
            .await
            .map_err(convert::map_err("channel", id))?;
        Ok(match channel.guild() {
            Some(guild_channel) => convert::channel(&guild_channel),
            None => ChannelInfo {
                id,
                guild_id: None,
                name: String::new(),
                kind: ChannelKind::Other,
                parent_id: None,
                starter_message_id: None,
                thread_state: None,
            },
        })
    }

    async fn find_text_channel(
        &self,
        guild: GuildId,
        name: &str,
    ) -> Result<Option<ChannelId>, ThreadkeeperError> {
        let channels = DiscordGuildId::new(guild.0)
            .channels(self.http())
            .await
            .map_err(convert::map_err("guild", guild))?;
        Ok(channels
            .values()
            .find(|c| c.kind == ChannelType::Text && c.name == name)
            .map(|c| ChannelId(c.id.get())))
    }

    async fn create_text_channel(
        &self,
        guild: GuildId,
        name: &str,
        topic: &str,
    ) -> Result<ChannelId, ThreadkeeperError> {
        let builder = CreateChannel::new(name)
            .kind(ChannelType::Text)
            .topic(topic);
        let channel = DiscordGuildId::new(guild.0)
            .create_channel(self.http(), builder)
            .await
            .map_err(convert::map_err("guild", guild))?;
        Ok(ChannelId(channel.id.get()))
    }

    async fn message(
        &self,
        channel: ChannelId,
        id: MessageId,
    ) -> Result<ChatMessage, ThreadkeeperError> {
        let msg = cid(channel)
            .message(self.http(), id.0)
            .await
            .map_err(convert::map_err("message", id))?;
        Ok(convert::message(&msg))
    }

    async fn recent_messages(
        &self,
        channel: ChannelId,
        limit: u8,
    ) -> Result<Vec<ChatMessage>, ThreadkeeperError> {
        let messages = cid(channel)
            .messages(self.http(), GetMessages::new().limit(limit))
            .await
            .map_err(convert::map_err("channel", channel))?;
        debug!(%channel, count = messages.len(), "fetched messages");
        Ok(messages.iter().map(convert::message).collect())
    }

    async fn send(
        &self,
        channel: ChannelId,
        message: OutboundMessage,
    ) -> Result<MessageId, ThreadkeeperError> {
        let sent = cid(channel)
            .send_message(self.http(), convert::create_message(&message))
            .await
            .map_err(convert::map_err("channel", channel))?;
        Ok(MessageId(sent.id.get()))
    }

    async fn edit_message(
        &self,
        channel: ChannelId,
        message: MessageId,
        edit: OutboundMessage,
    ) -> Result<(), ThreadkeeperError> {
        cid(channel)
            .edit_message(self.http(), message.0, convert::edit_message(&edit))
            .await
            .map_err(convert::map_err("message", message))?;
        Ok(())
    }

    async fn delete_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<(), ThreadkeeperError> {
        cid(channel)
            .delete_message(self.http(), message.0)
            .await
            .map_err(convert::map_err("message", message))
    }

    async fn start_thread(
        &self,
        channel: ChannelId,
        message: MessageId,
        name: &str,
        auto_archive_minutes: u16,
    ) -> Result<ChannelId, ThreadkeeperError> {
        let builder =
            CreateThread::new(name).auto_archive_duration(convert::auto_archive(auto_archive_minutes));
        let thread = cid(channel)
            .create_thread_from_message(self.http(), message.0, builder)
            .await
            .map_err(convert::map_err("message", message))?;
        Ok(ChannelId(thread.id.get()))
    }

    async fn set_thread_state(
        &self,
        thread: ChannelId,
        state: ThreadState,
    ) -> Result<(), ThreadkeeperError> {
        cid(thread)
            .edit_thread(
                self.http(),
                EditThread::new()
                    .archived(state.archived)
                    .locked(state.locked),
            )
            .await
            .map_err(convert::map_err("thread", thread))?;
        Ok(())
    }

    async fn delete_channel(&self, channel: ChannelId) -> Result<(), ThreadkeeperError> {
        cid(channel)
            .delete(self.http())
            .await
            .map_err(convert::map_err("channel", channel))?;
        Ok(())
    }

    async fn react(
        &self,
        channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> Result<(), ThreadkeeperError> {
        cid(channel)
            .create_reaction(
                self.http(),
                message.0,
                ReactionType::Unicode(emoji.to_string()),
            )
            .await
            .map_err(convert::map_err("message", message))
    }

    async fn unreact(
        &self,
        channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> Result<(), ThreadkeeperError> {
        cid(channel)
            .delete_reaction(
                self.http(),
                message.0,
                None,
                ReactionType::Unicode(emoji.to_string()),
            )
            .await
            .map_err(convert::map_err("message", message))
    }

    async fn acknowledge(&self, interaction: &InteractionHandle) -> Result<(), ThreadkeeperError> {
        let response =
            CreateInteractionResponse::Defer(CreateInteractionResponseMessage::new().ephemeral(true));
        self.http
            .create_interaction_response(
                InteractionId::new(interaction.id),
                &interaction.token,
                &response,
                Vec::new(),
            )
            .await
            .map_err(convert::map_err("interaction", interaction.id))
    }

    async fn reply_private(
        &self,
        interaction: &InteractionHandle,
        content: &str,
    ) -> Result<(), ThreadkeeperError> {
        let followup = CreateInteractionResponseFollowup::new()
            .content(content)
            .ephemeral(true);
        self.http
            .create_followup_message(&interaction.token, &followup, Vec::new())
            .await
            .map_err(convert::map_err("interaction", interaction.id))?;
        Ok(())
    }

    fn channel_link(&self, guild: Option<GuildId>, channel: ChannelId) -> String {
        convert::channel_link(guild, channel)
    }

    fn message_link(
        &self,
        guild: Option<GuildId>,
        channel: ChannelId,
        message: MessageId,
    ) -> String {
        format!("{}/{message}", convert::channel_link(guild, channel))
    }
}

// SPDX-FileCopyrightText: 2026 Threadkeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat platform capability trait.

use async_trait::async_trait;

use crate::error::ThreadkeeperError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    ChannelId, ChannelInfo, ChatMessage, ChatUser, GuildId, InteractionHandle, MessageId,
    OutboundMessage, ThreadState,
};

/// The operations the archive workflow needs from a chat platform.
///
/// Implemented by the Discord adapter and by the in-memory mock used in
/// tests. Every call may fail with [`ThreadkeeperError::Platform`]; lookups
/// of missing objects fail with [`ThreadkeeperError::NotFound`].
#[async_trait]
pub trait ChatPlatform: PluginAdapter {
    /// The account the bot is logged in as.
    async fn current_user(&self) -> Result<ChatUser, ThreadkeeperError>;

    /// Fetches channel or thread metadata.
    async fn channel(&self, id: ChannelId) -> Result<ChannelInfo, ThreadkeeperError>;

    /// Finds a text channel by exact name within a guild.
    async fn find_text_channel(
        &self,
        guild: GuildId,
        name: &str,
    ) -> Result<Option<ChannelId>, ThreadkeeperError>;

    /// Creates a text channel in a guild.
    async fn create_text_channel(
        &self,
        guild: GuildId,
        name: &str,
        topic: &str,
    ) -> Result<ChannelId, ThreadkeeperError>;

    /// Fetches a single message.
    async fn message(
        &self,
        channel: ChannelId,
        id: MessageId,
    ) -> Result<ChatMessage, ThreadkeeperError>;

    /// Fetches up to `limit` of the most recent messages of a channel, in
    /// whatever order the platform returns them.
    async fn recent_messages(
        &self,
        channel: ChannelId,
        limit: u8,
    ) -> Result<Vec<ChatMessage>, ThreadkeeperError>;

    /// Posts a message and returns its id.
    async fn send(
        &self,
        channel: ChannelId,
        message: OutboundMessage,
    ) -> Result<MessageId, ThreadkeeperError>;

    /// Replaces the content, embed and controls of a message the bot posted.
    async fn edit_message(
        &self,
        channel: ChannelId,
        message: MessageId,
        edit: OutboundMessage,
    ) -> Result<(), ThreadkeeperError>;

    /// Deletes a message.
    async fn delete_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<(), ThreadkeeperError>;

    /// Starts a thread from an existing message.
    async fn start_thread(
        &self,
        channel: ChannelId,
        message: MessageId,
        name: &str,
        auto_archive_minutes: u16,
    ) -> Result<ChannelId, ThreadkeeperError>;

    /// Sets a thread's lock/archive flags.
    async fn set_thread_state(
        &self,
        thread: ChannelId,
        state: ThreadState,
    ) -> Result<(), ThreadkeeperError>;

    /// Deletes a channel or thread.
    async fn delete_channel(&self, channel: ChannelId) -> Result<(), ThreadkeeperError>;

    /// Adds a reaction from the bot account.
    async fn react(
        &self,
        channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> Result<(), ThreadkeeperError>;

    /// Removes the bot account's own reaction.
    async fn unreact(
        &self,
        channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> Result<(), ThreadkeeperError>;

    /// Acknowledges an interaction within the platform's response window,
    /// deferring a private reply.
    async fn acknowledge(&self, interaction: &InteractionHandle) -> Result<(), ThreadkeeperError>;

    /// Sends a reply visible only to the invoking user. Requires a prior
    /// [`ChatPlatform::acknowledge`].
    async fn reply_private(
        &self,
        interaction: &InteractionHandle,
        content: &str,
    ) -> Result<(), ThreadkeeperError>;

    /// Web link to a channel or thread.
    fn channel_link(&self, guild: Option<GuildId>, channel: ChannelId) -> String;

    /// Web link to a message.
    fn message_link(&self, guild: Option<GuildId>, channel: ChannelId, message: MessageId)
    -> String;
}

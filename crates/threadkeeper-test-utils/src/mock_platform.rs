// SPDX-FileCopyrightText: 2026 Threadkeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory chat platform for deterministic testing.
//!
//! `MockPlatform` implements `ChatPlatform` over a single in-memory store.
//! Every call is appended to a call log, and any operation can be made to
//! fail, globally or for one channel, to exercise degraded paths.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::Mutex;

use threadkeeper_core::traits::adapter::PluginAdapter;
use threadkeeper_core::traits::platform::ChatPlatform;
use threadkeeper_core::types::{
    Button, ChannelId, ChannelInfo, ChannelKind, ChatMessage, ChatUser, GuildId,
    HealthStatus, InteractionHandle, MessageId, OutboundMessage, ThreadState, UserId,
};
use threadkeeper_core::ThreadkeeperError;

/// Id of the bot account in every mock platform.
pub const BOT_USER_ID: UserId = UserId(1);

/// Platform operations, for failure injection and the call log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Channel,
    FindChannel,
    CreateChannel,
    Message,
    RecentMessages,
    Send,
    EditMessage,
    DeleteMessage,
    StartThread,
    SetThreadState,
    DeleteChannel,
    React,
    Unreact,
    Acknowledge,
    ReplyPrivate,
}

/// One recorded platform call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: Operation,
    /// Channel the call targeted, when it had one.
    pub channel: Option<ChannelId>,
    pub failed: bool,
}

/// A non-bot user.
pub fn human(id: u64, tag: &str) -> ChatUser {
    ChatUser {
        id: UserId(id),
        tag: tag.to_string(),
        mention: format!("<@{id}>"),
        bot: false,
    }
}

#[derive(Default)]
struct State {
    next_id: u64,
    clock: Option<DateTime<Utc>>,
    channels: HashMap<ChannelId, ChannelInfo>,
    /// Chronological per channel.
    messages: HashMap<ChannelId, Vec<ChatMessage>>,
    buttons: HashMap<MessageId, Vec<Button>>,
    /// Latest posted or edited form of each bot message.
    rendered: HashMap<MessageId, OutboundMessage>,
    sent: Vec<(ChannelId, OutboundMessage)>,
    acknowledged: HashSet<u64>,
    private_replies: Vec<String>,
    calls: Vec<Call>,
    failing: HashSet<(Operation, Option<ChannelId>)>,
    /// Reported by `health_check`; healthy when unset.
    health: Option<HealthStatus>,
    shutdowns: usize,
}

impl State {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        1_000 + self.next_id
    }

    fn tick(&mut self) -> DateTime<Utc> {
        let base = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
        let now = self.clock.map_or(base, |t| t + Duration::minutes(1));
        self.clock = Some(now);
        now
    }

    /// Logs the call and returns the injected failure, if any.
    fn enter(&mut self, op: Operation, channel: Option<ChannelId>) -> Result<(), ThreadkeeperError> {
        let failed = self.failing.contains(&(op, None)) || self.failing.contains(&(op, channel));
        self.calls.push(Call {
            op,
            channel,
            failed,
        });
        if failed {
            Err(ThreadkeeperError::Platform {
                message: format!("injected {op:?} failure"),
                source: None,
            })
        } else {
            Ok(())
        }
    }

    fn channel(&self, id: ChannelId) -> Result<&ChannelInfo, ThreadkeeperError> {
        self.channels
            .get(&id)
            .ok_or_else(|| ThreadkeeperError::not_found("channel", id))
    }

    fn message_mut(
        &mut self,
        channel: ChannelId,
        id: MessageId,
    ) -> Result<&mut ChatMessage, ThreadkeeperError> {
        self.messages
            .get_mut(&channel)
            .and_then(|msgs| msgs.iter_mut().find(|m| m.id == id))
            .ok_or_else(|| ThreadkeeperError::not_found("message", id))
    }

    fn ensure_writable(&self, channel: ChannelId) -> Result<(), ThreadkeeperError> {
        let info = self.channel(channel)?;
        if info.thread_state.is_some_and(|s| s.archived) {
            return Err(ThreadkeeperError::Platform {
                message: format!("thread {channel} is archived"),
                source: None,
            });
        }
        Ok(())
    }

    fn insert_message(
        &mut self,
        channel: ChannelId,
        author: ChatUser,
        content: String,
        system: bool,
    ) -> Result<MessageId, ThreadkeeperError> {
        let guild_id = self.channel(channel)?.guild_id;
        let id = MessageId(self.allocate());
        let created_at = self.tick();
        self.messages.entry(channel).or_default().push(ChatMessage {
            id,
            channel_id: channel,
            guild_id,
            author,
            content,
            created_at,
            system,
            embed_count: 0,
            embed_footers: vec![],
            attachments: vec![],
            thread_id: None,
            own_reactions: vec![],
        });
        Ok(id)
    }
}

/// An in-memory chat platform.
pub struct MockPlatform {
    bot: ChatUser,
    state: Arc<Mutex<State>>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            bot: ChatUser {
                id: BOT_USER_ID,
                tag: "threadkeeper".to_string(),
                mention: format!("<@{BOT_USER_ID}>"),
                bot: true,
            },
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    pub fn bot_user(&self) -> ChatUser {
        self.bot.clone()
    }

    // -- fixtures --

    pub async fn add_text_channel(&self, guild: GuildId, name: &str) -> ChannelId {
        let mut state = self.state.lock().await;
        let id = ChannelId(state.allocate());
        state.channels.insert(
            id,
            ChannelInfo {
                id,
                guild_id: Some(guild),
                name: name.to_string(),
                kind: ChannelKind::Text,
                parent_id: None,
                starter_message_id: None,
                thread_state: None,
            },
        );
        id
    }

    /// Adds an open thread under `parent`, started from `starter` when given.
    pub async fn add_thread(
        &self,
        parent: ChannelId,
        name: &str,
        starter: Option<MessageId>,
    ) -> ChannelId {
        let mut state = self.state.lock().await;
        let id = ChannelId(state.allocate());
        let guild_id = state.channels.get(&parent).and_then(|c| c.guild_id);
        state.channels.insert(
            id,
            ChannelInfo {
                id,
                guild_id,
                name: name.to_string(),
                kind: ChannelKind::Thread,
                parent_id: Some(parent),
                starter_message_id: starter,
                thread_state: Some(ThreadState::OPEN),
            },
        );
        if let Some(starter) = starter {
            if let Ok(message) = state.message_mut(parent, starter) {
                message.thread_id = Some(id);
            }
        }
        id
    }

    /// Posts a message as `author`, one simulated minute after the last.
    pub async fn post(&self, channel: ChannelId, author: &ChatUser, content: &str) -> MessageId {
        let mut state = self.state.lock().await;
        state
            .insert_message(channel, author.clone(), content.to_string(), false)
            .expect("fixture channel exists")
    }

    /// Posts a platform notice (join, pin, thread created).
    pub async fn post_system(&self, channel: ChannelId, content: &str) -> MessageId {
        let mut state = self.state.lock().await;
        let author = self.bot.clone();
        state
            .insert_message(channel, author, content.to_string(), true)
            .expect("fixture channel exists")
    }

    /// Mutates a stored message in place.
    pub async fn edit<F>(&self, channel: ChannelId, id: MessageId, f: F)
    where
        F: FnOnce(&mut ChatMessage),
    {
        let mut state = self.state.lock().await;
        f(state.message_mut(channel, id).expect("fixture message exists"));
    }

    /// Removes a channel without going through the platform API.
    pub async fn remove_channel(&self, channel: ChannelId) {
        let mut state = self.state.lock().await;
        state.channels.remove(&channel);
        state.messages.remove(&channel);
    }

    /// Makes every `op` fail.
    pub async fn fail(&self, op: Operation) {
        self.state.lock().await.failing.insert((op, None));
    }

    /// Makes `op` fail when it targets `channel`.
    pub async fn fail_in(&self, op: Operation, channel: ChannelId) {
        self.state.lock().await.failing.insert((op, Some(channel)));
    }

    pub async fn clear_failures(&self) {
        self.state.lock().await.failing.clear();
    }

    // -- inspection --

    pub async fn channel_info(&self, id: ChannelId) -> Option<ChannelInfo> {
        self.state.lock().await.channels.get(&id).cloned()
    }

    /// Threads whose parent is `parent`.
    pub async fn threads_in(&self, parent: ChannelId) -> Vec<ChannelInfo> {
        let state = self.state.lock().await;
        let mut threads: Vec<_> = state
            .channels
            .values()
            .filter(|c| c.parent_id == Some(parent))
            .cloned()
            .collect();
        threads.sort_by_key(|c| c.id);
        threads
    }

    /// Messages of a channel, oldest first.
    pub async fn messages(&self, channel: ChannelId) -> Vec<ChatMessage> {
        self.state
            .lock()
            .await
            .messages
            .get(&channel)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn stored_message(&self, channel: ChannelId, id: MessageId) -> Option<ChatMessage> {
        self.messages(channel).await.into_iter().find(|m| m.id == id)
    }

    pub async fn buttons(&self, message: MessageId) -> Vec<Button> {
        self.state
            .lock()
            .await
            .buttons
            .get(&message)
            .cloned()
            .unwrap_or_default()
    }

    /// Status the next health checks report.
    pub async fn set_health(&self, health: HealthStatus) {
        self.state.lock().await.health = Some(health);
    }

    /// Number of times the adapter was shut down.
    pub async fn shutdowns(&self) -> usize {
        self.state.lock().await.shutdowns
    }

    /// What a bot message currently shows, after any edits.
    pub async fn rendered(&self, message: MessageId) -> Option<OutboundMessage> {
        self.state.lock().await.rendered.get(&message).cloned()
    }

    /// Every successful `send`, in order.
    pub async fn sent(&self) -> Vec<(ChannelId, OutboundMessage)> {
        self.state.lock().await.sent.clone()
    }

    pub async fn private_replies(&self) -> Vec<String> {
        self.state.lock().await.private_replies.clone()
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.state.lock().await.calls.clone()
    }

    /// Number of recorded calls of `op`.
    pub async fn call_count(&self, op: Operation) -> usize {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter(|c| c.op == op)
            .count()
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockPlatform {
    fn name(&self) -> &str {
        "mock-platform"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, ThreadkeeperError> {
        Ok(self
            .state
            .lock()
            .await
            .health
            .clone()
            .unwrap_or(HealthStatus::Healthy))
    }

    async fn shutdown(&self) -> Result<(), ThreadkeeperError> {
        self.state.lock().await.shutdowns += 1;
        Ok(())
    }
}

#[async_trait]
impl ChatPlatform for MockPlatform {
    async fn current_user(&self) -> Result<ChatUser, ThreadkeeperError> {
        Ok(self.bot.clone())
    }

    async fn channel(&self, id: ChannelId) -> Result<ChannelInfo, ThreadkeeperError> {
        let mut state = self.state.lock().await;
        state.enter(Operation::Channel, Some(id))?;
        state.channel(id).cloned()
    }

    async fn find_text_channel(
        &self,
        guild: GuildId,
        name: &str,
    ) -> Result<Option<ChannelId>, ThreadkeeperError> {
        let mut state = self.state.lock().await;
        state.enter(Operation::FindChannel, None)?;
        Ok(state
            .channels
            .values()
            .find(|c| c.guild_id == Some(guild) && c.kind == ChannelKind::Text && c.name == name)
            .map(|c| c.id))
    }

    async fn create_text_channel(
        &self,
        guild: GuildId,
        name: &str,
        _topic: &str,
    ) -> Result<ChannelId, ThreadkeeperError> {
        self.state
            .lock()
            .await
            .enter(Operation::CreateChannel, None)?;
        Ok(self.add_text_channel(guild, name).await)
    }

    async fn message(
        &self,
        channel: ChannelId,
        id: MessageId,
    ) -> Result<ChatMessage, ThreadkeeperError> {
        let mut state = self.state.lock().await;
        state.enter(Operation::Message, Some(channel))?;
        state.message_mut(channel, id).map(|m| m.clone())
    }

    async fn recent_messages(
        &self,
        channel: ChannelId,
        limit: u8,
    ) -> Result<Vec<ChatMessage>, ThreadkeeperError> {
        let mut state = self.state.lock().await;
        state.enter(Operation::RecentMessages, Some(channel))?;
        state.channel(channel)?;
        Ok(state
            .messages
            .get(&channel)
            .map(|msgs| {
                msgs.iter()
                    .rev()
                    .take(usize::from(limit))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn send(
        &self,
        channel: ChannelId,
        message: OutboundMessage,
    ) -> Result<MessageId, ThreadkeeperError> {
        let mut state = self.state.lock().await;
        state.enter(Operation::Send, Some(channel))?;
        state.ensure_writable(channel)?;
        let content = message.content.clone().unwrap_or_default();
        if content.chars().count() > 2000 {
            return Err(ThreadkeeperError::Platform {
                message: "message content over 2000 characters".into(),
                source: None,
            });
        }
        let id = state.insert_message(channel, self.bot.clone(), content, false)?;
        if let Some(embed) = &message.embed {
            let stored = state.message_mut(channel, id)?;
            stored.embed_count = 1;
            stored.embed_footers = embed.footer.iter().cloned().collect();
        }
        if !message.buttons.is_empty() {
            state.buttons.insert(id, message.buttons.clone());
        }
        state.rendered.insert(id, message.clone());
        state.sent.push((channel, message));
        Ok(id)
    }

    async fn edit_message(
        &self,
        channel: ChannelId,
        message: MessageId,
        edit: OutboundMessage,
    ) -> Result<(), ThreadkeeperError> {
        let mut state = self.state.lock().await;
        state.enter(Operation::EditMessage, Some(channel))?;
        let stored = state.message_mut(channel, message)?;
        if stored.author.id != BOT_USER_ID {
            return Err(ThreadkeeperError::Platform {
                message: format!("cannot edit message {message} by another author"),
                source: None,
            });
        }
        stored.content = edit.content.clone().unwrap_or_default();
        stored.embed_count = usize::from(edit.embed.is_some());
        stored.embed_footers = edit
            .embed
            .as_ref()
            .and_then(|e| e.footer.clone())
            .into_iter()
            .collect();
        if edit.buttons.is_empty() {
            state.buttons.remove(&message);
        } else {
            state.buttons.insert(message, edit.buttons.clone());
        }
        state.rendered.insert(message, edit);
        Ok(())
    }

    async fn delete_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<(), ThreadkeeperError> {
        let mut state = self.state.lock().await;
        state.enter(Operation::DeleteMessage, Some(channel))?;
        let msgs = state
            .messages
            .get_mut(&channel)
            .ok_or_else(|| ThreadkeeperError::not_found("message", message))?;
        let before = msgs.len();
        msgs.retain(|m| m.id != message);
        if msgs.len() == before {
            return Err(ThreadkeeperError::not_found("message", message));
        }
        state.buttons.remove(&message);
        state.rendered.remove(&message);
        Ok(())
    }

    async fn start_thread(
        &self,
        channel: ChannelId,
        message: MessageId,
        name: &str,
        _auto_archive_minutes: u16,
    ) -> Result<ChannelId, ThreadkeeperError> {
        {
            let mut state = self.state.lock().await;
            state.enter(Operation::StartThread, Some(channel))?;
            state.message_mut(channel, message)?;
            if name.chars().count() > 100 {
                return Err(ThreadkeeperError::Platform {
                    message: "thread name over 100 characters".into(),
                    source: None,
                });
            }
        }
        Ok(self.add_thread(channel, name, Some(message)).await)
    }

    async fn set_thread_state(
        &self,
        thread: ChannelId,
        new_state: ThreadState,
    ) -> Result<(), ThreadkeeperError> {
        let mut state = self.state.lock().await;
        state.enter(Operation::SetThreadState, Some(thread))?;
        let info = state
            .channels
            .get_mut(&thread)
            .ok_or_else(|| ThreadkeeperError::not_found("thread", thread))?;
        if !info.is_thread() {
            return Err(ThreadkeeperError::Platform {
                message: format!("{thread} is not a thread"),
                source: None,
            });
        }
        info.thread_state = Some(new_state);
        Ok(())
    }

    async fn delete_channel(&self, channel: ChannelId) -> Result<(), ThreadkeeperError> {
        let mut state = self.state.lock().await;
        state.enter(Operation::DeleteChannel, Some(channel))?;
        state
            .channels
            .remove(&channel)
            .ok_or_else(|| ThreadkeeperError::not_found("channel", channel))?;
        state.messages.remove(&channel);
        Ok(())
    }

    async fn react(
        &self,
        channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> Result<(), ThreadkeeperError> {
        let mut state = self.state.lock().await;
        state.enter(Operation::React, Some(channel))?;
        state.ensure_writable(channel)?;
        let stored = state.message_mut(channel, message)?;
        if !stored.has_own_reaction(emoji) {
            stored.own_reactions.push(emoji.to_string());
        }
        Ok(())
    }

    async fn unreact(
        &self,
        channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> Result<(), ThreadkeeperError> {
        let mut state = self.state.lock().await;
        state.enter(Operation::Unreact, Some(channel))?;
        state.ensure_writable(channel)?;
        let stored = state.message_mut(channel, message)?;
        stored.own_reactions.retain(|e| e != emoji);
        Ok(())
    }

    async fn acknowledge(&self, interaction: &InteractionHandle) -> Result<(), ThreadkeeperError> {
        let mut state = self.state.lock().await;
        state.enter(Operation::Acknowledge, None)?;
        state.acknowledged.insert(interaction.id);
        Ok(())
    }

    async fn reply_private(
        &self,
        interaction: &InteractionHandle,
        content: &str,
    ) -> Result<(), ThreadkeeperError> {
        let mut state = self.state.lock().await;
        state.enter(Operation::ReplyPrivate, None)?;
        if !state.acknowledged.contains(&interaction.id) {
            return Err(ThreadkeeperError::Platform {
                message: "interaction was never acknowledged".into(),
                source: None,
            });
        }
        state.private_replies.push(content.to_string());
        Ok(())
    }

    fn channel_link(&self, guild: Option<GuildId>, channel: ChannelId) -> String {
        match guild {
            Some(guild) => format!("https://chat.test/channels/{guild}/{channel}"),
            None => format!("https://chat.test/channels/@me/{channel}"),
        }
    }

    fn message_link(
        &self,
        guild: Option<GuildId>,
        channel: ChannelId,
        message: MessageId,
    ) -> String {
        format!("{}/{message}", self.channel_link(guild, channel))
    }
}

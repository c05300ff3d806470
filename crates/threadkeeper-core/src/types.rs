// SPDX-FileCopyrightText: 2026 Threadkeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Platform-neutral models shared by the workflow and the platform adapters.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

snowflake!(
    /// Identifier of a channel or thread.
    ChannelId
);
snowflake!(
    /// Identifier of a message.
    MessageId
);
snowflake!(
    /// Identifier of a user account.
    UserId
);
snowflake!(
    /// Identifier of a guild (server).
    GuildId
);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Coarse channel classification; only the thread/non-thread split matters
/// to the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Text,
    Thread,
    Other,
}

/// Lock/archive flags of a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThreadState {
    pub locked: bool,
    pub archived: bool,
}

impl ThreadState {
    pub const OPEN: Self = Self {
        locked: false,
        archived: false,
    };
    pub const CLOSED: Self = Self {
        locked: true,
        archived: true,
    };
}

/// A channel or thread as seen by the workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelInfo {
    pub id: ChannelId,
    pub guild_id: Option<GuildId>,
    pub name: String,
    pub kind: ChannelKind,
    /// Parent channel for threads.
    pub parent_id: Option<ChannelId>,
    /// Message the thread was started from, living in `parent_id`.
    pub starter_message_id: Option<MessageId>,
    /// Lock/archive flags; `None` for non-thread channels.
    pub thread_state: Option<ThreadState>,
}

impl ChannelInfo {
    pub fn is_thread(&self) -> bool {
        self.kind == ChannelKind::Thread
    }
}

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatUser {
    pub id: UserId,
    /// Human-readable tag (`name` or `name#1234`).
    pub tag: String,
    /// Inline mention markup.
    pub mention: String,
    pub bot: bool,
}

/// A file attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub url: String,
}

/// A message fetched from the platform.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
    pub author: ChatUser,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Joins, pins, thread-created notices and similar platform notices.
    pub system: bool,
    pub embed_count: usize,
    /// Footer texts of the message's embeds.
    pub embed_footers: Vec<String>,
    pub attachments: Vec<Attachment>,
    /// Thread started from this message, if any.
    pub thread_id: Option<ChannelId>,
    /// Emoji the current bot account has reacted with.
    pub own_reactions: Vec<String>,
}

impl ChatMessage {
    /// True when the bot has already reacted with `emoji`.
    pub fn has_own_reaction(&self, emoji: &str) -> bool {
        self.own_reactions.iter().any(|e| e == emoji)
    }
}

/// Emoji carried by a reaction event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactionEmoji {
    Unicode(String),
    Custom { name: Option<String> },
}

/// A reaction-added event.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionEvent {
    pub emoji: ReactionEmoji,
    pub user: ChatUser,
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    pub guild_id: Option<GuildId>,
}

/// Handle needed to answer an interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionHandle {
    pub id: u64,
    pub token: String,
}

/// Activation of an interactive control attached to a message.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentActivation {
    pub handle: InteractionHandle,
    pub custom_id: String,
    pub user: ChatUser,
    /// Message the control is attached to.
    pub message: ChatMessage,
}

/// One field of an [`Embed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// A rich embed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Embed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub colour: Option<u32>,
    pub fields: Vec<EmbedField>,
    pub footer: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Embed {
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline: false,
        });
        self
    }
}

/// Visual style of a [`Button`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonStyle {
    Primary,
    Secondary,
    Success,
    Danger,
}

/// An interactive button carrying an opaque custom id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub custom_id: String,
    pub label: String,
    pub emoji: Option<char>,
    pub style: ButtonStyle,
}

/// A message to post.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutboundMessage {
    pub content: Option<String>,
    pub embed: Option<Embed>,
    pub buttons: Vec<Button>,
}

impl OutboundMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn embed(embed: Embed) -> Self {
        Self {
            embed: Some(embed),
            ..Default::default()
        }
    }

    pub fn with_embed(mut self, embed: Embed) -> Self {
        self.embed = Some(embed);
        self
    }
}

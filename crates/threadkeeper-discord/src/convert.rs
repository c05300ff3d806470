// SPDX-FileCopyrightText: 2026 Threadkeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversions between serenity models and the platform-neutral types.

use serenity::all::{
    AutoArchiveDuration, ButtonStyle as DiscordButtonStyle, ChannelType, ComponentInteraction,
    CreateActionRow, CreateButton, CreateEmbed, CreateEmbedFooter, CreateMessage, EditMessage,
    GuildChannel, Message, MessageType, Reaction, ReactionType, Timestamp, User,
};
use serenity::http::HttpError;

use threadkeeper_core::error::ThreadkeeperError;
use threadkeeper_core::types::{
    Attachment, Button, ButtonStyle, ChannelId, ChannelInfo, ChannelKind, ChatMessage, ChatUser,
    ComponentActivation, Embed, GuildId, InteractionHandle, MessageId, OutboundMessage,
    ReactionEmoji, ReactionEvent, ThreadState, UserId,
};

/// Maps a serenity error, turning HTTP 404 into [`ThreadkeeperError::NotFound`].
pub(crate) fn map_err(
    kind: &'static str,
    id: impl ToString,
) -> impl FnOnce(serenity::Error) -> ThreadkeeperError {
    let id = id.to_string();
    move |err| {
        if is_not_found(&err) {
            ThreadkeeperError::not_found(kind, id)
        } else {
            ThreadkeeperError::platform(format!("discord request for {kind} {id} failed"), err)
        }
    }
}

fn is_not_found(err: &serenity::Error) -> bool {
    status_code(err) == Some(404)
}

/// A rejected token; retrying cannot help.
pub(crate) fn is_unauthorized(err: &serenity::Error) -> bool {
    status_code(err) == Some(401)
}

fn status_code(err: &serenity::Error) -> Option<u16> {
    match err {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => {
            Some(response.status_code.as_u16())
        }
        _ => None,
    }
}

pub(crate) fn user(user: &User) -> ChatUser {
    ChatUser {
        id: UserId(user.id.get()),
        tag: user.tag(),
        mention: format!("<@{}>", user.id.get()),
        bot: user.bot,
    }
}

/// Regular posts and replies; everything else (joins, pins, thread-created
/// notices, boosts) is a platform notice.
pub(crate) fn is_system_kind(kind: MessageType) -> bool {
    !matches!(
        kind,
        MessageType::Regular
            | MessageType::InlineReply
            | MessageType::ChatInputCommand
            | MessageType::ContextMenuCommand
    )
}

pub(crate) fn emoji_text(reaction: &ReactionType) -> String {
    match reaction {
        ReactionType::Unicode(text) => text.clone(),
        ReactionType::Custom { name, id, .. } => name.clone().unwrap_or_else(|| id.to_string()),
        other => other.to_string(),
    }
}

pub(crate) fn message(msg: &Message) -> ChatMessage {
    ChatMessage {
        id: MessageId(msg.id.get()),
        channel_id: ChannelId(msg.channel_id.get()),
        guild_id: msg.guild_id.map(|g| GuildId(g.get())),
        author: user(&msg.author),
        content: msg.content.clone(),
        created_at: *msg.timestamp,
        system: is_system_kind(msg.kind),
        embed_count: msg.embeds.len(),
        embed_footers: msg
            .embeds
            .iter()
            .filter_map(|e| e.footer.as_ref().map(|f| f.text.clone()))
            .collect(),
        attachments: msg
            .attachments
            .iter()
            .map(|a| Attachment {
                name: a.filename.clone(),
                url: a.url.clone(),
            })
            .collect(),
        thread_id: msg.thread.as_ref().map(|t| ChannelId(t.id.get())),
        own_reactions: msg
            .reactions
            .iter()
            .filter(|r| r.me)
            .map(|r| emoji_text(&r.reaction_type))
            .collect(),
    }
}

pub(crate) fn channel_kind(kind: ChannelType) -> ChannelKind {
    match kind {
        ChannelType::Text | ChannelType::News => ChannelKind::Text,
        ChannelType::PublicThread | ChannelType::PrivateThread | ChannelType::NewsThread => {
            ChannelKind::Thread
        }
        _ => ChannelKind::Other,
    }
}

pub(crate) fn channel(ch: &GuildChannel) -> ChannelInfo {
    let kind = channel_kind(ch.kind);
    let is_thread = kind == ChannelKind::Thread;
    ChannelInfo {
        id: ChannelId(ch.id.get()),
        guild_id: Some(GuildId(ch.guild_id.get())),
        name: ch.name.clone(),
        kind,
        parent_id: ch.parent_id.map(|p| ChannelId(p.get())),
        // A thread started from a message shares that message's id.
        starter_message_id: is_thread.then(|| MessageId(ch.id.get())),
        thread_state: ch.thread_metadata.as_ref().map(|m| ThreadState {
            locked: m.locked,
            archived: m.archived,
        }),
    }
}

pub(crate) fn reaction_emoji(reaction: &ReactionType) -> ReactionEmoji {
    match reaction {
        ReactionType::Unicode(text) => ReactionEmoji::Unicode(text.clone()),
        ReactionType::Custom { name, .. } => ReactionEmoji::Custom { name: name.clone() },
        _ => ReactionEmoji::Custom { name: None },
    }
}

pub(crate) fn reaction_event(reaction: &Reaction, by: &User) -> ReactionEvent {
    ReactionEvent {
        emoji: reaction_emoji(&reaction.emoji),
        user: user(by),
        channel_id: ChannelId(reaction.channel_id.get()),
        message_id: MessageId(reaction.message_id.get()),
        guild_id: reaction.guild_id.map(|g| GuildId(g.get())),
    }
}

pub(crate) fn activation(component: &ComponentInteraction) -> ComponentActivation {
    ComponentActivation {
        handle: InteractionHandle {
            id: component.id.get(),
            token: component.token.clone(),
        },
        custom_id: component.data.custom_id.clone(),
        user: user(&component.user),
        message: message(&component.message),
    }
}

pub(crate) fn auto_archive(minutes: u16) -> AutoArchiveDuration {
    match minutes {
        0..=60 => AutoArchiveDuration::OneHour,
        61..=1440 => AutoArchiveDuration::OneDay,
        1441..=4320 => AutoArchiveDuration::ThreeDays,
        _ => AutoArchiveDuration::OneWeek,
    }
}

fn button_style(style: ButtonStyle) -> DiscordButtonStyle {
    match style {
        ButtonStyle::Primary => DiscordButtonStyle::Primary,
        ButtonStyle::Secondary => DiscordButtonStyle::Secondary,
        ButtonStyle::Success => DiscordButtonStyle::Success,
        ButtonStyle::Danger => DiscordButtonStyle::Danger,
    }
}

/// One action row holding `buttons`; empty when there are none.
pub(crate) fn action_rows(buttons: &[Button]) -> Vec<CreateActionRow> {
    if buttons.is_empty() {
        return Vec::new();
    }
    let row = buttons
        .iter()
        .map(|b| {
            let button = CreateButton::new(b.custom_id.clone())
                .label(b.label.clone())
                .style(button_style(b.style));
            match b.emoji {
                Some(emoji) => button.emoji(ReactionType::Unicode(emoji.to_string())),
                None => button,
            }
        })
        .collect();
    vec![CreateActionRow::Buttons(row)]
}

pub(crate) fn embed(embed: &Embed) -> CreateEmbed {
    let mut out = CreateEmbed::new();
    if let Some(title) = &embed.title {
        out = out.title(title.clone());
    }
    if let Some(description) = &embed.description {
        out = out.description(description.clone());
    }
    if let Some(colour) = embed.colour {
        out = out.colour(colour);
    }
    for field in &embed.fields {
        out = out.field(field.name.clone(), field.value.clone(), field.inline);
    }
    if let Some(footer) = &embed.footer {
        out = out.footer(CreateEmbedFooter::new(footer.clone()));
    }
    if let Some(at) = embed
        .timestamp
        .and_then(|at| Timestamp::from_unix_timestamp(at.timestamp()).ok())
    {
        out = out.timestamp(at);
    }
    out
}

pub(crate) fn create_message(message: &OutboundMessage) -> CreateMessage {
    let mut out = CreateMessage::new();
    if let Some(content) = &message.content {
        out = out.content(content.clone());
    }
    if let Some(e) = &message.embed {
        out = out.embed(embed(e));
    }
    if !message.buttons.is_empty() {
        out = out.components(action_rows(&message.buttons));
    }
    out
}

/// Full replacement of a message; an empty button list clears its rows.
pub(crate) fn edit_message(edit: &OutboundMessage) -> EditMessage {
    let mut out = EditMessage::new().components(action_rows(&edit.buttons));
    if let Some(content) = &edit.content {
        out = out.content(content.clone());
    }
    if let Some(e) = &edit.embed {
        out = out.embed(embed(e));
    }
    out
}

pub(crate) fn channel_link(guild: Option<GuildId>, channel: ChannelId) -> String {
    match guild {
        Some(guild) => format!("https://discord.com/channels/{guild}/{channel}"),
        None => format!("https://discord.com/channels/@me/{channel}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_kinds() {
        assert!(!is_system_kind(MessageType::Regular));
        assert!(!is_system_kind(MessageType::InlineReply));
        assert!(is_system_kind(MessageType::ThreadCreated));
        assert!(is_system_kind(MessageType::PinsAdd));
        assert!(is_system_kind(MessageType::MemberJoin));
    }

    #[test]
    fn channel_kinds() {
        assert_eq!(channel_kind(ChannelType::Text), ChannelKind::Text);
        assert_eq!(channel_kind(ChannelType::PublicThread), ChannelKind::Thread);
        assert_eq!(channel_kind(ChannelType::PrivateThread), ChannelKind::Thread);
        assert_eq!(channel_kind(ChannelType::Voice), ChannelKind::Other);
    }

    #[test]
    fn unicode_and_custom_emoji() {
        assert_eq!(
            reaction_emoji(&ReactionType::Unicode("✅".into())),
            ReactionEmoji::Unicode("✅".into())
        );
        assert_eq!(emoji_text(&ReactionType::Unicode("📋".into())), "📋");
    }

    #[test]
    fn auto_archive_buckets() {
        assert_eq!(auto_archive(60), AutoArchiveDuration::OneHour);
        assert_eq!(auto_archive(1440), AutoArchiveDuration::OneDay);
        assert_eq!(auto_archive(4320), AutoArchiveDuration::ThreeDays);
        assert_eq!(auto_archive(10080), AutoArchiveDuration::OneWeek);
    }

    #[test]
    fn outbound_message_serializes_embed_and_button() {
        let outbound = OutboundMessage {
            content: Some("## Thread Completed ✅".into()),
            embed: Some(
                Embed {
                    title: Some("✅ Task Completed: build".into()),
                    footer: Some("Task ID: 123456 · ref:99".into()),
                    colour: Some(0x00FF00),
                    ..Default::default()
                }
                .field("📊 Thread Stats", "Messages: 3"),
            ),
            buttons: vec![Button {
                custom_id: "tk1_reopen_99_5".into(),
                label: "Reopen Thread".into(),
                emoji: Some('🔄'),
                style: ButtonStyle::Primary,
            }],
        };

        let json = serde_json::to_string(&create_message(&outbound)).unwrap();
        assert!(json.contains("## Thread Completed"));
        assert!(json.contains("✅ Task Completed: build"));
        assert!(json.contains("ref:99"));
        assert!(json.contains("Messages: 3"));
        assert!(json.contains("tk1_reopen_99_5"));
    }

    #[test]
    fn edit_carries_replaced_links_and_control() {
        let edit = OutboundMessage {
            content: Some("## Thread Completed ✅".into()),
            embed: Some(Embed::default().field(
                "🔗 Links",
                "• [Original Thread](https://discord.com/channels/1/2)\n• [Archive Copy](https://discord.com/channels/1/3)",
            )),
            buttons: vec![Button {
                custom_id: "tk1_reopen_2_4".into(),
                label: "Reopen Thread".into(),
                emoji: None,
                style: ButtonStyle::Primary,
            }],
        };

        let json = serde_json::to_string(&edit_message(&edit)).unwrap();
        assert!(json.contains("Archive Copy"));
        assert!(json.contains("https://discord.com/channels/1/3"));
        assert!(json.contains("tk1_reopen_2_4"));
    }

    #[test]
    fn no_buttons_means_no_rows() {
        assert!(action_rows(&[]).is_empty());
    }

    #[test]
    fn links() {
        assert_eq!(
            channel_link(Some(GuildId(1)), ChannelId(2)),
            "https://discord.com/channels/1/2"
        );
        assert_eq!(
            channel_link(None, ChannelId(2)),
            "https://discord.com/channels/@me/2"
        );
    }
}

// SPDX-FileCopyrightText: 2026 Threadkeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reaction qualification.
//!
//! A reaction triggers an archive run only when it comes from a human, is
//! placed on a message in the monitored channel or one of its threads, uses
//! a checkmark emoji and the message does not already carry the bot's
//! [`TRIGGER_MARK`].

use strum::Display;
use tracing::{debug, info};

use threadkeeper_core::error::ThreadkeeperError;
use threadkeeper_core::traits::ChatPlatform;
use threadkeeper_core::types::{ChannelId, ChannelInfo, ChatMessage, ReactionEmoji, ReactionEvent, UserId};

/// Emoji accepted as "this is done".
pub const CHECKMARK_EMOJIS: [&str; 7] = ["✅", "✓", "☑️", "🗸", "☑", "✔️", "✔"];

/// Reaction the bot leaves on a message it has already processed.
pub const TRIGGER_MARK: &str = "📋";

/// True when the reaction's emoji is in [`CHECKMARK_EMOJIS`]. Custom emoji
/// never qualify, whatever their name.
pub fn is_checkmark(emoji: &ReactionEmoji) -> bool {
    match emoji {
        ReactionEmoji::Unicode(text) => CHECKMARK_EMOJIS.contains(&text.as_str()),
        ReactionEmoji::Custom { .. } => false,
    }
}

/// Why a reaction was not acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum IgnoreReason {
    BotUser,
    NotCheckmark,
    OutsideScope,
    AlreadyMarked,
}

/// Result of running a reaction through the detector.
#[derive(Debug, Clone)]
pub enum Detection {
    /// The reaction triggers an archive of `message`, posted in `channel`.
    Qualified {
        message: ChatMessage,
        channel: ChannelInfo,
    },
    Ignored(IgnoreReason),
}

/// Decides whether reaction events should start an archive run.
#[derive(Debug, Clone)]
pub struct TriggerDetector {
    monitored: ChannelId,
    bot_user: UserId,
}

impl TriggerDetector {
    pub fn new(monitored: ChannelId, bot_user: UserId) -> Self {
        Self {
            monitored,
            bot_user,
        }
    }

    /// Checks that need nothing beyond the event itself.
    pub fn screen(&self, event: &ReactionEvent) -> Option<IgnoreReason> {
        if event.user.bot || event.user.id == self.bot_user {
            return Some(IgnoreReason::BotUser);
        }
        if !is_checkmark(&event.emoji) {
            return Some(IgnoreReason::NotCheckmark);
        }
        None
    }

    /// True for the monitored channel itself and for threads under it.
    pub fn in_scope(&self, channel: &ChannelInfo) -> bool {
        let effective = if channel.is_thread() {
            channel.parent_id.unwrap_or(channel.id)
        } else {
            channel.id
        };
        effective == self.monitored
            || (channel.is_thread() && channel.parent_id == Some(self.monitored))
    }

    /// Runs every qualification step, fetching the channel and message as
    /// needed.
    pub async fn detect(
        &self,
        platform: &dyn ChatPlatform,
        event: &ReactionEvent,
    ) -> Result<Detection, ThreadkeeperError> {
        if let Some(reason) = self.screen(event) {
            debug!(message_id = %event.message_id, %reason, "reaction ignored");
            return Ok(Detection::Ignored(reason));
        }

        let channel = platform.channel(event.channel_id).await?;
        if !self.in_scope(&channel) {
            debug!(channel_id = %channel.id, "reaction outside monitored channel");
            return Ok(Detection::Ignored(IgnoreReason::OutsideScope));
        }

        let message = platform.message(event.channel_id, event.message_id).await?;
        if message.has_own_reaction(TRIGGER_MARK) {
            info!(message_id = %message.id, "message already archived");
            return Ok(Detection::Ignored(IgnoreReason::AlreadyMarked));
        }

        Ok(Detection::Qualified { message, channel })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use threadkeeper_core::types::{ChannelKind, ChatUser, MessageId};

    fn user(id: u64, bot: bool) -> ChatUser {
        ChatUser {
            id: UserId(id),
            tag: format!("user{id}"),
            mention: format!("<@{id}>"),
            bot,
        }
    }

    fn event(emoji: &str, who: ChatUser) -> ReactionEvent {
        ReactionEvent {
            emoji: ReactionEmoji::Unicode(emoji.into()),
            user: who,
            channel_id: ChannelId(10),
            message_id: MessageId(100),
            guild_id: None,
        }
    }

    fn channel(id: u64, kind: ChannelKind, parent: Option<u64>) -> ChannelInfo {
        ChannelInfo {
            id: ChannelId(id),
            guild_id: None,
            name: "c".into(),
            kind,
            parent_id: parent.map(ChannelId),
            starter_message_id: None,
            thread_state: None,
        }
    }

    #[test]
    fn every_listed_checkmark_qualifies() {
        for emoji in CHECKMARK_EMOJIS {
            assert!(is_checkmark(&ReactionEmoji::Unicode(emoji.into())), "{emoji}");
        }
        assert!(!is_checkmark(&ReactionEmoji::Unicode("👍".into())));
        assert!(!is_checkmark(&ReactionEmoji::Custom {
            name: Some("white_check_mark".into())
        }));
    }

    #[test]
    fn screen_rejects_bots_and_other_emoji() {
        let detector = TriggerDetector::new(ChannelId(10), UserId(1));
        assert_eq!(detector.screen(&event("✅", user(1, false))), Some(IgnoreReason::BotUser));
        assert_eq!(detector.screen(&event("✅", user(7, true))), Some(IgnoreReason::BotUser));
        assert_eq!(
            detector.screen(&event("👍", user(7, false))),
            Some(IgnoreReason::NotCheckmark)
        );
        assert_eq!(detector.screen(&event("✔", user(7, false))), None);
    }

    #[test]
    fn scope_covers_channel_and_its_threads() {
        let detector = TriggerDetector::new(ChannelId(10), UserId(1));
        assert!(detector.in_scope(&channel(10, ChannelKind::Text, None)));
        assert!(detector.in_scope(&channel(55, ChannelKind::Thread, Some(10))));
        assert!(!detector.in_scope(&channel(11, ChannelKind::Text, None)));
        assert!(!detector.in_scope(&channel(56, ChannelKind::Thread, Some(11))));
    }

    #[test]
    fn ignore_reasons_render_snake_case() {
        assert_eq!(IgnoreReason::AlreadyMarked.to_string(), "already_marked");
    }
}

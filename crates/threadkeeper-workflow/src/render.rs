// SPDX-FileCopyrightText: 2026 Threadkeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text and embeds posted by the workflow.

use chrono::{DateTime, Utc};

use threadkeeper_core::types::{ChannelInfo, ChatMessage, ChatUser, Embed, OutboundMessage};

use crate::correlation::{correlation_tag, short_task_id};
use crate::stats::ThreadStats;

/// Embed colour for completion records.
pub const COMPLETED_COLOUR: u32 = 0x00FF00;

/// Last message of every transcript.
pub const CLOSING_MARKER: &str = "--- End of Thread Content ---";

/// Platform cap on thread names.
pub const MAX_THREAD_NAME: usize = 100;

const MAX_EMBED_TITLE: usize = 256;
const STARTER_SNIPPET: usize = 200;
const STANDALONE_SNIPPET: usize = 1000;

/// `Mon, Jan 5, 2026, 03:04 PM UTC`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%a, %b %-d, %Y, %I:%M %p UTC").to_string()
}

/// First `max` characters of `text`, with `...` appended when cut.
pub fn snippet(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{head}...")
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Name of the transcript thread for a source thread.
pub fn transcript_thread_name(source_name: &str) -> String {
    truncate_chars(&format!("✅ {source_name}"), MAX_THREAD_NAME)
}

/// Warning posted first in a transcript whose window hit the fetch limit.
pub fn truncation_warning(fetch_limit: u8) -> String {
    format!(
        "⚠️ **Note:** This thread had more than {fetch_limit} messages. \
         Only the most recent {fetch_limit} are archived here."
    )
}

/// One replayed message: author, time, content, then embed and attachment
/// notes.
pub fn transcript_entry(message: &ChatMessage) -> String {
    let mut entry = format!(
        "**{}** ({}):\n{}",
        message.author.tag,
        format_timestamp(message.created_at),
        message.content
    );
    if message.embed_count > 0 {
        entry.push_str("\n[Message contained embeds]");
    }
    if !message.attachments.is_empty() {
        entry.push_str("\n**Attachments:**");
        for attachment in &message.attachments {
            entry.push_str(&format!("\n- {}: {}", attachment.name, attachment.url));
        }
    }
    entry
}

/// Inputs to the completion-channel header for an archived thread.
#[derive(Debug)]
pub struct ArchiveHeader<'a> {
    pub source: &'a ChannelInfo,
    pub actor: &'a ChatUser,
    pub starter: Option<&'a ChatMessage>,
    pub stats: &'a ThreadStats,
    pub completed_at: DateTime<Utc>,
    pub source_link: String,
    /// Link to the transcript thread, known once it has been started.
    pub archive_link: Option<String>,
}

impl ArchiveHeader<'_> {
    pub fn render(&self) -> OutboundMessage {
        let content = format!(
            "## Thread Completed ✅\n**Thread:** {}\n**Marked complete by:** {}\n**Completed at:** {}",
            self.source.name,
            self.actor.tag,
            format_timestamp(self.completed_at)
        );

        let mut embed = Embed {
            title: Some(snippet(
                &format!("✅ Task Completed: {}", self.source.name),
                MAX_EMBED_TITLE - 3,
            )),
            description: Some(format!(
                "This thread was marked as completed by {} and archived.",
                self.actor.mention
            )),
            colour: Some(COMPLETED_COLOUR),
            footer: Some(format!(
                "Task ID: {} · {}",
                short_task_id(self.source.id),
                correlation_tag(self.source.id)
            )),
            timestamp: Some(self.completed_at),
            ..Default::default()
        }
        .field("📊 Thread Stats", self.stats.summary());

        if let Some(starter) = self.starter {
            let text = if starter.content.trim().is_empty() {
                "(no text)".to_string()
            } else {
                snippet(starter.content.trim(), STARTER_SNIPPET)
            };
            embed = embed.field("🧵 Started By", format!("{}: {}", starter.author.tag, text));
        }

        let mut links = format!("• [Original Thread]({})", self.source_link);
        if let Some(archive) = &self.archive_link {
            links.push_str(&format!("\n• [Archive Copy]({archive})"));
        }
        embed = embed.field("🔗 Links", links);

        OutboundMessage::text(content).with_embed(embed)
    }
}

/// Posted in the source thread right before it is locked.
pub fn closure_notice(actor: &ChatUser, anchor_link: &str) -> String {
    format!(
        "✅ This thread was marked complete by {} and archived: {anchor_link}\n\
         Use the **Reopen Thread** button on the archive record to bring it back.",
        actor.mention
    )
}

/// Inputs to the completion notice for a message that is not in a thread.
#[derive(Debug)]
pub struct StandaloneNotice<'a> {
    pub message: &'a ChatMessage,
    pub actor: &'a ChatUser,
    pub completed_at: DateTime<Utc>,
    pub message_link: String,
}

impl StandaloneNotice<'_> {
    fn task_text(&self) -> String {
        let trimmed = self.message.content.trim();
        if !trimmed.is_empty() {
            snippet(trimmed, STANDALONE_SNIPPET)
        } else if self.message.embed_count > 0 {
            "(Message contained embeds)".to_string()
        } else if !self.message.attachments.is_empty() {
            "(Message contained attachments)".to_string()
        } else {
            "(Empty message)".to_string()
        }
    }

    pub fn render(&self) -> OutboundMessage {
        OutboundMessage::text(format!(
            "## Task Completed ✅\n**Task:** {}\n**Originally posted by:** {}\n\
             **Marked complete by:** {}\n**Completed at:** {}\n**Original Message Link:** {}",
            self.task_text(),
            self.message.author.tag,
            self.actor.tag,
            format_timestamp(self.completed_at),
            self.message_link
        ))
    }

    /// Short embed posted after the notice; `notice_link` points at it.
    pub fn summary(&self, notice_link: &str) -> OutboundMessage {
        let details = snippet(&self.task_text(), STARTER_SNIPPET);
        OutboundMessage::embed(
            Embed {
                title: Some("✅ Task Completed".to_string()),
                description: Some(format!(
                    "This task was marked as completed by {} and archived.",
                    self.actor.mention
                )),
                colour: Some(COMPLETED_COLOUR),
                footer: Some(format!("Task ID: {}", short_task_id(self.message.id))),
                timestamp: Some(self.completed_at),
                ..Default::default()
            }
            .field("📝 Task Details", details)
            .field(
                "🔗 Links",
                format!(
                    "• [Original Message]({})\n• [Archive Copy]({notice_link})",
                    self.message_link
                ),
            ),
        )
    }
}

/// Posted inside a reopened thread.
pub fn reopened_in_thread(actor: &ChatUser) -> String {
    format!("🔄 This thread was reopened by {}.", actor.mention)
}

/// Posted in the parent channel of a reopened thread.
pub fn reopened_in_parent(thread_name: &str, actor: &ChatUser, thread_link: &str) -> String {
    format!(
        "🔄 **{thread_name}** was reopened by {}: {thread_link}",
        actor.mention
    )
}

/// Posted in the monitored channel when the source thread is gone.
pub fn reopened_without_source(actor: &ChatUser, source_thread: &str) -> String {
    format!(
        "🔄 {} reopened an archived task, but its original thread ({source_thread}) \
         could not be found.",
        actor.mention
    )
}

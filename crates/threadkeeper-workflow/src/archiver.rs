// SPDX-FileCopyrightText: 2026 Threadkeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Moves a completed thread into the completion channel.
//!
//! A run resolves the completion channel and the source thread, fetches
//! the thread's message window once, publishes an anchor carrying the
//! reopen control, replays the window into a transcript thread started from
//! the anchor and finally closes the source. Once the anchor exists, a
//! failed transcript post is logged and skipped rather than aborting the
//! run.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use threadkeeper_config::model::CompletionTarget;
use threadkeeper_core::error::ThreadkeeperError;
use threadkeeper_core::traits::ChatPlatform;
use threadkeeper_core::types::{
    ChannelId, ChannelInfo, ChatMessage, ChatUser, GuildId, MessageId, OutboundMessage,
    ThreadState,
};

use crate::chunk::split_into_chunks;
use crate::notifier::Notifier;
use crate::render::{
    closure_notice, transcript_entry, transcript_thread_name, truncation_warning, ArchiveHeader,
    StandaloneNotice, CLOSING_MARKER,
};
use crate::settings::WorkflowSettings;
use crate::stats::ThreadStats;
use crate::trigger::TRIGGER_MARK;

/// What a completed archive run produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ArchiveOutcome {
    /// A thread was copied and closed.
    Archived(ArchiveRecord),
    /// The trigger message had no thread; a notice was posted instead.
    Standalone {
        completion_channel: ChannelId,
        notice: MessageId,
    },
}

/// Ids and counters of an archived thread.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveRecord {
    pub source_thread: ChannelId,
    pub completion_channel: ChannelId,
    pub anchor: MessageId,
    pub transcript: ChannelId,
    pub stats: ThreadStats,
    /// Reopen control attached to the anchor.
    pub control_attached: bool,
    /// Transcript posts that went through.
    pub posted: usize,
    /// Transcript posts that failed and were skipped.
    pub failed_posts: usize,
}

/// Runs archive operations against a platform.
#[derive(Clone)]
pub struct Archiver {
    platform: Arc<dyn ChatPlatform>,
    settings: Arc<WorkflowSettings>,
    notifier: Notifier,
}

impl Archiver {
    pub fn new(platform: Arc<dyn ChatPlatform>, settings: Arc<WorkflowSettings>) -> Self {
        let notifier = Notifier::new(Arc::clone(&platform));
        Self {
            platform,
            settings,
            notifier,
        }
    }

    /// Resolves the completion channel: by id when configured as one,
    /// otherwise by name within `guild`.
    pub async fn resolve_completion_channel(
        &self,
        guild: Option<GuildId>,
    ) -> Result<ChannelId, ThreadkeeperError> {
        match &self.settings.completion {
            CompletionTarget::Id(id) => {
                let channel = self.platform.channel(*id).await.map_err(|err| match err {
                    ThreadkeeperError::NotFound { .. } => {
                        ThreadkeeperError::not_found("completion channel", id)
                    }
                    other => other,
                })?;
                Ok(channel.id)
            }
            CompletionTarget::Name(name) => {
                let guild = guild.ok_or_else(|| {
                    ThreadkeeperError::not_found("completion channel", format!("#{name}"))
                })?;
                self.platform
                    .find_text_channel(guild, name)
                    .await?
                    .ok_or_else(|| {
                        ThreadkeeperError::not_found(
                            "completion channel",
                            self.settings.completion.describe(Some(guild)),
                        )
                    })
            }
        }
    }

    /// Archives whatever `trigger` belongs to. `channel` is the channel the
    /// trigger message was posted in.
    pub async fn archive(
        &self,
        trigger: &ChatMessage,
        channel: &ChannelInfo,
        actor: &ChatUser,
    ) -> Result<ArchiveOutcome, ThreadkeeperError> {
        let guild = trigger.guild_id.or(channel.guild_id);
        let completion = self.resolve_completion_channel(guild).await?;

        match self.resolve_source(trigger, channel).await? {
            Some((source, starter)) => {
                let record = self
                    .archive_thread(trigger, &source, starter.as_ref(), actor, completion)
                    .await?;
                Ok(ArchiveOutcome::Archived(record))
            }
            None => self.archive_standalone(trigger, actor, completion).await,
        }
    }

    /// The thread to archive and its starter message, or `None` when the
    /// trigger message is not part of a thread.
    async fn resolve_source(
        &self,
        trigger: &ChatMessage,
        channel: &ChannelInfo,
    ) -> Result<Option<(ChannelInfo, Option<ChatMessage>)>, ThreadkeeperError> {
        if channel.is_thread() {
            let starter = match (channel.parent_id, channel.starter_message_id) {
                (_, Some(id)) if id == trigger.id => Some(trigger.clone()),
                (Some(parent), Some(id)) => match self.platform.message(parent, id).await {
                    Ok(message) => Some(message),
                    Err(err) => {
                        debug!(thread_id = %channel.id, error = %err, "starter message unavailable");
                        None
                    }
                },
                _ => None,
            };
            return Ok(Some((channel.clone(), starter)));
        }

        let Some(thread_id) = trigger.thread_id else {
            return Ok(None);
        };
        match self.platform.channel(thread_id).await {
            Ok(thread) if thread.is_thread() => Ok(Some((thread, Some(trigger.clone())))),
            Ok(_) => Ok(None),
            Err(err) if err.is_resolution() => {
                warn!(%thread_id, error = %err, "thread on trigger message is gone, archiving message only");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    async fn archive_thread(
        &self,
        trigger: &ChatMessage,
        source: &ChannelInfo,
        starter: Option<&ChatMessage>,
        actor: &ChatUser,
        completion: ChannelId,
    ) -> Result<ArchiveRecord, ThreadkeeperError> {
        let guild = source.guild_id.or(trigger.guild_id);

        let mut window = self
            .platform
            .recent_messages(source.id, self.settings.fetch_limit)
            .await?;
        window.sort_by_key(|m| (m.created_at, m.id));
        let stats = ThreadStats::compute(&window, self.settings.fetch_limit);

        let mut header = ArchiveHeader {
            source,
            actor,
            starter,
            stats: &stats,
            completed_at: Utc::now(),
            source_link: self.platform.channel_link(guild, source.id),
            archive_link: None,
        };
        let anchor = self
            .notifier
            .publish_anchor(completion, header.render())
            .await?;

        let transcript = match self
            .platform
            .start_thread(
                completion,
                anchor,
                &transcript_thread_name(&source.name),
                self.settings.auto_archive_minutes,
            )
            .await
        {
            Ok(id) => id,
            Err(err) => {
                if let Err(cleanup) = self.platform.delete_message(completion, anchor).await {
                    warn!(%anchor, error = %cleanup, "failed to remove orphaned anchor");
                }
                return Err(err);
            }
        };

        header.archive_link = Some(self.platform.channel_link(guild, transcript));
        let control_attached = match self
            .notifier
            .finalize_anchor(completion, anchor, source.id, header.render())
            .await
        {
            Ok(()) => true,
            Err(err) => {
                warn!(%anchor, error = %err, "failed to attach reopen control");
                false
            }
        };

        let (posted, failed_posts) = self.replay(transcript, &window, stats.truncated).await;

        let anchor_link = self.platform.message_link(guild, completion, anchor);
        self.close_source(source.id, trigger, actor, &anchor_link).await;

        info!(
            source_thread = %source.id,
            %transcript,
            messages = stats.message_count,
            posted,
            failed_posts,
            "thread archived"
        );

        Ok(ArchiveRecord {
            source_thread: source.id,
            completion_channel: completion,
            anchor,
            transcript,
            stats,
            control_attached,
            posted,
            failed_posts,
        })
    }

    /// Replays `window` into the transcript thread. Returns posted and
    /// failed counts.
    async fn replay(
        &self,
        transcript: ChannelId,
        window: &[ChatMessage],
        truncated: bool,
    ) -> (usize, usize) {
        let mut posts = Vec::new();
        if truncated {
            posts.push(truncation_warning(self.settings.fetch_limit));
        }
        for message in window.iter().filter(|m| !m.system) {
            posts.extend(
                split_into_chunks(&transcript_entry(message), self.settings.chunk_limit)
                    .into_iter()
                    .filter(|chunk| !chunk.trim().is_empty()),
            );
        }
        posts.push(CLOSING_MARKER.to_string());

        let mut posted = 0;
        let mut failed = 0;
        for text in posts {
            match self
                .platform
                .send(transcript, OutboundMessage::text(text))
                .await
            {
                Ok(_) => posted += 1,
                Err(err) => {
                    failed += 1;
                    warn!(%transcript, error = %err, "transcript post failed, skipping");
                }
            }
            self.pace().await;
        }
        (posted, failed)
    }

    /// Notice, then marker, then lock: the notice has to land while the
    /// thread still accepts messages.
    async fn close_source(
        &self,
        source: ChannelId,
        trigger: &ChatMessage,
        actor: &ChatUser,
        anchor_link: &str,
    ) {
        if let Err(err) = self
            .platform
            .send(source, OutboundMessage::text(closure_notice(actor, anchor_link)))
            .await
        {
            warn!(thread_id = %source, error = %err, "failed to post closure notice");
        }
        self.mark_trigger(trigger).await;
        if let Err(err) = self
            .platform
            .set_thread_state(source, ThreadState::CLOSED)
            .await
        {
            warn!(thread_id = %source, error = %err, "failed to lock and archive thread");
        }
    }

    async fn archive_standalone(
        &self,
        trigger: &ChatMessage,
        actor: &ChatUser,
        completion: ChannelId,
    ) -> Result<ArchiveOutcome, ThreadkeeperError> {
        let notice = StandaloneNotice {
            message: trigger,
            actor,
            completed_at: Utc::now(),
            message_link: self
                .platform
                .message_link(trigger.guild_id, trigger.channel_id, trigger.id),
        };
        let notice_id = self.platform.send(completion, notice.render()).await?;
        self.mark_trigger(trigger).await;

        if self.settings.summary_embed {
            let notice_link = self
                .platform
                .message_link(trigger.guild_id, completion, notice_id);
            if let Err(err) = self
                .platform
                .send(completion, notice.summary(&notice_link))
                .await
            {
                warn!(error = %err, "failed to post completion summary");
            }
        }

        info!(message_id = %trigger.id, %completion, "standalone message archived");
        Ok(ArchiveOutcome::Standalone {
            completion_channel: completion,
            notice: notice_id,
        })
    }

    async fn mark_trigger(&self, trigger: &ChatMessage) {
        if let Err(err) = self
            .platform
            .react(trigger.channel_id, trigger.id, TRIGGER_MARK)
            .await
        {
            warn!(message_id = %trigger.id, error = %err, "failed to add trigger mark");
        }
    }

    async fn pace(&self) {
        if !self.settings.pacing.is_zero() {
            tokio::time::sleep(self.settings.pacing).await;
        }
    }
}

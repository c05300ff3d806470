// SPDX-FileCopyrightText: 2026 Threadkeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end workflow testing.
//!
//! `TestHarness` sets up a guild with a monitored channel and a completion
//! channel on a [`MockPlatform`] and wires a [`Workflow`] to it. Provides
//! `react()` and `press()` to drive the workflow the way gateway events do.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use threadkeeper_config::model::{ArchiveConfig, CompletionTarget};
use threadkeeper_core::types::{
    ChannelId, ChatMessage, ChatUser, ComponentActivation, GuildId, HealthStatus, InteractionHandle,
    MessageId, ReactionEmoji, ReactionEvent,
};
use threadkeeper_core::ThreadkeeperError;
use threadkeeper_workflow::{ComponentOutcome, ReactionOutcome, Workflow, WorkflowSettings};

use crate::mock_platform::MockPlatform;

/// Guild every harness lives in.
pub const TEST_GUILD: GuildId = GuildId(42);

/// Name of the harness completion channel.
pub const COMPLETION_NAME: &str = "completed-tasks";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    archive: ArchiveConfig,
    completion_by_id: bool,
    create_completion: bool,
    health: Option<HealthStatus>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            archive: ArchiveConfig {
                pacing_ms: 0,
                ..ArchiveConfig::default()
            },
            completion_by_id: false,
            create_completion: true,
            health: None,
        }
    }

    /// Cap the number of messages fetched per thread.
    pub fn with_fetch_limit(mut self, limit: u8) -> Self {
        self.archive.fetch_limit = limit;
        self
    }

    /// Set the transcript chunk size.
    pub fn with_chunk_limit(mut self, limit: usize) -> Self {
        self.archive.chunk_limit = limit;
        self
    }

    /// Delay between transcript posts; zero unless set.
    pub fn with_pacing_ms(mut self, ms: u64) -> Self {
        self.archive.pacing_ms = ms;
        self
    }

    /// Skip the summary embed on standalone notices.
    pub fn without_summary_embed(mut self) -> Self {
        self.archive.summary_embed = false;
        self
    }

    /// Address the completion channel by id instead of by name.
    pub fn with_completion_by_id(mut self) -> Self {
        self.completion_by_id = true;
        self
    }

    /// Leave the completion channel out of the guild.
    pub fn without_completion_channel(mut self) -> Self {
        self.create_completion = false;
        self
    }

    /// Platform health reported when the workflow connects.
    pub fn with_health(mut self, health: HealthStatus) -> Self {
        self.health = Some(health);
        self
    }

    /// Build the harness.
    pub async fn build(self) -> Result<TestHarness, ThreadkeeperError> {
        let platform = Arc::new(MockPlatform::new());
        if let Some(health) = self.health {
            platform.set_health(health).await;
        }
        let monitored = platform.add_text_channel(TEST_GUILD, "tasks").await;
        let completion = if self.create_completion {
            Some(platform.add_text_channel(TEST_GUILD, COMPLETION_NAME).await)
        } else {
            None
        };

        let target = match (self.completion_by_id, completion) {
            (true, Some(id)) => CompletionTarget::Id(id),
            (true, None) => CompletionTarget::Id(ChannelId(999_999)),
            (false, _) => CompletionTarget::Name(COMPLETION_NAME.to_string()),
        };

        let mut settings = WorkflowSettings::new(monitored, target);
        settings.fetch_limit = self.archive.fetch_limit;
        settings.chunk_limit = self.archive.chunk_limit;
        settings.pacing = Duration::from_millis(self.archive.pacing_ms);
        settings.summary_embed = self.archive.summary_embed;

        let workflow = Workflow::connect(platform.clone(), settings).await?;

        Ok(TestHarness {
            platform,
            workflow,
            monitored,
            completion,
            next_interaction: AtomicU64::new(1),
        })
    }
}

/// A complete workflow over an in-memory platform.
pub struct TestHarness {
    pub platform: Arc<MockPlatform>,
    pub workflow: Workflow,
    pub monitored: ChannelId,
    /// `None` when built without a completion channel.
    pub completion: Option<ChannelId>,
    next_interaction: AtomicU64,
}

impl TestHarness {
    /// Create a builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Completion channel id; panics when built without one.
    pub fn completion(&self) -> ChannelId {
        self.completion.expect("harness has a completion channel")
    }

    /// Posts a starter message in the monitored channel, opens a thread on
    /// it and posts `replies` inside. Returns `(starter, thread)`.
    pub async fn thread_with_replies(
        &self,
        name: &str,
        author: &ChatUser,
        replies: &[(&ChatUser, &str)],
    ) -> (MessageId, ChannelId) {
        let starter = self.platform.post(self.monitored, author, name).await;
        let thread = self
            .platform
            .add_thread(self.monitored, name, Some(starter))
            .await;
        for (who, text) in replies {
            self.platform.post(thread, who, text).await;
        }
        (starter, thread)
    }

    /// Simulates `user` adding `emoji` to a message.
    pub async fn react(
        &self,
        user: &ChatUser,
        channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> Result<ReactionOutcome, ThreadkeeperError> {
        let event = ReactionEvent {
            emoji: ReactionEmoji::Unicode(emoji.to_string()),
            user: user.clone(),
            channel_id: channel,
            message_id: message,
            guild_id: Some(TEST_GUILD),
        };
        self.workflow.process_reaction(&event).await
    }

    /// Simulates `user` pressing the control with `custom_id` on `message`.
    pub async fn press(
        &self,
        user: &ChatUser,
        channel: ChannelId,
        message: MessageId,
        custom_id: &str,
    ) -> Result<ComponentOutcome, ThreadkeeperError> {
        let message = self
            .platform
            .stored_message(channel, message)
            .await
            .ok_or_else(|| ThreadkeeperError::not_found("message", message))?;
        self.press_on(user, message, custom_id).await
    }

    /// Like [`TestHarness::press`], with the message payload as delivered.
    /// Gateway payloads can leave out fields the stored message has.
    pub async fn press_on(
        &self,
        user: &ChatUser,
        message: ChatMessage,
        custom_id: &str,
    ) -> Result<ComponentOutcome, ThreadkeeperError> {
        let id = self
            .next_interaction
            .fetch_add(1, Ordering::Relaxed);
        let activation = ComponentActivation {
            handle: InteractionHandle {
                id,
                token: format!("interaction-{id}"),
            },
            custom_id: custom_id.to_string(),
            user: user.clone(),
            message,
        };
        self.workflow.process_component(&activation).await
    }
}

// SPDX-FileCopyrightText: 2026 Threadkeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runtime settings derived from the loaded configuration.

use std::time::Duration;

use threadkeeper_config::model::{ArchiveConfig, CompletionTarget, ThreadkeeperConfig};
use threadkeeper_core::error::ThreadkeeperError;
use threadkeeper_core::types::ChannelId;

/// Settings shared by every stage of the workflow.
#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    pub monitored_channel: ChannelId,
    pub completion: CompletionTarget,
    pub completion_topic: String,
    pub fetch_limit: u8,
    pub chunk_limit: usize,
    pub pacing: Duration,
    pub auto_archive_minutes: u16,
    pub summary_embed: bool,
    pub sweep_limit: u8,
}

impl WorkflowSettings {
    /// Settings with default archive tuning.
    pub fn new(monitored_channel: ChannelId, completion: CompletionTarget) -> Self {
        Self::with_archive(
            monitored_channel,
            completion,
            "Automatically archived completed tasks and threads".to_string(),
            &ArchiveConfig::default(),
        )
    }

    /// Builds settings from a validated configuration.
    pub fn from_config(config: &ThreadkeeperConfig) -> Result<Self, ThreadkeeperError> {
        let monitored = config.discord.monitored_channel().ok_or_else(|| {
            ThreadkeeperError::Config("discord.monitored_channel_id is required".into())
        })?;
        Ok(Self::with_archive(
            monitored,
            config.discord.completion_target(),
            config.discord.completion_channel_topic.clone(),
            &config.archive,
        ))
    }

    fn with_archive(
        monitored_channel: ChannelId,
        completion: CompletionTarget,
        completion_topic: String,
        archive: &ArchiveConfig,
    ) -> Self {
        Self {
            monitored_channel,
            completion,
            completion_topic,
            fetch_limit: archive.fetch_limit,
            chunk_limit: archive.chunk_limit,
            pacing: Duration::from_millis(archive.pacing_ms),
            auto_archive_minutes: archive.thread_auto_archive_minutes,
            summary_embed: archive.summary_embed,
            sweep_limit: archive.sweep_limit,
        }
    }

    /// Disables the delay between transcript posts.
    pub fn without_pacing(mut self) -> Self {
        self.pacing = Duration::ZERO;
        self
    }
}

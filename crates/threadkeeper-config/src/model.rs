// SPDX-FileCopyrightText: 2026 Threadkeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Deserializer, Serialize};
use threadkeeper_core::types::{ChannelId, GuildId};

/// Top-level Threadkeeper configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections default to sensible values; `serve`
/// additionally requires a bot token and a monitored channel.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ThreadkeeperConfig {
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Discord connection and channel settings.
    #[serde(default)]
    pub discord: DiscordConfig,

    /// Archive workflow tuning.
    #[serde(default)]
    pub archive: ArchiveConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Discord integration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DiscordConfig {
    /// Bot token. `None` prevents `serve` from starting.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Channel whose messages and threads are watched for checkmarks.
    #[serde(default)]
    pub monitored_channel_id: Option<u64>,

    /// Completion channel, as a numeric id or a channel name.
    #[serde(
        default = "default_completion_channel",
        deserialize_with = "string_or_number"
    )]
    pub completion_channel: String,

    /// Topic used when the completion channel has to be created.
    #[serde(default = "default_completion_channel_topic")]
    pub completion_channel_topic: String,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            monitored_channel_id: None,
            completion_channel: default_completion_channel(),
            completion_channel_topic: default_completion_channel_topic(),
        }
    }
}

fn default_completion_channel() -> String {
    "completed-tasks".to_string()
}

fn default_completion_channel_topic() -> String {
    "Automatically archived completed tasks and threads".to_string()
}

/// Accepts `completion_channel = 123` as well as `"123"`; environment
/// values that look numeric arrive as integers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}

impl DiscordConfig {
    /// The monitored channel, if configured.
    pub fn monitored_channel(&self) -> Option<ChannelId> {
        self.monitored_channel_id.filter(|id| *id != 0).map(ChannelId)
    }

    /// How the completion channel is addressed.
    pub fn completion_target(&self) -> CompletionTarget {
        CompletionTarget::parse(&self.completion_channel)
    }
}

/// The completion channel, addressed either by id or by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionTarget {
    Id(ChannelId),
    Name(String),
}

impl CompletionTarget {
    /// Numeric strings are ids; anything else is a channel name.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<u64>() {
            Ok(id) if id != 0 => Self::Id(ChannelId(id)),
            _ => Self::Name(trimmed.trim_start_matches('#').to_string()),
        }
    }

    /// Human-readable form for log lines.
    pub fn describe(&self, guild: Option<GuildId>) -> String {
        match (self, guild) {
            (Self::Id(id), _) => id.to_string(),
            (Self::Name(name), Some(guild)) => format!("#{name} in guild {guild}"),
            (Self::Name(name), None) => format!("#{name}"),
        }
    }
}

/// Archive workflow configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ArchiveConfig {
    /// Messages fetched from a source thread (platform page bound, max 100).
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: u8,

    /// Per-message size threshold for replayed transcript text.
    #[serde(default = "default_chunk_limit")]
    pub chunk_limit: usize,

    /// Delay between consecutive transcript posts, in milliseconds.
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,

    /// Auto-archive duration of the transcript thread, in minutes.
    #[serde(default = "default_thread_auto_archive_minutes")]
    pub thread_auto_archive_minutes: u16,

    /// Post a short summary embed alongside standalone completion notices.
    #[serde(default = "default_summary_embed")]
    pub summary_embed: bool,

    /// Completion-channel messages scanned for correlated leftovers on reopen.
    #[serde(default = "default_sweep_limit")]
    pub sweep_limit: u8,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            fetch_limit: default_fetch_limit(),
            chunk_limit: default_chunk_limit(),
            pacing_ms: default_pacing_ms(),
            thread_auto_archive_minutes: default_thread_auto_archive_minutes(),
            summary_embed: default_summary_embed(),
            sweep_limit: default_sweep_limit(),
        }
    }
}

fn default_fetch_limit() -> u8 {
    100
}

fn default_chunk_limit() -> usize {
    1900
}

fn default_pacing_ms() -> u64 {
    250
}

fn default_thread_auto_archive_minutes() -> u16 {
    10080
}

fn default_summary_embed() -> bool {
    true
}

fn default_sweep_limit() -> u8 {
    50
}

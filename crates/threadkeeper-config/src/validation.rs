// SPDX-FileCopyrightText: 2026 Threadkeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that serde attributes cannot express:
//! platform bounds on fetch and message sizes, the fixed set of thread
//! auto-archive durations, and the settings `serve` cannot run without.

use crate::diagnostic::ConfigError;
use crate::model::{CompletionTarget, ThreadkeeperConfig};

/// Largest page the platform returns for a single history fetch.
pub const MAX_FETCH_LIMIT: u8 = 100;

/// Hard cap on the length of a single message.
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Thread auto-archive durations the platform accepts, in minutes.
pub const AUTO_ARCHIVE_MINUTES: [u16; 4] = [60, 1440, 4320, 10080];

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ThreadkeeperConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.logging.level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.level `{}` is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    match config.discord.completion_target() {
        CompletionTarget::Name(name) if name.is_empty() => {
            errors.push(ConfigError::Validation {
                message: "discord.completion_channel must not be empty".to_string(),
            });
        }
        CompletionTarget::Name(name) if name.chars().all(|c| c.is_ascii_digit()) => {
            errors.push(ConfigError::Validation {
                message: format!("discord.completion_channel `{name}` is not a valid channel id"),
            });
        }
        _ => {}
    }

    let archive = &config.archive;
    if archive.fetch_limit == 0 || archive.fetch_limit > MAX_FETCH_LIMIT {
        errors.push(ConfigError::Validation {
            message: format!(
                "archive.fetch_limit must be between 1 and {MAX_FETCH_LIMIT}, got {}",
                archive.fetch_limit
            ),
        });
    }

    if archive.chunk_limit == 0 || archive.chunk_limit > MAX_MESSAGE_LENGTH {
        errors.push(ConfigError::Validation {
            message: format!(
                "archive.chunk_limit must be between 1 and {MAX_MESSAGE_LENGTH}, got {}",
                archive.chunk_limit
            ),
        });
    }

    if !AUTO_ARCHIVE_MINUTES.contains(&archive.thread_auto_archive_minutes) {
        errors.push(ConfigError::Validation {
            message: format!(
                "archive.thread_auto_archive_minutes must be one of 60, 1440, 4320, 10080, got {}",
                archive.thread_auto_archive_minutes
            ),
        });
    }

    if archive.sweep_limit > MAX_FETCH_LIMIT {
        errors.push(ConfigError::Validation {
            message: format!(
                "archive.sweep_limit must be at most {MAX_FETCH_LIMIT}, got {}",
                archive.sweep_limit
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks the settings required to connect and watch a channel.
///
/// Kept separate from [`validate_config`] so `threadkeeper config` can show a
/// partial configuration while `serve` refuses to start without them.
pub fn validate_for_serve(config: &ThreadkeeperConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    match config.discord.bot_token.as_deref().map(str::trim) {
        None => errors.push(ConfigError::MissingKey {
            key: "discord.bot_token".to_string(),
        }),
        Some("") => errors.push(ConfigError::Validation {
            message: "discord.bot_token cannot be empty".to_string(),
        }),
        Some(_) => {}
    }

    if config.discord.monitored_channel().is_none() {
        errors.push(ConfigError::MissingKey {
            key: "discord.monitored_channel_id".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

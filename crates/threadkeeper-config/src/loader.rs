// SPDX-FileCopyrightText: 2026 Threadkeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./threadkeeper.toml` > `~/.config/threadkeeper/threadkeeper.toml`
//! > `/etc/threadkeeper/threadkeeper.toml`, with environment variable overrides via
//! the `THREADKEEPER_` prefix and the bare `DISCORD_TOKEN` / `TARGET_CHANNEL_ID` /
//! `COMPLETION_CHANNEL_ID` variables older deployments set in `.env`.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ThreadkeeperConfig;

/// System-wide config file location.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/threadkeeper/threadkeeper.toml";

/// Local config file name, looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "threadkeeper.toml";

/// Env vars recognised without the `THREADKEEPER_` prefix.
const LEGACY_ENV_KEYS: [(&str, &str); 3] = [
    ("DISCORD_TOKEN", "discord.bot_token"),
    ("TARGET_CHANNEL_ID", "discord.monitored_channel_id"),
    ("COMPLETION_CHANNEL_ID", "discord.completion_channel"),
];

/// User-level config file location.
pub fn user_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("threadkeeper").join(LOCAL_CONFIG_FILE))
        .unwrap_or_default()
}

/// Config files in merge order, lowest precedence first. The local file is
/// absolute so it matches the path figment records for it.
pub fn config_file_paths() -> Vec<PathBuf> {
    let local = std::env::current_dir()
        .map(|dir| dir.join(LOCAL_CONFIG_FILE))
        .unwrap_or_else(|_| PathBuf::from(LOCAL_CONFIG_FILE));
    vec![PathBuf::from(SYSTEM_CONFIG_PATH), user_config_path(), local]
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/threadkeeper/threadkeeper.toml` (system-wide)
/// 3. `~/.config/threadkeeper/threadkeeper.toml` (user XDG config)
/// 4. `./threadkeeper.toml` (local directory)
/// 5. `DISCORD_TOKEN`, `TARGET_CHANNEL_ID`, `COMPLETION_CHANNEL_ID`
/// 6. `THREADKEEPER_*` environment variables
pub fn load_config() -> Result<ThreadkeeperConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no environment).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ThreadkeeperConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ThreadkeeperConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ThreadkeeperConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ThreadkeeperConfig::default()))
        .merge(Toml::file(path))
        .merge(legacy_env_provider())
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ThreadkeeperConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(legacy_env_provider())
        .merge(env_provider())
}

/// Maps `THREADKEEPER_SECTION_KEY` onto `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `THREADKEEPER_DISCORD_BOT_TOKEN` must become
/// `discord.bot_token`, not `discord.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("THREADKEEPER_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("logging_", "logging.", 1)
            .replacen("discord_", "discord.", 1)
            .replacen("archive_", "archive.", 1);
        mapped.into()
    })
}

fn legacy_env_provider() -> Env {
    let names: Vec<&str> = LEGACY_ENV_KEYS.iter().map(|(env, _)| *env).collect();
    Env::raw().only(&names).map(|key| {
        LEGACY_ENV_KEYS
            .iter()
            .find(|(env, _)| key.as_str().eq_ignore_ascii_case(env))
            .map(|(_, path)| (*path).into())
            .unwrap_or_else(|| key.as_str().to_string().into())
    })
}

// SPDX-FileCopyrightText: 2026 Threadkeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `threadkeeper serve`: connects to Discord and runs the archive workflow
//! until a shutdown signal arrives.

use std::sync::Arc;

use threadkeeper_config::ThreadkeeperConfig;
use threadkeeper_core::traits::platform::ChatPlatform;
use threadkeeper_core::ThreadkeeperError;
use threadkeeper_discord::{gateway, DiscordPlatform};
use threadkeeper_workflow::{Workflow, WorkflowSettings};
use tracing::{info, warn};

use crate::shutdown;

/// Runs the bot. Expects a configuration that passed serve validation.
pub async fn run_serve(config: ThreadkeeperConfig) -> Result<(), ThreadkeeperError> {
    init_tracing(&config.logging.level);

    let token = bot_token(&config)?;
    let settings = WorkflowSettings::from_config(&config)?;

    info!(
        monitored = %settings.monitored_channel,
        completion = %settings.completion.describe(None),
        "starting threadkeeper serve"
    );

    let platform: Arc<dyn ChatPlatform> = Arc::new(DiscordPlatform::new(&token));
    let workflow = Arc::new(Workflow::connect(platform, settings).await?);

    let cancel = shutdown::install_signal_handler();
    let stopped = gateway::run(&token, Arc::clone(&workflow), cancel).await;
    if let Err(err) = workflow.shutdown().await {
        warn!(error = %err, "platform adapter shutdown failed");
    }
    stopped?;

    info!("threadkeeper stopped");
    Ok(())
}

/// `RUST_LOG` wins; otherwise our crates log at `level` and everything
/// else at warn.
fn init_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

fn bot_token(config: &ThreadkeeperConfig) -> Result<String, ThreadkeeperError> {
    config
        .discord
        .bot_token
        .clone()
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| ThreadkeeperError::Config("discord.bot_token is not set".into()))
}

fn default_filter(level: &str) -> String {
    format!("threadkeeper={level},serenity=warn,warn")
}

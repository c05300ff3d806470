// SPDX-FileCopyrightText: 2026 Threadkeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway connection lifecycle.

use std::sync::Arc;

use serenity::all::{Client, GatewayIntents};
use tokio_util::sync::CancellationToken;
use tracing::info;

use threadkeeper_core::error::ThreadkeeperError;
use threadkeeper_workflow::Workflow;

use crate::handler::Handler;

/// Gateway intents the bot needs: guild and thread metadata, message
/// history with content, and reactions.
pub fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::MESSAGE_CONTENT
}

/// Connects to the gateway and dispatches events until `cancel` fires or
/// the connection fails for good.
pub async fn run(
    token: &str,
    workflow: Arc<Workflow>,
    cancel: CancellationToken,
) -> Result<(), ThreadkeeperError> {
    let mut client = Client::builder(token, intents())
        .event_handler(Handler::new(workflow))
        .await
        .map_err(|e| ThreadkeeperError::platform("failed to build Discord client", e))?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        cancel.cancelled().await;
        info!("shutting down gateway connection");
        shard_manager.shutdown_all().await;
    });

    info!("connecting to Discord gateway");
    client
        .start()
        .await
        .map_err(|e| ThreadkeeperError::platform("Discord gateway connection failed", e))
}

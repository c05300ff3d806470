// SPDX-FileCopyrightText: 2026 Threadkeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serenity event handler feeding gateway events into the workflow.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::all::{Context, EventHandler, Interaction, Reaction, Ready};
use tracing::{debug, error, info, warn};

use threadkeeper_core::types::GuildId;
use threadkeeper_workflow::Workflow;

use crate::convert;

/// Routes reactions and button presses to a shared [`Workflow`].
pub struct Handler {
    workflow: Arc<Workflow>,
}

impl Handler {
    pub fn new(workflow: Arc<Workflow>) -> Self {
        Self { workflow }
    }

    /// Creates the completion channel in `guild` when it is addressed by
    /// name and missing. Failures only affect this guild.
    async fn prepare_completion_channel(&self, guild: GuildId) {
        match self.workflow.ensure_completion_channel(guild).await {
            Ok(Some(channel)) => debug!(%guild, %channel, "completion channel ready"),
            Ok(None) => {}
            Err(err) => error!(%guild, error = %err, "failed to prepare completion channel"),
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            user = %ready.user.tag(),
            guilds = ready.guilds.len(),
            "connected to Discord"
        );
        for guild in &ready.guilds {
            self.prepare_completion_channel(GuildId(guild.id.get())).await;
        }
    }

    async fn reaction_add(&self, ctx: Context, reaction: Reaction) {
        let user = match reaction.user(&ctx).await {
            Ok(user) => user,
            Err(err) => {
                warn!(
                    message_id = %reaction.message_id,
                    error = %err,
                    "could not resolve reacting user"
                );
                return;
            }
        };
        self.workflow
            .on_reaction(convert::reaction_event(&reaction, &user))
            .await;
    }

    async fn interaction_create(&self, _ctx: Context, interaction: Interaction) {
        if let Interaction::Component(component) = interaction {
            self.workflow
                .on_component(convert::activation(&component))
                .await;
        }
    }
}

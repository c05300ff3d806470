// SPDX-FileCopyrightText: 2026 Threadkeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entry points called by the platform event handler.

use std::sync::Arc;

use tracing::{error, info, warn};

use threadkeeper_config::model::CompletionTarget;
use threadkeeper_core::error::ThreadkeeperError;
use threadkeeper_core::traits::{ChatPlatform, PluginAdapter};
use threadkeeper_core::types::{
    ChannelId, ComponentActivation, GuildId, HealthStatus, ReactionEvent, UserId,
};

use crate::archiver::{ArchiveOutcome, Archiver};
use crate::claim::ClaimSet;
use crate::correlation::ControlAction;
use crate::reopener::{ReopenReport, Reopener};
use crate::settings::WorkflowSettings;
use crate::trigger::{Detection, IgnoreReason, TriggerDetector};

/// Result of handling a reaction event.
#[derive(Debug, Clone, PartialEq)]
pub enum ReactionOutcome {
    Ignored(IgnoreReason),
    /// Another run for the same message is in flight.
    AlreadyClaimed,
    Completed(ArchiveOutcome),
}

/// Result of handling a control activation.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentOutcome {
    Reopened(ReopenReport),
    /// The control id could not be decoded; the user was told so.
    Rejected(String),
}

/// The archive/reopen workflow bound to one platform.
pub struct Workflow {
    platform: Arc<dyn ChatPlatform>,
    settings: Arc<WorkflowSettings>,
    detector: TriggerDetector,
    claims: ClaimSet,
    archiver: Archiver,
    reopener: Reopener,
}

impl Workflow {
    /// Builds a workflow, asking the platform who the bot is.
    ///
    /// Fails when the platform reports itself unhealthy; a degraded
    /// platform is logged and used anyway.
    pub async fn connect(
        platform: Arc<dyn ChatPlatform>,
        settings: WorkflowSettings,
    ) -> Result<Self, ThreadkeeperError> {
        match platform.health_check().await? {
            HealthStatus::Healthy => {
                info!(adapter = platform.name(), version = %platform.version(), "platform healthy");
            }
            HealthStatus::Degraded(reason) => {
                warn!(adapter = platform.name(), %reason, "platform degraded");
            }
            HealthStatus::Unhealthy(reason) => {
                return Err(ThreadkeeperError::Platform {
                    message: format!("{} adapter is unhealthy: {reason}", platform.name()),
                    source: None,
                });
            }
        }
        let me = platform.current_user().await?;
        info!(bot = %me.tag, monitored = %settings.monitored_channel, "workflow ready");
        Ok(Self::new(platform, settings, me.id))
    }

    pub fn new(platform: Arc<dyn ChatPlatform>, settings: WorkflowSettings, bot_user: UserId) -> Self {
        let settings = Arc::new(settings);
        Self {
            detector: TriggerDetector::new(settings.monitored_channel, bot_user),
            claims: ClaimSet::new(),
            archiver: Archiver::new(Arc::clone(&platform), Arc::clone(&settings)),
            reopener: Reopener::new(Arc::clone(&platform), Arc::clone(&settings), bot_user),
            platform,
            settings,
        }
    }

    /// Releases the platform adapter. Call once events have stopped.
    pub async fn shutdown(&self) -> Result<(), ThreadkeeperError> {
        self.platform.shutdown().await?;
        info!(adapter = self.platform.name(), "platform adapter shut down");
        Ok(())
    }

    pub fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }

    pub fn claims(&self) -> &ClaimSet {
        &self.claims
    }

    /// Handles a reaction event; errors are logged, never propagated.
    pub async fn on_reaction(&self, event: ReactionEvent) {
        if let Err(err) = self.process_reaction(&event).await {
            error!(
                channel_id = %event.channel_id,
                message_id = %event.message_id,
                error = %err,
                "archive run failed"
            );
        }
    }

    /// Qualifies a reaction and, when it qualifies, archives its message.
    pub async fn process_reaction(
        &self,
        event: &ReactionEvent,
    ) -> Result<ReactionOutcome, ThreadkeeperError> {
        if let Some(reason) = self.detector.screen(event) {
            return Ok(ReactionOutcome::Ignored(reason));
        }

        let Some(_claim) = self.claims.try_claim(event.message_id) else {
            info!(message_id = %event.message_id, "archive already in progress");
            return Ok(ReactionOutcome::AlreadyClaimed);
        };

        let (message, channel) = match self.detector.detect(self.platform.as_ref(), event).await? {
            Detection::Qualified { message, channel } => (message, channel),
            Detection::Ignored(reason) => return Ok(ReactionOutcome::Ignored(reason)),
        };

        info!(
            message_id = %message.id,
            channel_id = %channel.id,
            user = %event.user.tag,
            "checkmark received, archiving"
        );
        let outcome = self.archiver.archive(&message, &channel, &event.user).await?;
        Ok(ReactionOutcome::Completed(outcome))
    }

    /// Handles a control activation; errors are logged, never propagated.
    pub async fn on_component(&self, activation: ComponentActivation) {
        if let Err(err) = self.process_component(&activation).await {
            error!(custom_id = %activation.custom_id, error = %err, "control handling failed");
        }
    }

    /// Acknowledges the activation, runs the requested action and replies
    /// privately with the result.
    pub async fn process_component(
        &self,
        activation: &ComponentActivation,
    ) -> Result<ComponentOutcome, ThreadkeeperError> {
        if let Err(err) = self.platform.acknowledge(&activation.handle).await {
            warn!(custom_id = %activation.custom_id, error = %err, "failed to acknowledge control");
        }

        let action = match activation.custom_id.parse::<ControlAction>() {
            Ok(action) => action,
            Err(err) => {
                warn!(custom_id = %activation.custom_id, error = %err, "rejected control");
                let reply = "⚠️ This control is no longer valid, so nothing was changed.";
                self.platform.reply_private(&activation.handle, reply).await?;
                return Ok(ComponentOutcome::Rejected(err.to_string()));
            }
        };

        match action {
            ControlAction::Reopen(token) => {
                info!(
                    source_thread = %token.source_thread,
                    user = %activation.user.tag,
                    "reopen requested"
                );
                let report = self.reopener.reopen(activation, token).await;
                self.platform
                    .reply_private(&activation.handle, &report.summary())
                    .await?;
                Ok(ComponentOutcome::Reopened(report))
            }
        }
    }

    /// Makes sure the completion channel exists in `guild`, creating it by
    /// name when it is configured as a name. Returns the channel, or `None`
    /// when an id-addressed channel does not exist.
    pub async fn ensure_completion_channel(
        &self,
        guild: GuildId,
    ) -> Result<Option<ChannelId>, ThreadkeeperError> {
        match self.archiver.resolve_completion_channel(Some(guild)).await {
            Ok(id) => Ok(Some(id)),
            Err(ThreadkeeperError::NotFound { .. }) => match &self.settings.completion {
                CompletionTarget::Name(name) => {
                    let id = self
                        .platform
                        .create_text_channel(guild, name, &self.settings.completion_topic)
                        .await?;
                    info!(%guild, channel = %id, name = %name, "created completion channel");
                    Ok(Some(id))
                }
                CompletionTarget::Id(id) => {
                    warn!(channel = %id, "configured completion channel does not exist");
                    Ok(None)
                }
            },
            Err(err) => Err(err),
        }
    }
}

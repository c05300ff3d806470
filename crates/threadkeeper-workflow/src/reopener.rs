// SPDX-FileCopyrightText: 2026 Threadkeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reverses an archive run when its reopen control is activated.
//!
//! Every step runs regardless of earlier failures and records its own
//! outcome, so the invoking user learns exactly what did and did not happen.

use std::fmt;
use std::sync::Arc;

use strum::Display;
use tracing::{info, warn};

use threadkeeper_core::error::ThreadkeeperError;
use threadkeeper_core::traits::ChatPlatform;
use threadkeeper_core::types::{
    ChannelId, ChannelInfo, ComponentActivation, OutboundMessage, ThreadState, UserId,
};

use crate::correlation::{message_references, ReopenToken};
use crate::render::{reopened_in_parent, reopened_in_thread, reopened_without_source};
use crate::settings::WorkflowSettings;
use crate::trigger::TRIGGER_MARK;

/// The steps of a reopen, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ReopenStep {
    #[strum(serialize = "remove archive record")]
    DeleteAnchor,
    #[strum(serialize = "remove related messages")]
    SweepRecords,
    #[strum(serialize = "delete transcript thread")]
    DeleteTranscript,
    #[strum(serialize = "unlock original thread")]
    UnlockSource,
    #[strum(serialize = "clear completion marks")]
    ClearTriggerMark,
    #[strum(serialize = "announce reopen")]
    Announce,
}

/// What happened to one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Done,
    /// Nothing to do, e.g. the object was already gone.
    Skipped(String),
    Failed(String),
}

impl StepOutcome {
    fn from_result(result: Result<(), ThreadkeeperError>) -> Self {
        match result {
            Ok(()) => Self::Done,
            Err(ThreadkeeperError::NotFound { kind, .. }) => {
                Self::Skipped(format!("{kind} already gone"))
            }
            Err(err) => Self::Failed(err.to_string()),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Done => f.write_str("done"),
            Self::Skipped(why) => write!(f, "skipped ({why})"),
            Self::Failed(why) => write!(f, "failed ({why})"),
        }
    }
}

/// Aggregated result of a reopen.
#[derive(Debug, Clone, PartialEq)]
pub struct ReopenReport {
    pub source_thread: ChannelId,
    /// Name and link of the source thread when it could be resolved.
    pub source: Option<(String, String)>,
    pub steps: Vec<(ReopenStep, StepOutcome)>,
    /// Correlated messages removed from the completion channel.
    pub swept: usize,
}

impl ReopenReport {
    fn new(source_thread: ChannelId) -> Self {
        Self {
            source_thread,
            source: None,
            steps: Vec::new(),
            swept: 0,
        }
    }

    fn record(&mut self, step: ReopenStep, outcome: StepOutcome) {
        if let StepOutcome::Failed(why) = &outcome {
            warn!(source_thread = %self.source_thread, %step, reason = %why, "reopen step failed");
        }
        self.steps.push((step, outcome));
    }

    pub fn outcome(&self, step: ReopenStep) -> Option<&StepOutcome> {
        self.steps.iter().find(|(s, _)| *s == step).map(|(_, o)| o)
    }

    /// The source was found and no step failed.
    pub fn fully_reopened(&self) -> bool {
        self.source.is_some() && !self.steps.iter().any(|(_, o)| o.is_failure())
    }

    /// Private reply for the user who pressed the control.
    pub fn summary(&self) -> String {
        if self.fully_reopened() {
            let (name, link) = self.source.as_ref().map_or(("the thread", ""), |(n, l)| {
                (n.as_str(), l.as_str())
            });
            return format!("✅ **{name}** has been reopened: {link}");
        }

        let mut text = String::from("⚠️ The thread was only partially reopened.");
        if self.source.is_none() {
            text.push_str(&format!(
                "\nThe original thread ({}) could not be found.",
                self.source_thread
            ));
        }
        for (step, outcome) in self.steps.iter().filter(|(_, o)| o.is_failure()) {
            text.push_str(&format!("\n- {step}: {outcome}"));
        }
        text
    }
}

/// Runs reopen operations against a platform.
#[derive(Clone)]
pub struct Reopener {
    platform: Arc<dyn ChatPlatform>,
    settings: Arc<WorkflowSettings>,
    bot_user: UserId,
}

impl Reopener {
    pub fn new(
        platform: Arc<dyn ChatPlatform>,
        settings: Arc<WorkflowSettings>,
        bot_user: UserId,
    ) -> Self {
        Self {
            platform,
            settings,
            bot_user,
        }
    }

    /// Reopens the thread named by `token`. `activation.message` is the
    /// anchor the control sits on.
    pub async fn reopen(
        &self,
        activation: &ComponentActivation,
        token: ReopenToken,
    ) -> ReopenReport {
        let completion = activation.message.channel_id;
        let mut report = ReopenReport::new(token.source_thread);

        let transcript = self.find_transcript(activation, token).await;

        let deleted = self.platform.delete_message(completion, token.anchor).await;
        report.record(ReopenStep::DeleteAnchor, StepOutcome::from_result(deleted));

        let swept = self.sweep(completion, token, &mut report).await;
        report.record(ReopenStep::SweepRecords, swept);

        let transcript_outcome = match transcript {
            Ok(thread) => StepOutcome::from_result(self.platform.delete_channel(thread).await),
            Err(why) => StepOutcome::Failed(why),
        };
        report.record(ReopenStep::DeleteTranscript, transcript_outcome);

        let source = match self.platform.channel(token.source_thread).await {
            Ok(source) => Some(source),
            Err(err) => {
                report.record(ReopenStep::UnlockSource, StepOutcome::Failed(err.to_string()));
                report.record(
                    ReopenStep::ClearTriggerMark,
                    StepOutcome::Skipped("original thread unavailable".into()),
                );
                None
            }
        };

        if let Some(source) = &source {
            let guild = source.guild_id.or(activation.message.guild_id);
            report.source = Some((
                source.name.clone(),
                self.platform.channel_link(guild, source.id),
            ));
            let unlocked = self.unlock(source).await;
            report.record(ReopenStep::UnlockSource, unlocked);
            let cleared = self.clear_marks(source).await;
            report.record(ReopenStep::ClearTriggerMark, cleared);
        }

        let announced = self.announce(activation, source.as_ref(), token).await;
        report.record(ReopenStep::Announce, announced);

        info!(
            source_thread = %token.source_thread,
            fully = report.fully_reopened(),
            swept = report.swept,
            "reopen finished"
        );
        report
    }

    /// Transcript thread started from the anchor. Interaction payloads may
    /// omit the thread, so a missing one is looked up on the stored anchor.
    async fn find_transcript(
        &self,
        activation: &ComponentActivation,
        token: ReopenToken,
    ) -> Result<ChannelId, String> {
        if activation.message.id == token.anchor {
            if let Some(thread) = activation.message.thread_id {
                return Ok(thread);
            }
        }
        match self
            .platform
            .message(activation.message.channel_id, token.anchor)
            .await
        {
            Ok(anchor) => anchor
                .thread_id
                .ok_or_else(|| "archive record has no transcript thread".to_string()),
            Err(err) => {
                warn!(anchor = %token.anchor, error = %err, "anchor lookup failed");
                Err(format!("transcript thread could not be located: {err}"))
            }
        }
    }

    /// Deletes bot messages in the completion channel tagged with the
    /// source thread.
    async fn sweep(
        &self,
        completion: ChannelId,
        token: ReopenToken,
        report: &mut ReopenReport,
    ) -> StepOutcome {
        let recent = match self
            .platform
            .recent_messages(completion, self.settings.sweep_limit)
            .await
        {
            Ok(recent) => recent,
            Err(err) => return StepOutcome::Failed(err.to_string()),
        };

        let mut failures = 0;
        for message in recent.iter().filter(|m| {
            m.author.id == self.bot_user
                && m.id != token.anchor
                && message_references(m, token.source_thread)
        }) {
            match self.platform.delete_message(completion, message.id).await {
                Ok(()) => report.swept += 1,
                Err(err) => {
                    failures += 1;
                    warn!(message_id = %message.id, error = %err, "failed to sweep message");
                }
            }
        }

        if failures == 0 {
            StepOutcome::Done
        } else {
            StepOutcome::Failed(format!("{failures} related message(s) could not be removed"))
        }
    }

    async fn unlock(&self, source: &ChannelInfo) -> StepOutcome {
        if source.thread_state == Some(ThreadState::OPEN) {
            return StepOutcome::Skipped("already open".into());
        }
        StepOutcome::from_result(
            self.platform
                .set_thread_state(source.id, ThreadState::OPEN)
                .await,
        )
    }

    /// Removes the marker from the starter message and from any marked
    /// message in the thread's window.
    async fn clear_marks(&self, source: &ChannelInfo) -> StepOutcome {
        let mut failures = Vec::new();

        if let (Some(parent), Some(starter)) = (source.parent_id, source.starter_message_id) {
            if let Err(err) = self.platform.unreact(parent, starter, TRIGGER_MARK).await {
                if !matches!(err, ThreadkeeperError::NotFound { .. }) {
                    failures.push(err.to_string());
                }
            }
        }

        match self
            .platform
            .recent_messages(source.id, self.settings.fetch_limit)
            .await
        {
            Ok(window) => {
                for message in window.iter().filter(|m| m.has_own_reaction(TRIGGER_MARK)) {
                    if let Err(err) = self
                        .platform
                        .unreact(source.id, message.id, TRIGGER_MARK)
                        .await
                    {
                        failures.push(err.to_string());
                    }
                }
            }
            Err(err) => failures.push(err.to_string()),
        }

        if failures.is_empty() {
            StepOutcome::Done
        } else {
            StepOutcome::Failed(failures.join("; "))
        }
    }

    async fn announce(
        &self,
        activation: &ComponentActivation,
        source: Option<&ChannelInfo>,
        token: ReopenToken,
    ) -> StepOutcome {
        let actor = &activation.user;
        let Some(source) = source else {
            let text = reopened_without_source(actor, &token.source_thread.to_string());
            return StepOutcome::from_result(
                self.platform
                    .send(self.settings.monitored_channel, OutboundMessage::text(text))
                    .await
                    .map(|_| ()),
            );
        };

        let mut failures = Vec::new();
        if let Err(err) = self
            .platform
            .send(source.id, OutboundMessage::text(reopened_in_thread(actor)))
            .await
        {
            failures.push(err.to_string());
        }

        if let Some(parent) = source.parent_id {
            let guild = source.guild_id.or(activation.message.guild_id);
            let link = self.platform.channel_link(guild, source.id);
            if let Err(err) = self
                .platform
                .send(
                    parent,
                    OutboundMessage::text(reopened_in_parent(&source.name, actor, &link)),
                )
                .await
            {
                failures.push(err.to_string());
            }
        }

        if failures.is_empty() {
            StepOutcome::Done
        } else {
            StepOutcome::Failed(failures.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(steps: Vec<(ReopenStep, StepOutcome)>, resolved: bool) -> ReopenReport {
        ReopenReport {
            source_thread: ChannelId(77),
            source: resolved.then(|| ("Fix the build".to_string(), "https://x/77".to_string())),
            steps,
            swept: 0,
        }
    }

    #[test]
    fn skipped_steps_still_count_as_full_reopen() {
        let report = report(
            vec![
                (ReopenStep::DeleteAnchor, StepOutcome::Done),
                (
                    ReopenStep::UnlockSource,
                    StepOutcome::Skipped("already open".into()),
                ),
            ],
            true,
        );
        assert!(report.fully_reopened());
        assert_eq!(report.summary(), "✅ **Fix the build** has been reopened: https://x/77");
    }

    #[test]
    fn failures_are_listed() {
        let report = report(
            vec![
                (ReopenStep::DeleteAnchor, StepOutcome::Done),
                (
                    ReopenStep::DeleteTranscript,
                    StepOutcome::Failed("missing permission".into()),
                ),
            ],
            true,
        );
        assert!(!report.fully_reopened());
        let summary = report.summary();
        assert!(summary.contains("partially reopened"));
        assert!(summary.contains("delete transcript thread: failed (missing permission)"));
        assert!(!summary.contains("remove archive record"));
    }

    #[test]
    fn unresolved_source_is_partial() {
        let report = report(vec![(ReopenStep::DeleteAnchor, StepOutcome::Done)], false);
        assert!(!report.fully_reopened());
        assert!(report.summary().contains("(77) could not be found"));
    }

    #[test]
    fn not_found_maps_to_skipped() {
        let outcome = StepOutcome::from_result(Err(ThreadkeeperError::not_found("message", 1)));
        assert_eq!(outcome, StepOutcome::Skipped("message already gone".into()));
        assert_eq!(outcome.to_string(), "skipped (message already gone)");
    }
}

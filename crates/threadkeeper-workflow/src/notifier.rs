// SPDX-FileCopyrightText: 2026 Threadkeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Publishes archive records and their reopen control.

use std::sync::Arc;

use tracing::debug;

use threadkeeper_core::error::ThreadkeeperError;
use threadkeeper_core::traits::ChatPlatform;
use threadkeeper_core::types::{Button, ButtonStyle, ChannelId, MessageId, OutboundMessage};

use crate::correlation::ControlAction;

pub const REOPEN_LABEL: &str = "Reopen Thread";

/// The reopen button for an archive record.
pub fn reopen_button(source_thread: ChannelId, anchor: MessageId) -> Button {
    Button {
        custom_id: ControlAction::reopen(source_thread, anchor).custom_id(),
        label: REOPEN_LABEL.to_string(),
        emoji: Some('🔄'),
        style: ButtonStyle::Primary,
    }
}

/// Posts anchors into the completion channel.
///
/// The control id embeds the anchor's own id and the record links to the
/// transcript started from it, so the record is posted first and completed
/// by one edit once both ids are known.
#[derive(Clone)]
pub struct Notifier {
    platform: Arc<dyn ChatPlatform>,
}

impl Notifier {
    pub fn new(platform: Arc<dyn ChatPlatform>) -> Self {
        Self { platform }
    }

    /// Posts the rendered header and returns the anchor id.
    pub async fn publish_anchor(
        &self,
        completion: ChannelId,
        header: OutboundMessage,
    ) -> Result<MessageId, ThreadkeeperError> {
        let anchor = self.platform.send(completion, header).await?;
        debug!(%completion, %anchor, "anchor posted");
        Ok(anchor)
    }

    /// Replaces the anchor with its final form: `header` plus the reopen
    /// control carrying `source_thread` and `anchor`.
    pub async fn finalize_anchor(
        &self,
        completion: ChannelId,
        anchor: MessageId,
        source_thread: ChannelId,
        mut header: OutboundMessage,
    ) -> Result<(), ThreadkeeperError> {
        header.buttons = vec![reopen_button(source_thread, anchor)];
        self.platform.edit_message(completion, anchor, header).await
    }
}

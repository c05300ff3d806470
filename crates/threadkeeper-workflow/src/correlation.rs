// SPDX-FileCopyrightText: 2026 Threadkeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identifiers linking completion-channel artifacts back to a source thread.
//!
//! The reopen control carries `tk1_reopen_{source_thread}_{anchor}`. Messages
//! posted for an archived thread carry a `ref:{source_thread}` tag so a
//! reopen can find them without trusting free text.

use std::fmt;
use std::str::FromStr;

use threadkeeper_core::error::ThreadkeeperError;
use threadkeeper_core::types::{ChannelId, ChatMessage, MessageId};

/// Version prefix of every control identifier.
pub const TOKEN_PREFIX: &str = "tk1";

const REOPEN_VERB: &str = "reopen";

/// Correlation data carried by a reopen control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReopenToken {
    pub source_thread: ChannelId,
    pub anchor: MessageId,
}

/// Actions a control attached to a bot message can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    Reopen(ReopenToken),
}

impl ControlAction {
    pub fn reopen(source_thread: ChannelId, anchor: MessageId) -> Self {
        Self::Reopen(ReopenToken {
            source_thread,
            anchor,
        })
    }

    /// Identifier to attach to the control.
    pub fn custom_id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reopen(token) => write!(
                f,
                "{TOKEN_PREFIX}_{REOPEN_VERB}_{}_{}",
                token.source_thread, token.anchor
            ),
        }
    }
}

impl FromStr for ControlAction {
    type Err = ThreadkeeperError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = raw.split('_').collect();
        if parts.first() != Some(&TOKEN_PREFIX) {
            return Err(ThreadkeeperError::Correlation(format!(
                "unsupported control layout: {raw}"
            )));
        }

        match parts.as_slice() {
            [_, verb, thread, anchor] if *verb == REOPEN_VERB => {
                let source_thread = parse_id(thread, raw)?;
                let anchor = parse_id(anchor, raw)?;
                Ok(Self::reopen(ChannelId(source_thread), MessageId(anchor)))
            }
            [_, verb, ..] => Err(ThreadkeeperError::Correlation(format!(
                "unknown control action `{verb}` in {raw}"
            ))),
            _ => Err(ThreadkeeperError::Correlation(format!(
                "truncated control identifier: {raw}"
            ))),
        }
    }
}

fn parse_id(part: &str, raw: &str) -> Result<u64, ThreadkeeperError> {
    part.parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .ok_or_else(|| ThreadkeeperError::Correlation(format!("invalid id `{part}` in {raw}")))
}

/// Tag embedded in every message posted for an archived thread.
pub fn correlation_tag(source_thread: ChannelId) -> String {
    format!("ref:{source_thread}")
}

/// Short display id: the last six digits.
pub fn short_task_id(id: impl fmt::Display) -> String {
    let full = id.to_string();
    let start = full.len().saturating_sub(6);
    full[start..].to_string()
}

/// True when `text` contains the correlation tag for `source_thread` as a
/// whole token (so `ref:12` does not match `ref:123`).
pub fn text_references(text: &str, source_thread: ChannelId) -> bool {
    let tag = correlation_tag(source_thread);
    text.match_indices(&tag).any(|(at, _)| {
        !text[at + tag.len()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit())
    })
}

/// True when the message's content or any embed footer carries the tag.
pub fn message_references(message: &ChatMessage, source_thread: ChannelId) -> bool {
    text_references(&message.content, source_thread)
        || message
            .embed_footers
            .iter()
            .any(|footer| text_references(footer, source_thread))
}

// SPDX-FileCopyrightText: 2026 Threadkeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Archive/reopen workflow for completed discussion threads.
//!
//! A checkmark reaction in the monitored channel moves a thread into the
//! completion channel:
//!
//! 1. [`trigger`] decides whether a reaction qualifies and dedups it against
//!    the bot's marker reaction; [`claim`] closes the race between two
//!    near-simultaneous reactions on the same message.
//! 2. [`archiver`] captures the thread's history, replays it into a new
//!    transcript thread and locks the source.
//! 3. [`notifier`] publishes the anchor message carrying the reopen control,
//!    whose id is encoded by [`correlation`].
//! 4. [`reopener`] reverses all of it when the control is activated.
//!
//! [`dispatch::Workflow`] is the entry point the platform event handler
//! calls. Everything here is written against
//! [`threadkeeper_core::ChatPlatform`] and never talks to a client directly.

pub mod archiver;
pub mod chunk;
pub mod claim;
pub mod correlation;
pub mod dispatch;
pub mod notifier;
pub mod render;
pub mod reopener;
pub mod settings;
pub mod stats;
pub mod trigger;

pub use archiver::{ArchiveOutcome, ArchiveRecord, Archiver};
pub use claim::ClaimSet;
pub use correlation::{ControlAction, ReopenToken};
pub use dispatch::{ComponentOutcome, ReactionOutcome, Workflow};
pub use reopener::{ReopenReport, ReopenStep, Reopener, StepOutcome};
pub use settings::WorkflowSettings;
pub use trigger::{IgnoreReason, TriggerDetector, CHECKMARK_EMOJIS, TRIGGER_MARK};

// SPDX-FileCopyrightText: 2026 Threadkeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Threadkeeper.
//!
//! Holds the error type, the platform-neutral models (channels, messages,
//! users, outbound payloads) and the [`ChatPlatform`] capability trait that the
//! archive workflow is written against. Concrete platforms (Discord) and test
//! doubles implement the trait; the workflow never touches a client directly.

pub mod error;
pub mod traits;
pub mod types;

pub use error::ThreadkeeperError;
pub use traits::{ChatPlatform, PluginAdapter};
pub use types::{ChannelId, GuildId, HealthStatus, MessageId, UserId};

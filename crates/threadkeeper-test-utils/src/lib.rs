// SPDX-FileCopyrightText: 2026 Threadkeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Threadkeeper integration tests.
//!
//! Provides an in-memory chat platform and a harness wiring it to the
//! workflow, for fast deterministic tests without a Discord connection.
//!
//! # Components
//!
//! - [`MockPlatform`] - In-memory guild with channels, threads, messages and
//!   reactions, a call log and per-operation failure injection
//! - [`TestHarness`] - Monitored and completion channels plus a ready
//!   [`threadkeeper_workflow::Workflow`]

pub mod harness;
pub mod mock_platform;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_platform::{human, Call, MockPlatform, Operation};

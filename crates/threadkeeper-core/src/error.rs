// SPDX-FileCopyrightText: 2026 Threadkeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Threadkeeper.

use thiserror::Error;

/// The primary error type used across the platform trait and the workflow.
#[derive(Debug, Error)]
pub enum ThreadkeeperError {
    /// Configuration errors (missing token, invalid ids, out-of-range limits).
    #[error("configuration error: {0}")]
    Config(String),

    /// Platform call failed (network, rate limiting, missing permission).
    #[error("platform error: {message}")]
    Platform {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A channel, thread or message could not be resolved.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// A control identifier could not be decoded.
    #[error("correlation error: {0}")]
    Correlation(String),
}

impl ThreadkeeperError {
    /// Wraps a platform client error.
    pub fn platform<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Platform {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Shorthand for [`ThreadkeeperError::NotFound`].
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// True for failures to locate or decode something, which have a
    /// degraded fallback path rather than a retry.
    pub fn is_resolution(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Correlation(_))
    }
}

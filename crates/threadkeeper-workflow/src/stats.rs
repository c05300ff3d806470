// SPDX-FileCopyrightText: 2026 Threadkeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Statistics over a thread's fetched message window.

use std::collections::BTreeSet;

use threadkeeper_core::types::ChatMessage;

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 3_600_000;
const DAY_MS: i64 = 86_400_000;

/// Figures shown in the archive header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadStats {
    /// Milliseconds between the earliest and latest message; `None` for an
    /// empty window.
    pub duration_ms: Option<i64>,
    /// Size of the fetched window.
    pub message_count: usize,
    /// The window hit the fetch limit, so older messages were left out.
    pub truncated: bool,
    /// Distinct non-bot authors.
    pub participants: usize,
}

impl ThreadStats {
    /// Computes stats for `window`, which need not be sorted.
    pub fn compute(window: &[ChatMessage], fetch_limit: u8) -> Self {
        let first = window.iter().map(|m| m.created_at).min();
        let last = window.iter().map(|m| m.created_at).max();
        let duration_ms = first
            .zip(last)
            .map(|(first, last)| (last - first).num_milliseconds());

        let participants = window
            .iter()
            .filter(|m| !m.author.bot)
            .map(|m| m.author.id)
            .collect::<BTreeSet<_>>()
            .len();

        Self {
            duration_ms,
            message_count: window.len(),
            truncated: fetch_limit > 0 && window.len() >= usize::from(fetch_limit),
            participants,
        }
    }

    pub fn duration_text(&self) -> String {
        self.duration_ms
            .map(format_duration)
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// `100+ (truncated)` when the window was cut off.
    pub fn message_count_text(&self) -> String {
        if self.truncated {
            format!("{}+ (truncated)", self.message_count)
        } else {
            self.message_count.to_string()
        }
    }

    /// One line per figure.
    pub fn summary(&self) -> String {
        format!(
            "Duration: {}\nMessages: {}\nParticipants: {}",
            self.duration_text(),
            self.message_count_text(),
            self.participants
        )
    }
}

/// Formats a millisecond span in the largest unit it reaches, rounded to the
/// nearest whole unit.
pub fn format_duration(ms: i64) -> String {
    let ms = ms.max(0);
    let (unit_ms, unit) = if ms < MINUTE_MS {
        (1_000, "seconds")
    } else if ms < HOUR_MS {
        (MINUTE_MS, "minutes")
    } else if ms < DAY_MS {
        (HOUR_MS, "hours")
    } else {
        (DAY_MS, "days")
    };
    let value = (ms as f64 / unit_ms as f64).round() as i64;
    format!("{value} {unit}")
}

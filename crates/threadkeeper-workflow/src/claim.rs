// SPDX-FileCopyrightText: 2026 Threadkeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process claims on trigger messages.
//!
//! The marker reaction only lands at the end of a run, so two reactions
//! arriving together would both pass the marker check. A claim is taken
//! before any side effect and released when the run finishes, successful or
//! not.

use std::sync::Arc;

use dashmap::DashSet;

use threadkeeper_core::types::MessageId;

/// Set of trigger messages with an archive run in flight.
#[derive(Debug, Clone, Default)]
pub struct ClaimSet {
    inner: Arc<DashSet<MessageId>>,
}

impl ClaimSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `id`, or returns `None` when another run holds it.
    pub fn try_claim(&self, id: MessageId) -> Option<Claim> {
        if self.inner.insert(id) {
            Some(Claim {
                set: Arc::clone(&self.inner),
                id,
            })
        } else {
            None
        }
    }

    #[cfg(test)]
    pub(crate) fn is_claimed(&self, id: MessageId) -> bool {
        self.inner.contains(&id)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Held for the duration of one run; releases the message on drop.
#[derive(Debug)]
pub struct Claim {
    set: Arc<DashSet<MessageId>>,
    id: MessageId,
}

impl Drop for Claim {
    fn drop(&mut self) {
        self.set.remove(&self.id);
    }
}

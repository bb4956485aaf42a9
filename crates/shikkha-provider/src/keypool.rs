// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! API key pool with an explicit per-key state machine.
//!
//! Each key is `Active`, `QuotaExceeded`, or `Disabled`. Key selection is
//! a pure function of the pool's state -- the first eligible key in
//! configured order -- independent of call order, so exhausting and
//! restoring keys behaves predictably.

use tracing::{info, warn};

/// Lifecycle state of one API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    /// Usable.
    Active,
    /// Rejected for quota; eligible again after a quota reset.
    QuotaExceeded,
    /// Permanently unusable (revoked, invalid).
    Disabled,
}

#[derive(Debug, Clone)]
struct PoolEntry {
    key: String,
    state: KeyState,
}

/// Ordered pool of API keys.
#[derive(Debug, Clone)]
pub struct KeyPool {
    entries: Vec<PoolEntry>,
}

impl KeyPool {
    pub fn new(keys: Vec<String>) -> Self {
        Self {
            entries: keys
                .into_iter()
                .map(|key| PoolEntry {
                    key,
                    state: KeyState::Active,
                })
                .collect(),
        }
    }

    /// The first `Active` key in configured order, if any.
    pub fn next_eligible(&self) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.state == KeyState::Active)
            .map(|e| e.key.as_str())
    }

    /// Number of `Active` keys.
    pub fn eligible_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.state == KeyState::Active)
            .count()
    }

    /// Transition a key to `QuotaExceeded`.
    ///
    /// Disabled keys stay disabled.
    pub fn mark_quota_exceeded(&mut self, key: &str) {
        self.transition(key, KeyState::QuotaExceeded);
    }

    /// Transition a key to `Disabled`.
    pub fn mark_disabled(&mut self, key: &str) {
        self.transition(key, KeyState::Disabled);
    }

    /// Restore all quota-exceeded keys to `Active` (quota window reset).
    pub fn reset_quota(&mut self) {
        let mut restored = 0;
        for entry in &mut self.entries {
            if entry.state == KeyState::QuotaExceeded {
                entry.state = KeyState::Active;
                restored += 1;
            }
        }
        if restored > 0 {
            info!(restored, "quota-exceeded API keys restored");
        }
    }

    fn transition(&mut self, key: &str, to: KeyState) {
        for entry in &mut self.entries {
            if entry.key == key && entry.state != KeyState::Disabled {
                warn!(state = ?to, "API key state transition");
                entry.state = to;
                return;
            }
        }
    }
}

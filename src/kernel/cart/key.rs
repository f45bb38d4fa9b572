use std::collections::HashMap;
use std::fmt;

use crate::kernel::time::{Deadline, Tick};

/// Identity of one requested mutation: item, options and the caller's nonce
/// (turn sequence, route `_timestamp` or tap id).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MutationKey {
    pub item_id: String,
    pub option_signature: String,
    pub nonce: String,
}

impl MutationKey {
    pub fn new(
        item_id: impl Into<String>,
        option_signature: impl Into<String>,
        nonce: impl Into<String>,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            option_signature: option_signature.into(),
            nonce: nonce.into(),
        }
    }
}

impl fmt::Display for MutationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.item_id, self.option_signature, self.nonce)
    }
}

/// Keys applied recently. A key is quarantined until its deadline, then evicted.
#[derive(Debug, Clone)]
pub struct MutationKeyCache {
    window_ms: u64,
    entries: HashMap<MutationKey, Deadline>,
}

impl MutationKeyCache {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            entries: HashMap::new(),
        }
    }

    pub fn seen(&self, key: &MutationKey, now: Tick) -> bool {
        self.entries
            .get(key)
            .is_some_and(|deadline| !deadline.is_due(now))
    }

    pub fn remember(&mut self, key: MutationKey, now: Tick) {
        self.entries.insert(key, Deadline::in_ms(now, self.window_ms));
    }

    /// Drops every key whose window has closed. Returns how many went.
    pub fn evict_expired(&mut self, now: Tick) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, deadline| !deadline.is_due(now));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

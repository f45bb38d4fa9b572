use serde::{Deserialize, Serialize};

/// Logical clock of the reactor. One frame is `TICK_MS` of wall time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Tick {
    pub frame: u64,
}

pub const TICK_MS: u64 = 20;

impl Tick {
    pub fn new() -> Self {
        Tick { frame: 0 }
    }

    pub fn next(&self) -> Self {
        Tick { frame: self.frame + 1 }
    }

    /// Frames needed to cover `ms`, rounded up so a deadline never fires early.
    pub fn frames_for(ms: u64) -> u64 {
        ms.div_ceil(TICK_MS)
    }

    pub fn after_ms(&self, ms: u64) -> Self {
        Tick { frame: self.frame + Self::frames_for(ms) }
    }

    pub fn elapsed_ms(&self, since: Tick) -> u64 {
        self.frame.saturating_sub(since.frame) * TICK_MS
    }

    pub fn as_millis(&self) -> u64 {
        self.frame * TICK_MS
    }
}

/// A single one-shot deadline. Owned by whichever state scheduled it; dropping
/// the owner cancels it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    pub due: Tick,
}

impl Deadline {
    pub fn in_ms(now: Tick, ms: u64) -> Self {
        Self { due: now.after_ms(ms) }
    }

    pub fn is_due(&self, now: Tick) -> bool {
        now >= self.due
    }
}

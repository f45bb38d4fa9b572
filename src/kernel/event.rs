use serde::{Deserialize, Serialize};

use crate::kernel::router::{RouteParams, Screen};
use crate::turn::types::{SlotSet, TurnResponse};

/// Stamp on every backend request. Only the newest, not yet handled epoch is
/// allowed back into the reactor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TurnEpoch {
    pub seq: u64,
}

impl std::fmt::Display for TurnEpoch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.seq)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    Text,
    Voice,
}

#[derive(Debug, Clone)]
pub enum Event {
    SessionStarted {
        session_id: String,
        greeting: Option<String>,
    },
    SessionFailed,
    /// Typed by the user.
    UserText(String),
    /// A finished recording, WAV encoded.
    VoiceCaptured(Vec<u8>),
    /// Recorder refused or failed; the text is shown inline.
    VoiceFailed(String),
    TurnReceived {
        epoch: TurnEpoch,
        turn: TurnResponse,
    },
    TurnFailed {
        epoch: TurnEpoch,
        channel: Channel,
    },
    /// The screen router finished a navigation.
    ScreenEntered {
        screen: Screen,
        params: RouteParams,
    },
    ItemTapped {
        item_id: String,
    },
    /// Temperature or size tapped on a guided screen.
    SelectionMade(SlotSet),
    ModalDismissed,
    Teardown,
}

impl Event {
    pub fn text(text: &str) -> Self {
        Event::UserText(text.to_string())
    }
}

/// Hands out epochs and admits responses.
#[derive(Debug, Clone, Default)]
pub struct EpochGate {
    issued: u64,
    handled: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    Stale,
    Redelivered,
}

impl EpochGate {
    pub fn issue(&mut self) -> TurnEpoch {
        self.issued += 1;
        TurnEpoch { seq: self.issued }
    }

    pub fn latest(&self) -> Option<TurnEpoch> {
        (self.issued > 0).then_some(TurnEpoch { seq: self.issued })
    }

    pub fn admit(&mut self, epoch: TurnEpoch) -> Admission {
        if epoch.seq != self.issued {
            return Admission::Stale;
        }
        if self.handled == Some(epoch.seq) {
            return Admission::Redelivered;
        }
        self.handled = Some(epoch.seq);
        Admission::Accepted
    }
}

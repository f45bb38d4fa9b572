use serde::{Deserialize, Serialize};

use crate::kernel::intent::Intent;
use crate::kernel::payment::PaymentPhase;
use crate::kernel::time::Tick;

// Allowed: epochs, ticks, counts, enums.
// Forbidden: text, item names, audio.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TelemetryEvent {
    TurnAccepted {
        epoch: u64,
        latency_ticks: u64,
    },

    TurnDiscarded {
        epoch: u64,
        reason: DiscardReason,
    },

    TurnFailed {
        epoch: u64,
    },

    IntentClassified {
        intent: Intent,
        /// How many families matched before precedence picked one.
        families: usize,
    },

    Mutation {
        kind: MutationKind,
        outcome: MutationResult,
    },

    Highlight {
        event: HighlightEventKind,
        tick: Tick,
    },

    PaymentTransition {
        from: PaymentPhase,
        to: PaymentPhase,
        tick: Tick,
    },

    NavigationIssued {
        action: ActionKind,
    },

    SessionSummary {
        duration_ticks: u64,
        turns: u64,
        mutations: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscardReason {
    Stale,
    Redelivered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationKind {
    Add,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationResult {
    Applied,
    Duplicate,
    NotInCart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HighlightEventKind {
    Started,
    Preempted,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    Navigate,
    GoBack,
    OpenModal,
}

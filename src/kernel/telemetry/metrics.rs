use std::collections::VecDeque;

use super::event::{DiscardReason, HighlightEventKind, MutationResult, TelemetryEvent};
use crate::kernel::intent::Intent;

#[derive(Debug, Clone, Default)]
pub struct TelemetrySnapshot {
    pub turn_stats: TurnStats,
    pub intent_stats: IntentStats,
    pub mutation_stats: MutationStats,
    pub highlight_stats: HighlightStats,
    pub payment_transitions: u64,
    pub navigations: u64,
}

#[derive(Debug, Clone, Default)]
pub struct TurnStats {
    pub accepted: u64,
    pub stale: u64,
    pub redelivered: u64,
    pub failed: u64,
    pub avg_latency_ticks: f64,
}

#[derive(Debug, Clone, Default)]
pub struct IntentStats {
    pub previous_navigation: u64,
    pub removal: u64,
    pub location: u64,
    pub payment: u64,
    pub dessert_existence: u64,
    pub previous_step: u64,
    pub none: u64,
    /// Turns where more than one family matched.
    pub ambiguous: u64,
}

#[derive(Debug, Clone, Default)]
pub struct MutationStats {
    pub applied: u64,
    pub duplicates: u64,
    pub not_in_cart: u64,
}

#[derive(Debug, Clone, Default)]
pub struct HighlightStats {
    pub started: u64,
    pub preempted: u64,
    pub completed: u64,
    pub cancelled: u64,
}

pub fn compute_snapshot(events: &VecDeque<TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();
    let mut total_latency = 0u64;

    for event in events {
        match event {
            TelemetryEvent::TurnAccepted { latency_ticks, .. } => {
                snap.turn_stats.accepted += 1;
                total_latency += latency_ticks;
            }
            TelemetryEvent::TurnDiscarded { reason, .. } => match reason {
                DiscardReason::Stale => snap.turn_stats.stale += 1,
                DiscardReason::Redelivered => snap.turn_stats.redelivered += 1,
            },
            TelemetryEvent::TurnFailed { .. } => snap.turn_stats.failed += 1,
            TelemetryEvent::IntentClassified { intent, families } => {
                let stats = &mut snap.intent_stats;
                match intent {
                    Intent::PreviousNavigationQuestion => stats.previous_navigation += 1,
                    Intent::RemovalRequest => stats.removal += 1,
                    Intent::LocationQuestion => stats.location += 1,
                    Intent::PaymentRequest => stats.payment += 1,
                    Intent::DessertExistenceQuestion => stats.dessert_existence += 1,
                    Intent::PreviousStepRequest => stats.previous_step += 1,
                    Intent::None => stats.none += 1,
                }
                if *families > 1 {
                    stats.ambiguous += 1;
                }
            }
            TelemetryEvent::Mutation { outcome, .. } => match outcome {
                MutationResult::Applied => snap.mutation_stats.applied += 1,
                MutationResult::Duplicate => snap.mutation_stats.duplicates += 1,
                MutationResult::NotInCart => snap.mutation_stats.not_in_cart += 1,
            },
            TelemetryEvent::Highlight { event, .. } => match event {
                HighlightEventKind::Started => snap.highlight_stats.started += 1,
                HighlightEventKind::Preempted => snap.highlight_stats.preempted += 1,
                HighlightEventKind::Completed => snap.highlight_stats.completed += 1,
                HighlightEventKind::Cancelled => snap.highlight_stats.cancelled += 1,
            },
            TelemetryEvent::PaymentTransition { .. } => snap.payment_transitions += 1,
            TelemetryEvent::NavigationIssued { .. } => snap.navigations += 1,
            TelemetryEvent::SessionSummary { .. } => {}
        }
    }

    if snap.turn_stats.accepted > 0 {
        snap.turn_stats.avg_latency_ticks = total_latency as f64 / snap.turn_stats.accepted as f64;
    }

    snap
}

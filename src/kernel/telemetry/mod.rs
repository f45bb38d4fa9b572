//! Orchestration telemetry.
//!
//! # SAFETY INVARIANT
//! Telemetry is a read-only side-effect layer. Decision logic (classifier,
//! router, synchronizer) never reads it.
//!
//! # PRIVACY INVARIANT
//! Events never carry user content: no utterances, replies, item names or audio.
//! Only epochs, ticks, counts and enum kinds.

pub mod event;
pub mod metrics;
pub mod recorder;

pub use event::TelemetryEvent;
pub use recorder::TelemetryRecorder;

//! Tick-driven orchestration core. Nothing under here awaits or does I/O.

pub mod cart;
pub mod event;
pub mod highlight;
pub mod intent;
pub mod payment;
pub mod reactor;
pub mod router;
pub mod scheduler;
pub mod telemetry;
pub mod time;

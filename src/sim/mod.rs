//! Simulation core: energy model, pricing, accrual, events and their drivers.

/// Benefit accrual against an uncoordinated baseline.
pub mod accrual;
/// Wall-clock sources for time-of-day rules.
pub mod clock;
pub mod engine;
/// Negotiation and decision events with bounded logs.
pub mod event;
/// Time-of-use grid pricing.
pub mod pricing;
pub mod rng;
/// Periodic async driver publishing snapshots.
pub mod scheduler;
pub mod state;

pub use engine::{Engine, Snapshot, TickReport};
pub use scheduler::Scheduler;

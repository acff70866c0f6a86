//! Household virtual power plant benefit simulator.
//!
//! Models a home with solar, wind, battery, household load and an EV charger,
//! prices grid energy on a time-of-use tariff, and accrues the benefit of
//! coordinated operation over an uncoordinated baseline. Narrative
//! negotiation and decision events are sampled from a catalog into bounded
//! logs.

#[cfg(feature = "api")]
pub mod api;
/// Negotiation, decision and agent templates.
pub mod catalog;
pub mod config;
/// Per-asset power models.
pub mod devices;
pub mod error;
/// CSV telemetry export.
pub mod io;
/// Simulation engine, pricing, accrual, events and scheduler.
pub mod sim;

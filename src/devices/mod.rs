//! Device simulation components for the household energy model.

/// Battery state-of-charge random walk.
pub mod battery;
/// Electric vehicle charger model.
pub mod ev_charger;
/// Household consumption model.
pub mod home;
/// Solar generation model.
pub mod solar;
pub mod types;
/// Wind generation model.
pub mod wind;

// Re-export the main types for convenience
pub use battery::Battery;
pub use ev_charger::EvCharger;
pub use home::HomeLoad;
pub use solar::SolarArray;
pub use types::Device;
pub use types::DeviceContext;
pub use types::DeviceRole;
pub use wind::WindTurbine;

//! API response and query types.

use serde::{Deserialize, Serialize};

use crate::sim::accrual::CumulativeStats;
use crate::sim::clock::WallTime;
use crate::sim::state::{EnergyFlows, EnergyState};

/// Energy state with its derived flows.
#[derive(Debug, Serialize)]
pub struct EnergyResponse {
    pub version: u64,
    pub time: Option<WallTime>,
    pub state: EnergyState,
    pub flows: EnergyFlows,
}

/// Cumulative benefit counters.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub version: u64,
    pub time: Option<WallTime>,
    pub stats: CumulativeStats,
}

/// Query parameters for the event log endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    /// Maximum number of entries to return, newest first.
    pub limit: Option<usize>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

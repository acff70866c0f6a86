//! Request handlers for the API endpoints.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;

use crate::catalog::AgentProfile;
use crate::sim::Snapshot;
use crate::sim::event::{DecisionEvent, NegotiationEvent};

use super::AppState;
use super::types::{EnergyResponse, ErrorResponse, EventsQuery, StatsResponse};

type ApiError = (StatusCode, Json<ErrorResponse>);

/// `GET /state` → 200 + full `Snapshot` JSON
pub async fn get_state(State(state): State<AppState>) -> Json<Snapshot> {
    Json(Snapshot::clone(&state.latest()))
}

/// `GET /energy` → 200 + `EnergyResponse` JSON
pub async fn get_energy(State(state): State<AppState>) -> Json<EnergyResponse> {
    let snap = state.latest();
    Json(EnergyResponse {
        version: snap.version,
        time: snap.time,
        state: snap.state.clone(),
        flows: snap.flows,
    })
}

/// `GET /stats` → 200 + `StatsResponse` JSON
pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let snap = state.latest();
    Json(StatsResponse {
        version: snap.version,
        time: snap.time,
        stats: snap.stats.clone(),
    })
}

/// Returns the negotiation log, newest first.
///
/// `GET /negotiations?limit=N` → at most N entries
/// `GET /negotiations?limit=0` → 400 + `ErrorResponse`
pub async fn get_negotiations(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<Vec<NegotiationEvent>>, ApiError> {
    let limit = checked_limit(&query)?;
    let snap = state.latest();
    Ok(Json(snap.negotiations.iter().take(limit).cloned().collect()))
}

/// Returns the decision log, newest first.
///
/// `GET /decisions?limit=N` → at most N entries
/// `GET /decisions?limit=0` → 400 + `ErrorResponse`
pub async fn get_decisions(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<Vec<DecisionEvent>>, ApiError> {
    let limit = checked_limit(&query)?;
    let snap = state.latest();
    Ok(Json(snap.decisions.iter().take(limit).cloned().collect()))
}

/// `GET /agents` → 200 + agent roster JSON
pub async fn get_agents(State(state): State<AppState>) -> Json<Vec<AgentProfile>> {
    Json(state.catalog.agents().to_vec())
}

fn checked_limit(query: &EventsQuery) -> Result<usize, ApiError> {
    match query.limit {
        Some(0) => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "`limit` must be > 0".to_string(),
            }),
        )),
        Some(n) => Ok(n),
        None => Ok(usize::MAX),
    }
}

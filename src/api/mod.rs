//! Read-only REST API over the live simulation.
//!
//! Handlers read the latest [`Snapshot`] from the scheduler's watch channel;
//! nothing here can mutate simulation state.
//!
//! - `/state` full snapshot
//! - `/energy` energy state and derived flows
//! - `/stats` cumulative benefit counters
//! - `/negotiations`, `/decisions` event logs (newest first, `?limit=N`)
//! - `/agents` static agent roster

mod handlers;
mod types;

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tokio::sync::watch;
use tracing::info;

use crate::catalog::Catalog;
use crate::sim::Snapshot;

pub use types::{EnergyResponse, ErrorResponse, EventsQuery, StatsResponse};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Latest published snapshot.
    pub snapshots: watch::Receiver<Arc<Snapshot>>,
    /// Catalog the running engine was built from.
    pub catalog: Arc<Catalog>,
}

impl AppState {
    pub fn new(snapshots: watch::Receiver<Arc<Snapshot>>, catalog: Arc<Catalog>) -> Self {
        Self { snapshots, catalog }
    }

    fn latest(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshots.borrow())
    }
}

/// Builds the axum router with all API routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/state", get(handlers::get_state))
        .route("/energy", get(handlers::get_energy))
        .route("/stats", get(handlers::get_stats))
        .route("/negotiations", get(handlers::get_negotiations))
        .route("/decisions", get(handlers::get_decisions))
        .route("/agents", get(handlers::get_agents))
        .with_state(state)
}

/// Binds to `addr` and serves the API until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn serve<F>(state: AppState, addr: SocketAddr, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

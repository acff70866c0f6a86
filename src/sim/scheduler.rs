//! Periodic driver that ticks the engine on a tokio task.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{info, warn};

use super::clock::ClockSource;
use super::engine::{Engine, Snapshot};
use super::rng::RandomSource;

/// Owns a running engine task and the snapshot channel it publishes to.
///
/// The task is the only writer of simulation state. Readers subscribe to a
/// watch channel of [`Snapshot`]s and never observe a half-applied tick.
/// Dropping the scheduler without calling [`Scheduler::stop`] aborts the
/// task.
pub struct Scheduler<R: RandomSource + Send + 'static> {
    handle: Option<JoinHandle<Engine<R>>>,
    stop_tx: Option<oneshot::Sender<()>>,
    snapshots: watch::Receiver<Arc<Snapshot>>,
}

impl<R: RandomSource + Send + 'static> Scheduler<R> {
    /// Spawns the tick loop. The first tick fires one `period` after start.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero.
    pub fn start<C>(engine: Engine<R>, mut clock: C, period: Duration) -> Self
    where
        C: ClockSource + Send + 'static,
    {
        assert!(!period.is_zero(), "tick period must be non-zero");

        let (snapshot_tx, snapshots) = watch::channel(Arc::new(engine.snapshot()));
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut engine = engine;
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(period_ms = period.as_millis() as u64, "Scheduler started");

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        let now = clock.now();
                        engine.step(now);
                        // Receivers may all be gone; keep ticking until stopped.
                        let _ = snapshot_tx.send(Arc::new(engine.snapshot()));
                    }
                }
            }

            info!(ticks = engine.ticks(), "Scheduler stopped");
            engine
        });

        Self {
            handle: Some(handle),
            stop_tx: Some(stop_tx),
            snapshots,
        }
    }

    /// New receiver that sees every subsequently published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshots.clone()
    }

    /// Most recently published snapshot.
    pub fn latest(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshots.borrow())
    }

    /// Stops after the in-flight tick (if any) and returns the engine.
    ///
    /// Returns `None` if the task panicked or was already stopped.
    pub async fn stop(mut self) -> Option<Engine<R>> {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        let handle = self.handle.take()?;
        match handle.await {
            Ok(engine) => Some(engine),
            Err(e) => {
                warn!(error = %e, "Scheduler task ended abnormally");
                None
            }
        }
    }
}

impl<R: RandomSource + Send + 'static> Drop for Scheduler<R> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::config::SimulationConfig;
    use crate::sim::clock::{SteppedClock, WallTime};
    use crate::sim::rng::SeededRandom;

    const PERIOD: Duration = Duration::from_millis(2000);

    fn start() -> Scheduler<SeededRandom> {
        let engine = Engine::new(
            &SimulationConfig::demo(),
            &Catalog::builtin().unwrap(),
            SeededRandom::new(11),
        )
        .unwrap();
        let clock = SteppedClock::new(WallTime::new(12, 0).unwrap(), 2);
        Scheduler::start(engine, clock, PERIOD)
    }

    #[tokio::test(start_paused = true)]
    async fn no_tick_before_first_period() {
        let scheduler = start();
        tokio::time::sleep(PERIOD / 2).await;
        assert_eq!(scheduler.latest().version, 0);
        let engine = scheduler.stop().await.unwrap();
        assert_eq!(engine.ticks(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period() {
        let scheduler = start();
        tokio::time::sleep(PERIOD * 3 + PERIOD / 2).await;
        assert_eq!(scheduler.latest().version, 3);
        let engine = scheduler.stop().await.unwrap();
        assert_eq!(engine.ticks(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_published_snapshots() {
        let scheduler = start();
        let mut rx = scheduler.subscribe();
        rx.changed().await.unwrap();
        let snap = Arc::clone(&rx.borrow_and_update());
        assert_eq!(snap.version, 1);
        assert!(snap.stats.total_savings > 0.0);
        scheduler.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_returns_final_state() {
        let scheduler = start();
        tokio::time::sleep(PERIOD * 2 + PERIOD / 2).await;
        let latest = scheduler.latest();
        let engine = scheduler.stop().await.unwrap();
        assert_eq!(engine.snapshot().version, latest.version);
        assert_eq!(engine.stats(), &latest.stats);
    }
}

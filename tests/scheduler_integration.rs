//! Integration tests for the periodic scheduler.

mod common;

use std::time::Duration;

use vpp_benefit_sim::sim::Scheduler;

const PERIOD: Duration = Duration::from_millis(500);

#[tokio::test(start_paused = true)]
async fn live_run_matches_headless_replay() {
    let scheduler = Scheduler::start(common::seeded_engine(21), common::minute_clock(7, 0), PERIOD);
    tokio::time::sleep(PERIOD * 30 + PERIOD / 2).await;
    let live = scheduler.stop().await.unwrap();
    assert_eq!(live.ticks(), 30);

    let mut replay = common::seeded_engine(21);
    replay.run(&mut common::minute_clock(7, 0), 30);

    let (a, b) = (live.snapshot(), replay.snapshot());
    assert_eq!(a.state, b.state);
    assert_eq!(a.stats, b.stats);
    assert_eq!(a.decisions, b.decisions);
    assert_eq!(a.negotiations, b.negotiations);
}

#[tokio::test(start_paused = true)]
async fn snapshot_versions_increase() {
    let scheduler = Scheduler::start(common::seeded_engine(22), common::minute_clock(7, 0), PERIOD);
    let mut rx = scheduler.subscribe();
    let mut last = 0;
    for _ in 0..5 {
        rx.changed().await.unwrap();
        let version = rx.borrow_and_update().version;
        assert!(version > last);
        last = version;
    }
    scheduler.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn dropping_scheduler_closes_channel() {
    let scheduler = Scheduler::start(common::seeded_engine(23), common::minute_clock(7, 0), PERIOD);
    let mut rx = scheduler.subscribe();
    drop(scheduler);
    assert!(rx.changed().await.is_err());
}

//! Simulator entry point: CLI wiring, headless replay and live scheduling.

mod cli;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vpp_benefit_sim::catalog::Catalog;
use vpp_benefit_sim::config::SimulationConfig;
use vpp_benefit_sim::io::export_csv;
use vpp_benefit_sim::sim::clock::{SteppedClock, SystemClock};
use vpp_benefit_sim::sim::rng::SeededRandom;
use vpp_benefit_sim::sim::{Engine, Scheduler, TickReport};

use crate::cli::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vpp_benefit_sim=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.load_config().context("failed to load configuration")?;
    let catalog = args.load_catalog().context("failed to load catalog")?;

    let rng = match config.seed {
        Some(seed) => SeededRandom::new(seed),
        None => SeededRandom::from_entropy(),
    };
    info!(seed = rng.seed(), "Random source seeded");

    let engine = Engine::new(&config, &catalog, rng)?;

    match args.ticks {
        Some(ticks) => run_headless(&args, &config, engine, ticks),
        None => run_live(&args, &config, catalog, engine).await,
    }
}

/// Replays `ticks` ticks on a simulated clock and prints a report.
fn run_headless(
    args: &Args,
    config: &SimulationConfig,
    mut engine: Engine<SeededRandom>,
    ticks: u64,
) -> anyhow::Result<()> {
    let step = config.tick_period();
    let mut clock = SteppedClock::with_step(args.start, step);
    info!(ticks, start = %args.start, step_ms = step.as_millis() as u64, "Running headless");

    let reports = engine.run(&mut clock, ticks);
    for report in &reports {
        print_tick(report);
    }
    println!();
    println!("{}", engine.stats());

    if let Some(path) = &args.telemetry_out {
        export_csv(&reports, path)
            .with_context(|| format!("failed to write telemetry to {}", path.display()))?;
        info!(path = %path.display(), rows = reports.len(), "Telemetry exported");
    }
    Ok(())
}

fn print_tick(r: &TickReport) {
    println!(
        "[{}] tick {:>5} | gen {:>5.2} kW | use {:>5.2} kW | net {:>+6.2} kW | ${:.3}/kWh | batt {:>4.1}% | saved ${:.2}",
        r.time,
        r.tick,
        r.flows.total_generation,
        r.flows.total_consumption,
        r.flows.net_flow,
        r.state.grid_price,
        r.state.battery_level,
        r.stats.total_savings,
    );
    if let Some(n) = &r.negotiation {
        println!("        negotiation #{}: {}", n.id, n.template.message);
    }
    if let Some(d) = &r.decision {
        println!("        decision #{}: {} ({})", d.id, d.template.summary, d.impact);
    }
}

/// Ticks on the host clock until Ctrl-C.
#[cfg_attr(not(feature = "api"), allow(unused_variables))]
async fn run_live(
    args: &Args,
    config: &SimulationConfig,
    catalog: Catalog,
    engine: Engine<SeededRandom>,
) -> anyhow::Result<()> {
    let scheduler = Scheduler::start(engine, SystemClock, config.tick_period());
    info!("Running live; press Ctrl-C to stop");

    #[cfg(feature = "api")]
    let server = if args.serve {
        let state = vpp_benefit_sim::api::AppState::new(
            scheduler.subscribe(),
            std::sync::Arc::new(catalog),
        );
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], args.port));
        Some(tokio::spawn(vpp_benefit_sim::api::serve(
            state,
            addr,
            shutdown_signal(),
        )))
    } else {
        None
    };

    // A server that fails to bind exits at once; surface that without
    // waiting for Ctrl-C.
    #[cfg(feature = "api")]
    match server {
        Some(mut handle) => tokio::select! {
            joined = &mut handle => joined?.context("API server failed")?,
            () = shutdown_signal() => handle.await?.context("API server failed")?,
        },
        None => shutdown_signal().await,
    }
    #[cfg(not(feature = "api"))]
    shutdown_signal().await;

    let final_snapshot = scheduler.latest();
    if let Some(engine) = scheduler.stop().await {
        info!(ticks = engine.ticks(), "Simulation stopped");
    }
    println!("{}", final_snapshot.stats);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
    }
}

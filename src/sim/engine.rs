//! Simulation engine that ties the energy model, accrual and events together.

use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::config::SimulationConfig;
use crate::error::Result;

use super::accrual::{AccrualDelta, AccrualInput, BenefitAccrualEngine, CumulativeStats};
use super::clock::{ClockSource, WallTime};
use super::event::{DecisionEvent, EventGenerator, NegotiationEvent};
use super::rng::RandomSource;
use super::state::{EnergyFlows, EnergyState, EnergyStateModel};

/// Everything one tick produced.
#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    /// 1-based tick number.
    pub tick: u64,
    pub time: WallTime,
    pub state: EnergyState,
    pub flows: EnergyFlows,
    pub delta: AccrualDelta,
    /// Counters after this tick.
    pub stats: CumulativeStats,
    pub negotiation: Option<NegotiationEvent>,
    pub decision: Option<DecisionEvent>,
}

/// Immutable, internally consistent view published after each tick.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// Number of completed ticks.
    pub version: u64,
    /// Time of the last tick, or `None` before the first one.
    pub time: Option<WallTime>,
    pub state: EnergyState,
    pub flows: EnergyFlows,
    pub stats: CumulativeStats,
    /// Newest first.
    pub negotiations: Vec<NegotiationEvent>,
    /// Newest first.
    pub decisions: Vec<DecisionEvent>,
}

/// Single owner of all mutable simulation state.
///
/// Generic over `R: RandomSource` so tests can script every draw.
pub struct Engine<R: RandomSource> {
    model: EnergyStateModel,
    accrual: BenefitAccrualEngine,
    events: EventGenerator,
    rng: R,
    interval_minutes: f64,
    ticks: u64,
    last_time: Option<WallTime>,
}

impl<R: RandomSource> Engine<R> {
    /// Creates an engine from a configuration and catalog.
    ///
    /// # Arguments
    ///
    /// * `config` - Simulation configuration; validated here
    /// * `catalog` - Negotiation and decision templates
    /// * `rng` - Random source used for every stochastic rule
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::InvalidConfig`] if the configuration
    /// fails validation.
    pub fn new(config: &SimulationConfig, catalog: &Catalog, rng: R) -> Result<Self> {
        let config = config.clone().validated()?;
        let model = EnergyStateModel::new(&config);
        for (device, role) in model.devices() {
            debug!(device, ?role, "Device registered");
        }
        info!(
            interval_minutes = config.interval_minutes(),
            negotiations = catalog.negotiations().len(),
            decisions = catalog.decisions().len(),
            "Engine ready"
        );
        Ok(Self {
            model,
            accrual: BenefitAccrualEngine::new(config.accrual.clone(), config.pricing.peak_hours),
            events: EventGenerator::new(catalog, config.events.clone()),
            rng,
            interval_minutes: config.interval_minutes(),
            ticks: 0,
            last_time: None,
        })
    }

    /// Executes one tick at wall time `now`.
    ///
    /// Order: state update, accrual on the updated state, negotiation roll,
    /// decision roll.
    pub fn step(&mut self, now: WallTime) -> TickReport {
        let state = self.model.tick(now, &mut self.rng).clone();
        let flows = state.flows();

        let delta = self.accrual.accrue(
            AccrualInput {
                state: &state,
                net_flow: flows.net_flow,
                interval_minutes: self.interval_minutes,
                hour: now.hour(),
            },
            &mut self.rng,
        );

        let negotiation = self.events.maybe_emit_negotiation(now, &mut self.rng);
        let decision = self.events.maybe_emit_decision(now, &mut self.rng);

        self.ticks += 1;
        self.last_time = Some(now);

        debug!(
            tick = self.ticks,
            time = %now,
            net_kw = flows.net_flow,
            price = state.grid_price,
            battery = state.battery_level,
            savings = self.accrual.stats().total_savings,
            "tick"
        );

        TickReport {
            tick: self.ticks,
            time: now,
            state,
            flows,
            delta,
            stats: self.accrual.stats().clone(),
            negotiation,
            decision,
        }
    }

    /// Runs `ticks` steps, sampling `clock` once per step.
    pub fn run(&mut self, clock: &mut impl ClockSource, ticks: u64) -> Vec<TickReport> {
        let mut reports = Vec::with_capacity(usize::try_from(ticks).unwrap_or(0));
        for _ in 0..ticks {
            let now = clock.now();
            reports.push(self.step(now));
        }
        reports
    }

    /// Copies the current state into a consistent snapshot.
    pub fn snapshot(&self) -> Snapshot {
        let state = self.model.state().clone();
        Snapshot {
            version: self.ticks,
            time: self.last_time,
            flows: state.flows(),
            state,
            stats: self.accrual.stats().clone(),
            negotiations: self.events.negotiation_log().to_vec(),
            decisions: self.events.decision_log().to_vec(),
        }
    }

    pub fn state(&self) -> &EnergyState {
        self.model.state()
    }

    pub fn stats(&self) -> &CumulativeStats {
        self.accrual.stats()
    }

    pub fn events(&self) -> &EventGenerator {
        &self.events
    }

    /// Completed tick count.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn rng(&self) -> &R {
        &self.rng
    }
}

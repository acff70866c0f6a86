//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use vpp_benefit_sim::catalog::Catalog;
use vpp_benefit_sim::config::SimulationConfig;
use vpp_benefit_sim::sim::Engine;
use vpp_benefit_sim::sim::clock::{SteppedClock, WallTime};
use vpp_benefit_sim::sim::rng::{RandomSource, SeededRandom};

/// Replays a fixed sequence of unit values (cycling) and counts draws.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: Vec<f64>,
    pub draws: usize,
}

impl ScriptedRandom {
    pub fn new(values: &[f64]) -> Self {
        assert!(!values.is_empty());
        Self {
            values: values.to_vec(),
            draws: 0,
        }
    }

    /// Always returns `value`.
    pub fn constant(value: f64) -> Self {
        Self::new(&[value])
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f64 {
        let v = self.values[self.draws % self.values.len()];
        self.draws += 1;
        v
    }
}

pub fn at(hour: u32, minute: u32) -> WallTime {
    WallTime::new(hour, minute).unwrap()
}

/// Clock starting at `hour:minute` and advancing one minute per tick.
pub fn minute_clock(hour: u32, minute: u32) -> SteppedClock {
    SteppedClock::new(at(hour, minute), 60)
}

/// Demo-preset engine with the built-in catalog and a seeded source.
pub fn seeded_engine(seed: u64) -> Engine<SeededRandom> {
    Engine::new(
        &SimulationConfig::demo(),
        &Catalog::builtin().unwrap(),
        SeededRandom::new(seed),
    )
    .unwrap()
}

/// Demo-preset engine driven by a scripted source.
pub fn scripted_engine(rng: ScriptedRandom) -> Engine<ScriptedRandom> {
    Engine::new(&SimulationConfig::demo(), &Catalog::builtin().unwrap(), rng).unwrap()
}

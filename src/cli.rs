use std::path::PathBuf;

use clap::Parser;

use vpp_benefit_sim::catalog::Catalog;
use vpp_benefit_sim::config::SimulationConfig;
use vpp_benefit_sim::error::Result;
use vpp_benefit_sim::sim::clock::WallTime;

/// Household virtual power plant benefit simulator.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Load configuration from a TOML file.
    #[clap(long, conflicts_with = "preset")]
    pub config: Option<PathBuf>,

    /// Use a built-in preset (demo, realtime).
    #[clap(long)]
    pub preset: Option<String>,

    /// Load negotiation and decision templates from a TOML file.
    #[clap(long)]
    pub catalog: Option<PathBuf>,

    /// Override the random seed.
    #[clap(long)]
    pub seed: Option<u64>,

    /// Run this many ticks on a simulated clock and exit.
    #[clap(long)]
    pub ticks: Option<u64>,

    /// Start time of the simulated clock (HH:MM).
    #[clap(long, default_value = "12:00", value_parser = parse_start)]
    pub start: WallTime,

    /// Export per-tick results to CSV (requires --ticks).
    #[clap(long, requires = "ticks")]
    pub telemetry_out: Option<PathBuf>,

    /// Serve the read-only REST API while running live.
    #[cfg(feature = "api")]
    #[clap(long, conflicts_with = "ticks")]
    pub serve: bool,

    /// API server port.
    #[cfg(feature = "api")]
    #[clap(long, default_value = "3000")]
    pub port: u16,
}

impl Args {
    /// Resolves the configuration source, applies overrides and validates.
    ///
    /// Falls back to the `demo` preset when neither `--config` nor
    /// `--preset` is given.
    pub fn load_config(&self) -> Result<SimulationConfig> {
        let mut config = match (&self.config, &self.preset) {
            (Some(path), _) => SimulationConfig::from_toml_file(path)?,
            (None, Some(name)) => SimulationConfig::from_preset(name)?,
            (None, None) => SimulationConfig::demo(),
        };
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        config.validated()
    }

    pub fn load_catalog(&self) -> Result<Catalog> {
        match &self.catalog {
            Some(path) => Catalog::from_toml_file(path),
            None => Catalog::builtin(),
        }
    }
}

fn parse_start(s: &str) -> std::result::Result<WallTime, String> {
    WallTime::parse_hhmm(s).map_err(|e| e.to_string())
}

//! TOML-based simulation configuration and preset definitions.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, Error, Result};
use crate::sim::state::Weather;

/// Top-level simulation configuration parsed from TOML.
///
/// All fields have defaults matching the `demo` preset. Load from TOML with
/// [`SimulationConfig::from_toml_file`] or use [`SimulationConfig::demo`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Master random seed. `None` draws one at startup.
    pub seed: Option<u64>,
    /// Tick cadence and demo acceleration.
    pub timing: TimingConfig,
    /// Time-of-use price bands.
    pub pricing: PricingConfig,
    /// Baseline-versus-optimized accrual constants.
    pub accrual: AccrualConfig,
    /// Negotiation/decision log parameters.
    pub events: EventsConfig,
    /// Per-asset model parameters.
    pub devices: DevicesConfig,
    /// Energy state at process start.
    pub initial: InitialStateConfig,
}

/// Tick cadence and demo acceleration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    /// Real-time period between ticks (ms).
    pub tick_period_ms: u64,
    /// Simulated minutes per real minute used for accrual.
    pub demo_acceleration_factor: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: 2000,
            demo_acceleration_factor: 15.0,
        }
    }
}

/// Time-of-use price bands. Hour windows are inclusive on both ends.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PricingConfig {
    /// Price is redrawn only when `minute % refresh_minutes == 0`.
    pub refresh_minutes: u32,
    pub peak_hours: [u32; 2],
    pub mid_peak_hours: [u32; 2],
    /// Peak price range ($/kWh).
    pub peak_price: [f64; 2],
    /// Mid-peak price range ($/kWh).
    pub mid_peak_price: [f64; 2],
    /// Off-peak price range ($/kWh).
    pub off_peak_price: [f64; 2],
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            refresh_minutes: 15,
            peak_hours: [16, 21],
            mid_peak_hours: [6, 16],
            peak_price: [0.18, 0.26],
            mid_peak_price: [0.12, 0.16],
            off_peak_price: [0.06, 0.10],
        }
    }
}

/// Baseline-versus-optimized accrual constants.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AccrualConfig {
    /// Renewable utilisation of the uncoordinated baseline (0–1].
    pub baseline_efficiency: f64,
    /// Renewable utilisation of the coordinated system (0–1].
    pub ai_efficiency: f64,
    /// Fixed baseline consumption per interval (kWh).
    pub baseline_consumption_kwh: f64,
    /// Grid emission factor (lbs CO2 per kWh).
    pub co2_factor_lbs_per_kwh: f64,
    /// Social cost of carbon ($ per short ton).
    pub social_cost_per_ton_usd: f64,
    pub ton_in_lbs: f64,
    /// Grid contribution multiplier for peak-hour export.
    pub peak_export_multiplier: f64,
    /// Grid contribution multiplier otherwise.
    pub standard_multiplier: f64,
    /// Range of the per-tick efficiency bonus.
    pub bonus_range: [f64; 2],
}

impl Default for AccrualConfig {
    fn default() -> Self {
        Self {
            baseline_efficiency: 0.65,
            ai_efficiency: 0.95,
            baseline_consumption_kwh: 4.5,
            co2_factor_lbs_per_kwh: 0.85,
            social_cost_per_ton_usd: 185.0,
            ton_in_lbs: 2000.0,
            peak_export_multiplier: 1.2,
            standard_multiplier: 0.3,
            bonus_range: [0.8, 1.3],
        }
    }
}

/// Negotiation/decision log parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EventsConfig {
    /// Capacity of each newest-first log.
    pub max_log_entries: usize,
    /// Per-tick probability of a negotiation.
    pub negotiation_probability: f64,
    /// Per-tick probability of a decision.
    pub decision_probability: f64,
    /// Range of the synthesized efficiency impact (%).
    pub impact_range_pct: [f64; 2],
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            max_log_entries: 5,
            negotiation_probability: 0.3,
            decision_probability: 0.4,
            impact_range_pct: [5.0, 20.0],
        }
    }
}

/// Per-asset model parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DevicesConfig {
    /// Solar output at the envelope peak (kW).
    pub solar_peak_kw: f64,
    /// Daylight window (hours, inclusive).
    pub solar_window_hours: [u32; 2],
    /// Half-width of the uniform solar noise (kW).
    pub solar_noise_kw: f64,
    pub wind_mean_kw: f64,
    /// Half-width of the uniform wind noise (kW).
    pub wind_noise_kw: f64,
    /// Home consumption range (kW).
    pub home_range_kw: [f64; 2],
    /// Battery state-of-charge bounds (%).
    pub battery_range_pct: [f64; 2],
    /// Half-width of the battery random walk step (%).
    pub battery_step_pct: f64,
    /// Constant EV charging power (kW).
    pub ev_charging_kw: f64,
}

impl Default for DevicesConfig {
    fn default() -> Self {
        Self {
            solar_peak_kw: 8.0,
            solar_window_hours: [6, 18],
            solar_noise_kw: 0.25,
            wind_mean_kw: 3.0,
            wind_noise_kw: 1.0,
            home_range_kw: [2.5, 4.5],
            battery_range_pct: [10.0, 95.0],
            battery_step_pct: 1.0,
            ev_charging_kw: 7.2,
        }
    }
}

/// Energy state at process start.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InitialStateConfig {
    pub solar_kw: f64,
    pub wind_kw: f64,
    pub battery_pct: f64,
    pub home_kw: f64,
    pub grid_price: f64,
    pub weather: Weather,
}

impl Default for InitialStateConfig {
    fn default() -> Self {
        Self {
            solar_kw: 4.2,
            wind_kw: 2.8,
            battery_pct: 75.0,
            home_kw: 3.5,
            grid_price: 0.12,
            weather: Weather::Sunny,
        }
    }
}

impl SimulationConfig {
    /// Available preset names.
    pub const PRESETS: &[&str] = &["demo", "realtime"];

    /// Demo preset: 2 s ticks, each integrating 0.5 simulated minutes.
    pub fn demo() -> Self {
        Self::default()
    }

    /// Realtime preset: no acceleration, accrual follows wall time.
    pub fn realtime() -> Self {
        Self {
            timing: TimingConfig {
                demo_acceleration_factor: 1.0,
                ..TimingConfig::default()
            },
            ..Self::default()
        }
    }

    /// Loads a named preset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self> {
        match name {
            "demo" => Ok(Self::demo()),
            "realtime" => Ok(Self::realtime()),
            _ => Err(vec![ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )]
            .into()),
        }
    }

    /// Parses configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Toml`] if the TOML is invalid or has unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Real-time period between ticks.
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.timing.tick_period_ms)
    }

    /// Simulated minutes integrated per tick.
    pub fn interval_minutes(&self) -> f64 {
        self.timing.tick_period_ms as f64 / 60_000.0 * self.timing.demo_acceleration_factor
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let t = &self.timing;
        if t.tick_period_ms == 0 {
            errors.push(ConfigError::new("timing.tick_period_ms", "must be > 0"));
        }
        if !(t.demo_acceleration_factor > 0.0) {
            errors.push(ConfigError::new(
                "timing.demo_acceleration_factor",
                "must be > 0",
            ));
        }

        let p = &self.pricing;
        if p.refresh_minutes == 0 || p.refresh_minutes > 60 {
            errors.push(ConfigError::new(
                "pricing.refresh_minutes",
                "must be in [1, 60]",
            ));
        }
        check_hours(&mut errors, "pricing.peak_hours", p.peak_hours);
        check_hours(&mut errors, "pricing.mid_peak_hours", p.mid_peak_hours);
        check_price(&mut errors, "pricing.peak_price", p.peak_price);
        check_price(&mut errors, "pricing.mid_peak_price", p.mid_peak_price);
        check_price(&mut errors, "pricing.off_peak_price", p.off_peak_price);

        let a = &self.accrual;
        check_efficiency(&mut errors, "accrual.baseline_efficiency", a.baseline_efficiency);
        check_efficiency(&mut errors, "accrual.ai_efficiency", a.ai_efficiency);
        for (field, value) in [
            ("accrual.baseline_consumption_kwh", a.baseline_consumption_kwh),
            ("accrual.co2_factor_lbs_per_kwh", a.co2_factor_lbs_per_kwh),
            ("accrual.social_cost_per_ton_usd", a.social_cost_per_ton_usd),
            ("accrual.peak_export_multiplier", a.peak_export_multiplier),
            ("accrual.standard_multiplier", a.standard_multiplier),
        ] {
            if !(value >= 0.0) {
                errors.push(ConfigError::new(field, "must be >= 0"));
            }
        }
        if !(a.ton_in_lbs > 0.0) {
            errors.push(ConfigError::new("accrual.ton_in_lbs", "must be > 0"));
        }
        check_range(&mut errors, "accrual.bonus_range", a.bonus_range, 0.0);

        let e = &self.events;
        if e.max_log_entries == 0 {
            errors.push(ConfigError::new("events.max_log_entries", "must be > 0"));
        }
        check_probability(
            &mut errors,
            "events.negotiation_probability",
            e.negotiation_probability,
        );
        check_probability(
            &mut errors,
            "events.decision_probability",
            e.decision_probability,
        );
        check_range(&mut errors, "events.impact_range_pct", e.impact_range_pct, 0.0);

        let d = &self.devices;
        if !(d.solar_peak_kw >= 0.0) {
            errors.push(ConfigError::new("devices.solar_peak_kw", "must be >= 0"));
        }
        check_hours(&mut errors, "devices.solar_window_hours", d.solar_window_hours);
        for (field, value) in [
            ("devices.solar_noise_kw", d.solar_noise_kw),
            ("devices.wind_mean_kw", d.wind_mean_kw),
            ("devices.wind_noise_kw", d.wind_noise_kw),
            ("devices.battery_step_pct", d.battery_step_pct),
            ("devices.ev_charging_kw", d.ev_charging_kw),
        ] {
            if !(value >= 0.0) {
                errors.push(ConfigError::new(field, "must be >= 0"));
            }
        }
        check_range(&mut errors, "devices.home_range_kw", d.home_range_kw, 0.0);
        check_range(
            &mut errors,
            "devices.battery_range_pct",
            d.battery_range_pct,
            0.0,
        );
        if d.battery_range_pct[1] > 100.0 {
            errors.push(ConfigError::new(
                "devices.battery_range_pct",
                "upper bound must be <= 100",
            ));
        }

        let i = &self.initial;
        let [bmin, bmax] = d.battery_range_pct;
        if !(bmin..=bmax).contains(&i.battery_pct) {
            errors.push(ConfigError::new(
                "initial.battery_pct",
                "must lie within devices.battery_range_pct",
            ));
        }
        for (field, value) in [
            ("initial.solar_kw", i.solar_kw),
            ("initial.wind_kw", i.wind_kw),
            ("initial.home_kw", i.home_kw),
        ] {
            if !(value >= 0.0) {
                errors.push(ConfigError::new(field, "must be >= 0"));
            }
        }
        if !(i.grid_price > 0.0) {
            errors.push(ConfigError::new("initial.grid_price", "must be > 0"));
        }

        errors
    }

    /// Validates and converts the error list into a single [`Error`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] listing every violation.
    pub fn validated(self) -> Result<Self> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(errors.into())
        }
    }
}

fn check_hours(errors: &mut Vec<ConfigError>, field: &str, [start, end]: [u32; 2]) {
    if start > 23 || end > 23 {
        errors.push(ConfigError::new(field, "hours must be in [0, 23]"));
    } else if start > end {
        errors.push(ConfigError::new(field, "start must be <= end"));
    }
}

fn check_range(errors: &mut Vec<ConfigError>, field: &str, [lo, hi]: [f64; 2], min: f64) {
    if !(lo >= min) {
        errors.push(ConfigError::new(field, format!("lower bound must be >= {min}")));
    }
    if !(lo <= hi) {
        errors.push(ConfigError::new(field, "lower bound must be <= upper bound"));
    }
}

fn check_price(errors: &mut Vec<ConfigError>, field: &str, range: [f64; 2]) {
    if !(range[0] > 0.0) {
        errors.push(ConfigError::new(field, "prices must be > 0"));
    }
    check_range(errors, field, range, 0.0);
}

fn check_efficiency(errors: &mut Vec<ConfigError>, field: &str, value: f64) {
    if !(value > 0.0 && value <= 1.0) {
        errors.push(ConfigError::new(field, "must be in (0.0, 1.0]"));
    }
}

fn check_probability(errors: &mut Vec<ConfigError>, field: &str, value: f64) {
    if !(0.0..=1.0).contains(&value) {
        errors.push(ConfigError::new(field, "must be in [0.0, 1.0]"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_preset_valid() {
        let errors = SimulationConfig::demo().validate();
        assert!(errors.is_empty(), "demo should be valid: {errors:?}");
    }

    #[test]
    fn all_presets_are_valid() {
        for name in SimulationConfig::PRESETS {
            let cfg = SimulationConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.map(|c| c.validate()).unwrap_or_default();
            assert!(errors.is_empty(), "preset \"{name}\": {errors:?}");
        }
    }

    #[test]
    fn from_preset_unknown() {
        let err = SimulationConfig::from_preset("nonexistent").unwrap_err();
        assert!(err.to_string().contains("unknown preset"));
    }

    #[test]
    fn demo_interval_is_half_a_minute() {
        let cfg = SimulationConfig::demo();
        assert!((cfg.interval_minutes() - 0.5).abs() < 1e-12);
        assert_eq!(cfg.tick_period(), Duration::from_secs(2));
    }

    #[test]
    fn realtime_interval_matches_tick_period() {
        let cfg = SimulationConfig::realtime();
        assert!((cfg.interval_minutes() - 2.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
seed = 99

[timing]
tick_period_ms = 1000
demo_acceleration_factor = 30.0

[pricing]
refresh_minutes = 5
peak_hours = [17, 20]

[events]
max_log_entries = 3
negotiation_probability = 0.5

[initial]
weather = "windy"
battery_pct = 50.0
"#;
        let cfg = SimulationConfig::from_toml_str(toml).unwrap();
        assert_eq!(cfg.seed, Some(99));
        assert_eq!(cfg.pricing.refresh_minutes, 5);
        assert_eq!(cfg.pricing.peak_hours, [17, 20]);
        assert_eq!(cfg.pricing.mid_peak_hours, [6, 16]);
        assert_eq!(cfg.events.max_log_entries, 3);
        assert_eq!(cfg.events.decision_probability, 0.4);
        assert_eq!(cfg.initial.weather, Weather::Windy);
        assert!((cfg.interval_minutes() - 0.5).abs() < 1e-12);
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[timing]
tick_period_ms = 2000
bogus_field = true
"#;
        assert!(SimulationConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn validation_catches_negative_probability() {
        let mut cfg = SimulationConfig::demo();
        cfg.events.negotiation_probability = -0.1;
        let errors = cfg.validate();
        assert!(
            errors
                .iter()
                .any(|e| e.field == "events.negotiation_probability")
        );
    }

    #[test]
    fn validation_catches_zero_log_capacity() {
        let mut cfg = SimulationConfig::demo();
        cfg.events.max_log_entries = 0;
        assert!(cfg.validated().is_err());
    }

    #[test]
    fn validation_catches_inverted_price_range() {
        let mut cfg = SimulationConfig::demo();
        cfg.pricing.peak_price = [0.3, 0.2];
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "pricing.peak_price"));
    }

    #[test]
    fn validation_catches_bad_hours() {
        let mut cfg = SimulationConfig::demo();
        cfg.pricing.mid_peak_hours = [6, 24];
        cfg.devices.solar_window_hours = [18, 6];
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "pricing.mid_peak_hours"));
        assert!(errors.iter().any(|e| e.field == "devices.solar_window_hours"));
    }

    #[test]
    fn validation_catches_initial_battery_outside_bounds() {
        let mut cfg = SimulationConfig::demo();
        cfg.initial.battery_pct = 99.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "initial.battery_pct"));
    }

    #[test]
    fn validation_catches_efficiency_out_of_range() {
        let mut cfg = SimulationConfig::demo();
        cfg.accrual.ai_efficiency = 1.5;
        cfg.accrual.baseline_efficiency = 0.0;
        let errors = cfg.validate();
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.field.ends_with("_efficiency"))
                .count(),
            2
        );
    }

    #[test]
    fn validation_catches_nan_acceleration() {
        let mut cfg = SimulationConfig::demo();
        cfg.timing.demo_acceleration_factor = f64::NAN;
        let errors = cfg.validate();
        assert!(
            errors
                .iter()
                .any(|e| e.field == "timing.demo_acceleration_factor")
        );
    }
}

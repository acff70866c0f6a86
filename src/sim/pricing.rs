//! Time-of-use grid pricing.

use serde::Serialize;

use crate::config::PricingConfig;

use super::rng::RandomSource;

/// Price band for an hour of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceBand {
    Peak,
    MidPeak,
    OffPeak,
}

/// Draws a new grid price at market-interval boundaries.
///
/// The price is refreshed only on minutes divisible by `refresh_minutes`
/// and otherwise carried over unchanged. Band windows are inclusive on both
/// ends and may overlap; peak is checked first so an hour in both windows
/// is priced as peak.
#[derive(Debug, Clone)]
pub struct PricingPolicy {
    refresh_minutes: u32,
    peak_hours: [u32; 2],
    mid_peak_hours: [u32; 2],
    peak_price: [f64; 2],
    mid_peak_price: [f64; 2],
    off_peak_price: [f64; 2],
}

impl PricingPolicy {
    pub fn new(config: &PricingConfig) -> Self {
        Self {
            refresh_minutes: config.refresh_minutes.max(1),
            peak_hours: config.peak_hours,
            mid_peak_hours: config.mid_peak_hours,
            peak_price: config.peak_price,
            mid_peak_price: config.mid_peak_price,
            off_peak_price: config.off_peak_price,
        }
    }

    /// Returns the band an hour falls into.
    pub fn band_for(&self, hour: u32) -> PriceBand {
        let within = |[start, end]: [u32; 2]| hour >= start && hour <= end;
        if within(self.peak_hours) {
            PriceBand::Peak
        } else if within(self.mid_peak_hours) {
            PriceBand::MidPeak
        } else {
            PriceBand::OffPeak
        }
    }

    /// Whether the price is redrawn at `minute`.
    pub fn is_refresh_minute(&self, minute: u32) -> bool {
        minute % self.refresh_minutes == 0
    }

    /// Price range ($/kWh) of a band.
    pub fn range(&self, band: PriceBand) -> [f64; 2] {
        match band {
            PriceBand::Peak => self.peak_price,
            PriceBand::MidPeak => self.mid_peak_price,
            PriceBand::OffPeak => self.off_peak_price,
        }
    }

    /// Returns the price for this tick.
    ///
    /// Draws from `rng` only on a refresh minute.
    ///
    /// # Arguments
    ///
    /// * `hour` - Hour of day (0-23)
    /// * `minute` - Minute of hour (0-59)
    /// * `previous` - Price in effect before this tick ($/kWh)
    /// * `rng` - Shared random source
    pub fn price_for(
        &self,
        hour: u32,
        minute: u32,
        previous: f64,
        rng: &mut dyn RandomSource,
    ) -> f64 {
        if !self.is_refresh_minute(minute) {
            return previous;
        }
        let [lo, hi] = self.range(self.band_for(hour));
        rng.uniform(lo, hi)
    }
}

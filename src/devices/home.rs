use crate::devices::types::{Device, DeviceContext, DeviceRole};

/// Household consumption drawn uniformly each tick.
///
/// There is no smoothing between ticks; the load is intentionally noisy.
///
/// # Examples
///
/// ```
/// use vpp_benefit_sim::devices::{Device, DeviceContext, HomeLoad};
/// use vpp_benefit_sim::sim::clock::WallTime;
/// use vpp_benefit_sim::sim::rng::SeededRandom;
///
/// let mut home = HomeLoad::new(2.5, 4.5);
/// let mut rng = SeededRandom::new(42);
/// let mut ctx = DeviceContext::new(WallTime::new(12, 0).unwrap(), &mut rng);
/// let kw = home.power_kw(&mut ctx);
/// assert!((2.5..4.5).contains(&kw));
/// ```
#[derive(Debug, Clone)]
pub struct HomeLoad {
    /// Minimum consumption in kilowatts.
    pub min_kw: f64,

    /// Maximum consumption in kilowatts.
    pub max_kw: f64,
}

impl HomeLoad {
    /// Creates a new home load.
    ///
    /// # Panics
    ///
    /// Panics if `min_kw < 0` or `min_kw > max_kw`.
    pub fn new(min_kw: f64, max_kw: f64) -> Self {
        assert!(min_kw >= 0.0 && min_kw <= max_kw);
        Self { min_kw, max_kw }
    }
}

impl Device for HomeLoad {
    fn power_kw(&mut self, context: &mut DeviceContext<'_>) -> f64 {
        context.rng.uniform(self.min_kw, self.max_kw)
    }

    fn role(&self) -> DeviceRole {
        DeviceRole::Consumption
    }

    fn device_type(&self) -> &'static str {
        "Home"
    }
}

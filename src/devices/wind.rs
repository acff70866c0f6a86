use crate::devices::types::{Device, DeviceContext, DeviceRole, uniform_noise};

/// Wind turbine with a constant mean output and uniform variability.
///
/// Output does not depend on time of day.
#[derive(Debug, Clone)]
pub struct WindTurbine {
    /// Mean output in kilowatts.
    pub mean_kw: f64,

    /// Half-width of the uniform noise in kilowatts.
    pub noise_kw: f64,
}

impl WindTurbine {
    pub fn new(mean_kw: f64, noise_kw: f64) -> Self {
        Self {
            mean_kw: mean_kw.max(0.0),
            noise_kw: noise_kw.max(0.0),
        }
    }
}

impl Device for WindTurbine {
    fn power_kw(&mut self, context: &mut DeviceContext<'_>) -> f64 {
        (self.mean_kw + uniform_noise(context.rng, self.noise_kw)).max(0.0)
    }

    fn role(&self) -> DeviceRole {
        DeviceRole::Generation
    }

    fn device_type(&self) -> &'static str {
        "Wind"
    }
}

use std::f64::consts::PI;

use crate::devices::types::{Device, DeviceContext, DeviceRole, uniform_noise};

/// Solar array whose output follows a sinusoidal time-of-day envelope.
///
/// Between the first and last daylight hour (both inclusive) the envelope is
/// `sin((hour - first) * PI / 12) * 0.8 + 0.2`; outside the window it is zero.
/// Uniform noise is added on top and the result floored at zero, so a little
/// output can still appear at night when the noise is positive.
#[derive(Debug, Clone)]
pub struct SolarArray {
    /// Output at envelope peak in kilowatts.
    pub peak_kw: f64,

    /// First daylight hour (inclusive).
    pub sunrise_hour: u32,

    /// Last daylight hour (inclusive).
    pub sunset_hour: u32,

    /// Half-width of the uniform noise in kilowatts.
    pub noise_kw: f64,
}

impl SolarArray {
    /// Creates a new solar array.
    ///
    /// # Arguments
    ///
    /// * `peak_kw` - Output at envelope peak (kW)
    /// * `sunrise_hour` - First daylight hour (inclusive)
    /// * `sunset_hour` - Last daylight hour (inclusive)
    /// * `noise_kw` - Half-width of the uniform noise (kW)
    pub fn new(peak_kw: f64, sunrise_hour: u32, sunset_hour: u32, noise_kw: f64) -> Self {
        Self {
            peak_kw: peak_kw.max(0.0),
            sunrise_hour,
            sunset_hour,
            noise_kw: noise_kw.max(0.0),
        }
    }

    /// Envelope multiplier for an hour of day, `0.0` outside the daylight window.
    pub fn envelope(&self, hour: u32) -> f64 {
        if hour < self.sunrise_hour || hour > self.sunset_hour {
            return 0.0;
        }
        (f64::from(hour - self.sunrise_hour) * PI / 12.0).sin() * 0.8 + 0.2
    }
}

impl Device for SolarArray {
    fn power_kw(&mut self, context: &mut DeviceContext<'_>) -> f64 {
        let multiplier = self.envelope(context.time.hour());
        let noise = uniform_noise(context.rng, self.noise_kw);
        (self.peak_kw * multiplier + noise).max(0.0)
    }

    fn role(&self) -> DeviceRole {
        DeviceRole::Generation
    }

    fn device_type(&self) -> &'static str {
        "Solar"
    }
}

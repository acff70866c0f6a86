//! Common types and traits for device simulation components.

use crate::sim::clock::WallTime;
use crate::sim::rng::RandomSource;

/// Contextual information passed to devices during power calculations.
///
/// # Fields
/// * `time` - Time of day of the current tick
/// * `rng` - Shared random source; devices never own their own generator
pub struct DeviceContext<'a> {
    pub time: WallTime,
    pub rng: &'a mut dyn RandomSource,
}

impl<'a> DeviceContext<'a> {
    /// Creates a new DeviceContext for one tick.
    pub fn new(time: WallTime, rng: &'a mut dyn RandomSource) -> Self {
        Self { time, rng }
    }
}

/// Whether a device feeds or draws power.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceRole {
    Generation,
    Consumption,
}

/// Trait defining a device that can produce or consume electricity.
///
/// This trait provides a common interface for all power devices in the
/// simulation so the state model can sample them uniformly.
pub trait Device {
    /// Returns the power magnitude for the current tick.
    ///
    /// Always non-negative; the direction of flow is given by [`Device::role`].
    ///
    /// # Arguments
    ///
    /// * `context` - Current time of day and the shared random source
    ///
    /// # Returns
    ///
    /// Power in kilowatts (kW)
    fn power_kw(&mut self, context: &mut DeviceContext<'_>) -> f64;

    /// Whether this device generates or consumes.
    fn role(&self) -> DeviceRole;

    /// Returns a human-readable type name for the device.
    fn device_type(&self) -> &'static str;
}

/// Uniform noise in `[-half_width, +half_width)`.
pub fn uniform_noise(rng: &mut dyn RandomSource, half_width: f64) -> f64 {
    rng.uniform(-half_width, half_width)
}

use crate::devices::types::{Device, DeviceContext, DeviceRole};

/// An EV charger drawing a constant power.
///
/// Charging power is a slowly varying input in this model, so it is held at
/// the configured value and draws nothing from the random source.
#[derive(Debug, Clone)]
pub struct EvCharger {
    /// Charging power in kilowatts.
    pub charge_kw: f64,
}

impl EvCharger {
    pub fn new(charge_kw: f64) -> Self {
        Self {
            charge_kw: charge_kw.max(0.0),
        }
    }
}

impl Device for EvCharger {
    fn power_kw(&mut self, _context: &mut DeviceContext<'_>) -> f64 {
        self.charge_kw
    }

    fn role(&self) -> DeviceRole {
        DeviceRole::Consumption
    }

    fn device_type(&self) -> &'static str {
        "EVCharger"
    }
}

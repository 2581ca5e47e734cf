use battcurve_traits::{BoxError, ChargeControl};

/// Simulated battery for dry runs without a daemon.
///
/// Every voltage read moves the battery one step: up by `charge_step_v`
/// while charging is allowed (capped at `full_v`), down by `discharge_step_v`
/// otherwise (floored at `empty_v`).
#[derive(Debug, Clone)]
pub struct SimulatedBattery {
    voltage: f64,
    charging: bool,
    charge_step_v: f64,
    discharge_step_v: f64,
    full_v: f64,
    empty_v: f64,
}

impl Default for SimulatedBattery {
    fn default() -> Self {
        Self::new(3.90)
    }
}

impl SimulatedBattery {
    pub fn new(start_v: f64) -> Self {
        Self {
            voltage: start_v,
            charging: false,
            charge_step_v: 0.05,
            discharge_step_v: 0.04,
            full_v: 4.20,
            empty_v: 3.00,
        }
    }

    pub fn with_steps(mut self, charge_step_v: f64, discharge_step_v: f64) -> Self {
        self.charge_step_v = charge_step_v;
        self.discharge_step_v = discharge_step_v;
        self
    }

    pub fn is_charging(&self) -> bool {
        self.charging
    }
}

impl ChargeControl for SimulatedBattery {
    fn battery_voltage(&mut self) -> Result<f64, BoxError> {
        self.voltage = if self.charging {
            (self.voltage + self.charge_step_v).min(self.full_v)
        } else {
            (self.voltage - self.discharge_step_v).max(self.empty_v)
        };
        tracing::debug!(voltage = self.voltage, charging = self.charging, "simulated read");
        Ok(self.voltage)
    }

    fn set_charging(&mut self, enabled: bool) -> Result<(), BoxError> {
        tracing::debug!(enabled, "simulated set_allow_charging");
        self.charging = enabled;
        Ok(())
    }
}

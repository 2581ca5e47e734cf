//! Runtime configuration for the cycle controller.
//!
//! Separate from the TOML-deserialized config in `battcurve_config`; see
//! `conversions` for the mapping.

use std::time::Duration;

use crate::error::BuildError;

/// Thresholds and pacing of one charge/discharge cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleCfg {
    /// Charging ends at the first reading at or above this voltage.
    pub charge_until_v: f64,
    /// Discharging ends at the first reading at or below this voltage.
    pub discharge_until_v: f64,
    /// Fixed sleep between polls.
    pub poll_interval: Duration,
    /// Abort charging after this long (`None` disables).
    pub max_charge: Option<Duration>,
    /// Abort discharging after this long (`None` disables).
    pub max_discharge: Option<Duration>,
}

impl Default for CycleCfg {
    fn default() -> Self {
        Self {
            charge_until_v: 4.19,
            discharge_until_v: 3.10,
            poll_interval: Duration::from_secs(5),
            max_charge: None,
            max_discharge: None,
        }
    }
}

impl CycleCfg {
    pub fn validate(&self) -> Result<(), BuildError> {
        if !(self.charge_until_v.is_finite() && self.discharge_until_v.is_finite()) {
            return Err(BuildError::InvalidConfig("thresholds must be finite"));
        }
        if self.charge_until_v <= self.discharge_until_v {
            return Err(BuildError::InvalidConfig(
                "charge_until_v must be above discharge_until_v",
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(BuildError::InvalidConfig("poll_interval must be > 0"));
        }
        Ok(())
    }
}

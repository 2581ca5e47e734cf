pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Error type used at the device boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Anything that can report the battery voltage and gate the charger.
///
/// Implementations issue at most one request per call and never retry.
pub trait ChargeControl {
    /// Current battery voltage in volts.
    fn battery_voltage(&mut self) -> Result<f64, BoxError>;
    /// Allow (`true`) or forbid (`false`) charging.
    fn set_charging(&mut self, enabled: bool) -> Result<(), BoxError>;
}

impl<T: ChargeControl + ?Sized> ChargeControl for Box<T> {
    fn battery_voltage(&mut self) -> Result<f64, BoxError> {
        (**self).battery_voltage()
    }

    fn set_charging(&mut self, enabled: bool) -> Result<(), BoxError> {
        (**self).set_charging(enabled)
    }
}

//! Scope guard that hands charging back to the daemon.

use std::ops::{Deref, DerefMut};

use battcurve_traits::ChargeControl;

/// Borrows the battery for the duration of a cycle and re-enables charging
/// exactly once when dropped, whatever path the cycle took out of its scope.
///
/// A failed re-enable is logged; it never replaces the error that ended the
/// cycle.
pub struct ChargingGuard<'a, B: ChargeControl + ?Sized> {
    battery: &'a mut B,
    restored: bool,
}

impl<'a, B: ChargeControl + ?Sized> ChargingGuard<'a, B> {
    pub fn new(battery: &'a mut B) -> Self {
        Self {
            battery,
            restored: false,
        }
    }

    /// Re-enable charging now instead of at drop. Later calls and the drop
    /// are no-ops. Returns whether the daemon acknowledged.
    pub fn restore(&mut self) -> bool {
        if self.restored {
            return true;
        }
        self.restored = true;
        match self.battery.set_charging(true) {
            Ok(()) => {
                tracing::info!("charging re-enabled");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to re-enable charging; check the daemon manually");
                false
            }
        }
    }
}

impl<B: ChargeControl + ?Sized> Deref for ChargingGuard<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.battery
    }
}

impl<B: ChargeControl + ?Sized> DerefMut for ChargingGuard<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        self.battery
    }
}

impl<B: ChargeControl + ?Sized> Drop for ChargingGuard<'_, B> {
    fn drop(&mut self) {
        self.restore();
    }
}

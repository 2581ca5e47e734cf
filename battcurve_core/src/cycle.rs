//! Charge/discharge cycle state machine.
//!
//! One cycle: allow charging and poll until the battery reads full, then
//! forbid charging and log `(elapsed, voltage)` on every poll until it reads
//! empty. Polling is strictly sequential with a blocking sleep in between.
//! Any device error, watchdog or interrupt aborts the cycle; charging is
//! re-enabled on the way out in every case.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use battcurve_traits::{ChargeControl, Clock, MonotonicClock};

use crate::config::CycleCfg;
use crate::control_error::map_control_error;
use crate::error::{BuildError, CurveError};
use crate::guard::ChargingGuard;
use crate::sample::{DischargeLog, VoltageSample};
use crate::status::CyclePhase;
use crate::util::sleep_cancellable;

pub struct CycleController<B, C = MonotonicClock> {
    battery: B,
    clock: C,
    cfg: CycleCfg,
    cancel: Option<Arc<AtomicBool>>,
    phase: CyclePhase,
}

impl<B, C> core::fmt::Debug for CycleController<B, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CycleController")
            .field("cfg", &self.cfg)
            .field("phase", &self.phase)
            .finish()
    }
}

impl<B: ChargeControl> CycleController<B, MonotonicClock> {
    /// Start building a controller (real-time clock unless overridden).
    pub fn builder() -> CycleControllerBuilder<B, MonotonicClock> {
        CycleControllerBuilder {
            battery: None,
            clock: MonotonicClock::new(),
            cfg: CycleCfg::default(),
            cancel: None,
        }
    }
}

impl<B: ChargeControl, C: Clock> CycleController<B, C> {
    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    pub fn cfg(&self) -> &CycleCfg {
        &self.cfg
    }

    pub fn battery(&self) -> &B {
        &self.battery
    }

    pub fn into_battery(self) -> B {
        self.battery
    }

    /// Run the full cycle and return the discharge log.
    ///
    /// On any error the phase becomes `Aborted`, charging is re-enabled once,
    /// and the original error is returned.
    pub fn run(&mut self) -> Result<DischargeLog, CurveError> {
        if self.phase != CyclePhase::Idle {
            return Err(CurveError::State(format!(
                "cycle already {}",
                self.phase.name()
            )));
        }
        let Self {
            battery,
            clock,
            cfg,
            cancel,
            phase,
        } = self;

        let mut battery = ChargingGuard::new(battery);
        let outcome = drive(&mut *battery, clock, cfg, cancel.as_deref(), phase);
        match &outcome {
            Ok(log) => tracing::info!(samples = log.len(), "cycle complete"),
            Err(e) => {
                tracing::error!(error = %e, during = phase.name(), "cycle aborted");
                *phase = CyclePhase::Aborted;
            }
        }
        drop(battery);
        outcome
    }
}

fn interrupted(cancel: Option<&AtomicBool>) -> Result<(), CurveError> {
    if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
        Err(CurveError::Interrupted)
    } else {
        Ok(())
    }
}

fn read_voltage<B: ChargeControl + ?Sized>(battery: &mut B) -> Result<f64, CurveError> {
    battery
        .battery_voltage()
        .map_err(|e| map_control_error(e.as_ref()))
}

fn set_charging<B: ChargeControl + ?Sized>(battery: &mut B, enabled: bool) -> Result<(), CurveError> {
    battery
        .set_charging(enabled)
        .map_err(|e| map_control_error(e.as_ref()))
}

fn watchdog<C: Clock>(
    phase: &'static str,
    limit: Option<Duration>,
    clock: &C,
    since: Instant,
) -> Result<(), CurveError> {
    match limit {
        Some(limit) if clock.now().saturating_duration_since(since) >= limit => {
            Err(CurveError::PhaseTimeout {
                phase,
                limit_ms: limit.as_millis() as u64,
            })
        }
        _ => Ok(()),
    }
}

fn pause<C: Clock>(clock: &C, d: Duration, cancel: Option<&AtomicBool>) -> Result<(), CurveError> {
    if sleep_cancellable(clock, d, cancel) {
        Ok(())
    } else {
        Err(CurveError::Interrupted)
    }
}

fn drive<B: ChargeControl + ?Sized, C: Clock>(
    battery: &mut B,
    clock: &C,
    cfg: &CycleCfg,
    cancel: Option<&AtomicBool>,
    phase: &mut CyclePhase,
) -> Result<DischargeLog, CurveError> {
    // Idle -> Charging
    interrupted(cancel)?;
    *phase = CyclePhase::Charging;
    set_charging(battery, true)?;
    tracing::info!(
        target_v = cfg.charge_until_v,
        "charging enabled, waiting for full"
    );
    let charge_start = clock.now();
    loop {
        interrupted(cancel)?;
        let voltage = read_voltage(battery)?;
        tracing::info!(phase = "charging", voltage, "poll");
        if voltage >= cfg.charge_until_v {
            break;
        }
        watchdog("charging", cfg.max_charge, clock, charge_start)?;
        pause(clock, cfg.poll_interval, cancel)?;
    }

    // Charging -> Discharging
    *phase = CyclePhase::Discharging;
    set_charging(battery, false)?;
    tracing::info!(
        target_v = cfg.discharge_until_v,
        "charging disabled, logging discharge"
    );
    let origin = clock.now();
    let mut log = DischargeLog::new();
    loop {
        interrupted(cancel)?;
        let voltage = read_voltage(battery)?;
        let elapsed = clock.now().saturating_duration_since(origin);
        log.push(VoltageSample::new(elapsed, voltage))?;
        tracing::info!(
            phase = "discharging",
            elapsed_s = elapsed.as_secs_f64(),
            voltage,
            "poll"
        );
        if voltage <= cfg.discharge_until_v {
            break;
        }
        watchdog("discharging", cfg.max_discharge, clock, origin)?;
        pause(clock, cfg.poll_interval, cancel)?;
    }

    *phase = CyclePhase::Completed;
    Ok(log)
}

/// Builder for [`CycleController`]. The battery is required; everything
/// else has defaults.
pub struct CycleControllerBuilder<B, C> {
    battery: Option<B>,
    clock: C,
    cfg: CycleCfg,
    cancel: Option<Arc<AtomicBool>>,
}

impl<B: ChargeControl, C: Clock> CycleControllerBuilder<B, C> {
    pub fn with_battery(mut self, battery: B) -> Self {
        self.battery = Some(battery);
        self
    }

    pub fn with_clock<C2: Clock>(self, clock: C2) -> CycleControllerBuilder<B, C2> {
        CycleControllerBuilder {
            battery: self.battery,
            clock,
            cfg: self.cfg,
            cancel: self.cancel,
        }
    }

    pub fn with_config(mut self, cfg: CycleCfg) -> Self {
        self.cfg = cfg;
        self
    }

    /// Flag that, once raised, aborts the cycle at the next check.
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn build(self) -> Result<CycleController<B, C>, BuildError> {
        let battery = self.battery.ok_or(BuildError::MissingBattery)?;
        self.cfg.validate()?;
        Ok(CycleController {
            battery,
            clock: self.clock,
            cfg: self.cfg,
            cancel: self.cancel,
            phase: CyclePhase::Idle,
        })
    }
}

//! Test and helper mocks for battcurve_core

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use battcurve_traits::{BoxError, ChargeControl};

/// Battery that replays a fixed script of voltage readings and records every
/// `set_charging` call. Reading past the end of the script is an error, so a
/// controller that polls more than expected fails loudly.
pub struct ScriptedBattery {
    readings: VecDeque<Result<f64, String>>,
    charging_calls: Arc<Mutex<Vec<bool>>>,
    reads: usize,
    enables: usize,
    fail_enable_from: Option<usize>,
    fail_disable: bool,
    on_read: Option<Box<dyn FnMut(usize)>>,
}

impl ScriptedBattery {
    /// Script of successful readings.
    pub fn new(voltages: impl IntoIterator<Item = f64>) -> Self {
        Self::with_script(voltages.into_iter().map(Ok))
    }

    /// Script mixing readings and failures (the `Err` text becomes the error message).
    pub fn with_script(script: impl IntoIterator<Item = Result<f64, &'static str>>) -> Self {
        Self {
            readings: script.into_iter().map(|r| r.map_err(str::to_string)).collect(),
            charging_calls: Arc::new(Mutex::new(Vec::new())),
            reads: 0,
            enables: 0,
            fail_enable_from: None,
            fail_disable: false,
            on_read: None,
        }
    }

    /// Make every `set_charging(true)` fail.
    pub fn fail_enable_charging(self) -> Self {
        self.fail_enable_from(1)
    }

    /// Let the first `nth - 1` `set_charging(true)` calls succeed and fail the
    /// rest, e.g. `fail_enable_from(2)` starts the cycle but breaks cleanup.
    pub fn fail_enable_from(mut self, nth: usize) -> Self {
        self.fail_enable_from = Some(nth.max(1));
        self
    }

    /// Make `set_charging(false)` fail.
    pub fn fail_disable_charging(mut self) -> Self {
        self.fail_disable = true;
        self
    }

    /// Hook run after every read with the 1-based read count.
    pub fn on_read(mut self, hook: impl FnMut(usize) + 'static) -> Self {
        self.on_read = Some(Box::new(hook));
        self
    }

    /// Shared log of `set_charging` arguments, in call order.
    pub fn charging_calls(&self) -> Arc<Mutex<Vec<bool>>> {
        self.charging_calls.clone()
    }

    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl ChargeControl for ScriptedBattery {
    fn battery_voltage(&mut self) -> Result<f64, BoxError> {
        self.reads += 1;
        let next = self
            .readings
            .pop_front()
            .unwrap_or_else(|| Err("script exhausted".to_string()));
        if let Some(hook) = self.on_read.as_mut() {
            hook(self.reads);
        }
        next.map_err(Into::into)
    }

    fn set_charging(&mut self, enabled: bool) -> Result<(), BoxError> {
        if let Ok(mut calls) = self.charging_calls.lock() {
            calls.push(enabled);
        }
        if enabled {
            self.enables += 1;
        }
        let fail_enable = self.fail_enable_from.is_some_and(|n| self.enables >= n);
        if (enabled && fail_enable) || (!enabled && self.fail_disable) {
            return Err(format!("set_allow_charging {enabled} rejected").into());
        }
        Ok(())
    }
}

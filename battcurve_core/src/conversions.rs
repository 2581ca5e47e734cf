//! `From` implementations bridging `battcurve_config` types to `battcurve_core` types.

use std::time::Duration;

use crate::config::CycleCfg;
use crate::error::CurveError;
use crate::sample::{DischargeLog, VoltageSample};

// ── CycleCfg ─────────────────────────────────────────────────────────────────

fn nonzero_ms(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

impl From<&battcurve_config::Cycle> for CycleCfg {
    fn from(c: &battcurve_config::Cycle) -> Self {
        Self {
            charge_until_v: c.charge_until_v,
            discharge_until_v: c.discharge_until_v,
            poll_interval: Duration::from_millis(c.poll_interval_ms),
            max_charge: nonzero_ms(c.max_charge_ms),
            max_discharge: nonzero_ms(c.max_discharge_ms),
        }
    }
}

// ── DischargeLog ─────────────────────────────────────────────────────────────

impl From<&VoltageSample> for battcurve_config::DischargeRow {
    fn from(s: &VoltageSample) -> Self {
        Self {
            elapsed_s: s.elapsed.as_secs_f64(),
            voltage: s.voltage,
        }
    }
}

impl TryFrom<&[battcurve_config::DischargeRow]> for DischargeLog {
    type Error = CurveError;

    fn try_from(rows: &[battcurve_config::DischargeRow]) -> Result<Self, Self::Error> {
        let mut log = DischargeLog::new();
        for (idx, row) in rows.iter().enumerate() {
            let elapsed = Duration::try_from_secs_f64(row.elapsed_s)
                .map_err(|e| CurveError::State(format!("row {}: {e}", idx + 2)))?;
            log.push(VoltageSample::new(elapsed, row.voltage))?;
        }
        Ok(log)
    }
}

impl DischargeLog {
    /// Rows for the discharge CSV.
    pub fn to_rows(&self) -> Vec<battcurve_config::DischargeRow> {
        self.iter().map(Into::into).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battcurve_config::DischargeRow;

    #[test]
    fn zero_watchdogs_mean_disabled() {
        let cfg = CycleCfg::from(&battcurve_config::Cycle::default());
        assert_eq!(cfg, CycleCfg::default());
    }

    #[test]
    fn rows_map_to_log_and_back() {
        let rows = [
            DischargeRow { elapsed_s: 0.0, voltage: 4.19 },
            DischargeRow { elapsed_s: 5.5, voltage: 4.1 },
        ];
        let log = DischargeLog::try_from(&rows[..]).unwrap();
        assert_eq!(log.samples()[1].elapsed, Duration::from_millis(5500));
        assert_eq!(log.to_rows(), rows);
    }

    #[test]
    fn negative_elapsed_is_rejected() {
        let rows = [DischargeRow { elapsed_s: -1.0, voltage: 4.19 }];
        assert!(matches!(
            DischargeLog::try_from(&rows[..]),
            Err(CurveError::State(_))
        ));
    }
}

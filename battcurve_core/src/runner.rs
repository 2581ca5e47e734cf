//! One-shot orchestration: cycle, raw-log dump, curve, persistence.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use battcurve_traits::{ChargeControl, Clock};

use crate::config::CycleCfg;
use crate::curve::{check_num_points, generate};
use crate::cycle::CycleController;
use crate::error::{CurveError, Result};
use crate::sample::DischargeLog;
use crate::table::SocTable;
use crate::writer::TableWriter;

/// Everything a run needs besides the battery, clock and writer.
#[derive(Debug, Clone)]
pub struct RunParams {
    pub cycle: CycleCfg,
    pub num_points: usize,
    pub output: PathBuf,
    pub samples_csv: Option<PathBuf>,
    pub cancel: Option<Arc<AtomicBool>>,
}

/// Result of a completed cycle. `written` is kept apart from the cycle
/// outcome: a failed write does not make the cycle fail.
#[derive(Debug)]
pub struct RunOutcome {
    pub table: SocTable,
    pub log: DischargeLog,
    pub written: std::result::Result<PathBuf, CurveError>,
}

/// Run one cycle to completion and persist its table.
///
/// Errors from the cycle (device, watchdog, interrupt) and from curve
/// generation are returned as `CurveError` inside the report; charging has
/// already been re-enabled by then. An invalid cycle config comes back as
/// `BuildError` before the battery is touched.
pub fn run<B, C, W>(battery: B, clock: C, writer: &W, params: RunParams) -> Result<RunOutcome>
where
    B: ChargeControl,
    C: Clock,
    W: TableWriter + ?Sized,
{
    let RunParams {
        cycle,
        num_points,
        output,
        samples_csv,
        cancel,
    } = params;

    // Before the battery is touched.
    check_num_points(num_points)?;

    let mut builder = CycleController::builder()
        .with_battery(battery)
        .with_clock(clock)
        .with_config(cycle);
    if let Some(flag) = cancel {
        builder = builder.with_cancel(flag);
    }
    let mut controller = builder.build()?;

    tracing::info!(output = %output.display(), num_points, "cycle start");
    let log = controller.run()?;

    if let Some(path) = samples_csv.as_deref() {
        dump_samples(&log, path);
    }

    let table = generate(&log, num_points)?;
    if !table.is_monotonic() {
        tracing::warn!("generated curve is not monotonic; the daemon may reject it");
    }

    let written = writer.write(&table, &output).map(|()| output.clone());
    if let Err(e) = &written {
        tracing::error!(error = %e, "curve not persisted");
    }
    Ok(RunOutcome {
        table,
        log,
        written,
    })
}

fn dump_samples(log: &DischargeLog, path: &Path) {
    match battcurve_config::write_discharge_csv(path, &log.to_rows()) {
        Ok(()) => tracing::info!(path = %path.display(), rows = log.len(), "discharge log written"),
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "discharge log not written"),
    }
}

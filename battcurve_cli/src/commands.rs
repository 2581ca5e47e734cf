//! Subcommand implementations: config mapping, battery assembly, output.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use battcurve_config::Config;
use battcurve_core::control_error::map_control_error;
use battcurve_core::runner::{self, RunOutcome, RunParams};
use battcurve_core::{CycleCfg, DischargeLog, JsonFileWriter, SocTable, TableWriter, generate};
use battcurve_protocol::{ClientCfg, ProtocolClient, SimulatedBattery};
use battcurve_traits::{ManualClock, MonotonicClock};
use eyre::{Result, WrapErr};
use serde_json::json;

use crate::cli::json_mode;

/// Daemon section of the config as client parameters.
pub fn client_cfg(d: &battcurve_config::Daemon) -> ClientCfg {
    ClientCfg {
        host: d.host.clone(),
        port: d.port,
        read_timeout: Duration::from_millis(d.read_timeout_ms),
        event_prefixes: d.event_prefixes.clone(),
    }
}

fn curve_json(table: &SocTable) -> serde_json::Value {
    table
        .points()
        .iter()
        .map(|p| json!([p.voltage(), p.soc()]))
        .collect()
}

fn warn_if_not_monotonic(table: &SocTable) {
    if !table.is_monotonic() && !json_mode() {
        eprintln!("warning: SOC rises somewhere as voltage falls; the daemon may reject this curve");
    }
}

pub fn run_cycle(
    cfg: &Config,
    sim: bool,
    output: Option<PathBuf>,
    samples_csv: Option<PathBuf>,
    num_points: Option<usize>,
) -> Result<()> {
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let flag = cancel.clone();
        ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
            .wrap_err("install Ctrl-C handler")?;
    }

    let params = RunParams {
        cycle: CycleCfg::from(&cfg.cycle),
        num_points: num_points.unwrap_or(cfg.curve.num_points),
        output: output.unwrap_or_else(|| PathBuf::from(&cfg.output.path)),
        samples_csv: samples_csv.or_else(|| cfg.output.samples_csv.as_ref().map(PathBuf::from)),
        cancel: Some(cancel),
    };
    let writer = JsonFileWriter::new();

    let outcome = if sim {
        tracing::info!("using simulated battery on a virtual clock");
        runner::run(SimulatedBattery::default(), ManualClock::new(), &writer, params)?
    } else {
        let client = ProtocolClient::new(client_cfg(&cfg.daemon));
        tracing::info!(host = %client.cfg().host, port = client.cfg().port, "using battery daemon");
        runner::run(client, MonotonicClock::new(), &writer, params)?
    };

    report_run(&outcome);
    match outcome.written {
        Ok(_) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn report_run(outcome: &RunOutcome) {
    let RunOutcome {
        table,
        log,
        written,
    } = outcome;
    warn_if_not_monotonic(table);
    if json_mode() {
        let line = json!({
            "status": "complete",
            "samples": log.len(),
            "duration_s": log.last().map_or(0.0, |s| s.elapsed.as_secs_f64()),
            "output": written.as_ref().ok().map(|p| p.display().to_string()),
            "battery_curve": curve_json(table),
        });
        println!("{line}");
        return;
    }
    println!(
        "Cycle complete: {} samples over {:.0} s, {} curve points",
        log.len(),
        log.last().map_or(0.0, |s| s.elapsed.as_secs_f64()),
        table.len()
    );
    if let Ok(path) = written {
        println!("Curve written to {}", path.display());
    }
}

pub fn voltage(cfg: &Config) -> Result<()> {
    let client = ProtocolClient::new(client_cfg(&cfg.daemon));
    let v = client
        .get_battery_voltage()
        .map_err(|e| map_control_error(&e))?;
    if json_mode() {
        println!("{}", json!({ "battery_v": v }));
    } else {
        println!("battery_v: {v:.3}");
    }
    Ok(())
}

pub fn generate_offline(
    cfg: &Config,
    samples: &Path,
    output: Option<PathBuf>,
    num_points: Option<usize>,
) -> Result<()> {
    let rows = battcurve_config::load_discharge_csv(samples)?;
    let log = DischargeLog::try_from(rows.as_slice())?;
    let num_points = num_points.unwrap_or(cfg.curve.num_points);
    let table = generate(&log, num_points)?;
    let output = output.unwrap_or_else(|| PathBuf::from(&cfg.output.path));
    JsonFileWriter::new().write(&table, &output)?;

    warn_if_not_monotonic(&table);
    if json_mode() {
        println!(
            "{}",
            json!({
                "status": "generated",
                "samples": log.len(),
                "output": output.display().to_string(),
                "battery_curve": curve_json(&table),
            })
        );
    } else {
        println!(
            "Generated {} curve points from {} samples into {}",
            table.len(),
            log.len(),
            output.display()
        );
    }
    Ok(())
}

pub fn inspect(curve: &Path, voltage: Option<f64>) -> Result<()> {
    let text = std::fs::read_to_string(curve)
        .wrap_err_with(|| format!("read curve {}", curve.display()))?;
    let table = SocTable::from_json(&text)?;
    let level = voltage.map(|v| (v, table.level_at(v)));

    if json_mode() {
        let mut obj = json!({
            "valid": true,
            "points": table.len(),
            "monotonic": table.is_monotonic(),
            "battery_curve": curve_json(&table),
        });
        if let Some((v, l)) = level {
            obj["voltage"] = json!(v);
            obj["level"] = json!(l);
        }
        println!("{obj}");
        return Ok(());
    }

    println!("{}: {} points, valid", curve.display(), table.len());
    for p in table.points() {
        println!("  {:>5.2} V  {:>3}%", p.voltage(), p.soc());
    }
    warn_if_not_monotonic(&table);
    if let Some((v, l)) = level {
        println!("{v:.3} V -> {l:.1}%");
    }
    Ok(())
}

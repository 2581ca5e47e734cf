#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and discharge-log CSV handling for the battery curve tool.
//!
//! - `Config` and its sections are deserialized from TOML and validated.
//!   Every section is optional; missing keys fall back to the defaults the
//!   daemon ships with.
//! - The discharge-log CSV loader enforces headers and chronological order so
//!   a recorded run can be turned into a curve later.
use serde::{Deserialize, Serialize};

/// Discharge-log CSV schema.
///
/// Expected headers:
/// elapsed_s,voltage
///
/// Example:
/// elapsed_s,voltage
/// 0.0,4.19
/// 5.0,4.18
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct DischargeRow {
    pub elapsed_s: f64,
    pub voltage: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Daemon {
    pub host: String,
    pub port: u16,
    /// Upper bound for one request/response exchange (ms).
    pub read_timeout_ms: u64,
    /// Response lines starting with these are button notifications.
    pub event_prefixes: Vec<String>,
}

impl Default for Daemon {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8423,
            read_timeout_ms: 2000,
            event_prefixes: vec!["single".into(), "double".into(), "long".into()],
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Cycle {
    /// Stop charging once the battery reaches this voltage.
    pub charge_until_v: f64,
    /// Stop logging once the battery drops to this voltage.
    pub discharge_until_v: f64,
    pub poll_interval_ms: u64,
    // Abort a phase that runs longer than this (0 disables)
    pub max_charge_ms: u64,
    pub max_discharge_ms: u64,
}

impl Default for Cycle {
    fn default() -> Self {
        Self {
            charge_until_v: 4.19,
            discharge_until_v: 3.10,
            poll_interval_ms: 5000,
            max_charge_ms: 0,
            max_discharge_ms: 0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Curve {
    /// Interior points of the lookup table (100% and 0% come on top).
    pub num_points: usize,
}

impl Default for Curve {
    fn default() -> Self {
        Self { num_points: 15 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Output {
    pub path: String,
    /// Optional CSV dump of the raw discharge log.
    pub samples_csv: Option<String>,
}

impl Default for Output {
    fn default() -> Self {
        Self {
            path: "battery_curve.json".to_string(),
            samples_csv: None,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub daemon: Daemon,
    pub cycle: Cycle,
    pub curve: Curve,
    pub output: Output,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Daemon
        if self.daemon.host.trim().is_empty() {
            eyre::bail!("daemon.host must not be empty");
        }
        if self.daemon.port == 0 {
            eyre::bail!("daemon.port must be > 0");
        }
        if self.daemon.read_timeout_ms == 0 {
            eyre::bail!("daemon.read_timeout_ms must be >= 1");
        }
        if self.daemon.event_prefixes.iter().any(|p| p.trim().is_empty()) {
            eyre::bail!("daemon.event_prefixes must not contain empty entries");
        }

        // Cycle
        let upper = self.cycle.charge_until_v;
        let lower = self.cycle.discharge_until_v;
        if !upper.is_finite() || upper <= 0.0 {
            eyre::bail!("cycle.charge_until_v must be a positive voltage");
        }
        if !lower.is_finite() || lower <= 0.0 {
            eyre::bail!("cycle.discharge_until_v must be a positive voltage");
        }
        if upper <= lower {
            eyre::bail!("cycle.charge_until_v must be greater than cycle.discharge_until_v");
        }
        if self.cycle.poll_interval_ms == 0 {
            eyre::bail!("cycle.poll_interval_ms must be >= 1");
        }
        if self.cycle.poll_interval_ms > 60 * 60 * 1000 {
            eyre::bail!("cycle.poll_interval_ms is unreasonably large (>1h)");
        }

        // Curve
        if self.curve.num_points > 1000 {
            eyre::bail!("curve.num_points must be <= 1000");
        }

        // Output
        if self.output.path.trim().is_empty() {
            eyre::bail!("output.path must not be empty");
        }

        // Logging
        if let Some(rotation) = self.logging.rotation.as_deref()
            && !matches!(rotation, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never, daily, hourly");
        }

        Ok(())
    }
}

/// Check that rows form a usable log: finite, non-negative, strictly increasing elapsed.
/// Row numbers in messages are 1-based data rows plus the header line.
pub fn check_rows(rows: &[DischargeRow]) -> eyre::Result<()> {
    let mut prev: Option<f64> = None;
    for (idx, row) in rows.iter().enumerate() {
        let line = idx + 2;
        if !row.elapsed_s.is_finite() || row.elapsed_s < 0.0 {
            eyre::bail!("row {line}: elapsed_s must be a finite value >= 0");
        }
        if !row.voltage.is_finite() {
            eyre::bail!("row {line}: voltage must be finite");
        }
        if let Some(p) = prev
            && row.elapsed_s <= p
        {
            eyre::bail!("row {line}: elapsed_s must be strictly increasing ({} after {p})", row.elapsed_s);
        }
        prev = Some(row.elapsed_s);
    }
    Ok(())
}

pub fn load_discharge_csv(path: &std::path::Path) -> eyre::Result<Vec<DischargeRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open discharge CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["elapsed_s", "voltage"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "discharge CSV must have headers 'elapsed_s,voltage', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<DischargeRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }

    check_rows(&rows)?;
    Ok(rows)
}

pub fn write_discharge_csv(path: &std::path::Path, rows: &[DischargeRow]) -> eyre::Result<()> {
    // Header written by hand so an empty log still round-trips through the loader.
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| eyre::eyre!("create discharge CSV {:?}: {}", path, e))?;
    wtr.write_record(["elapsed_s", "voltage"])?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

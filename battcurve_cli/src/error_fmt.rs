//! Human-readable error descriptions and structured JSON error formatting.

use battcurve_core::{BuildError, CurveError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingBattery => {
                "What happened: No battery controller was provided to the cycle.\nLikely causes: The daemon client or simulator was not wired into the builder.\nHow to fix: Pass one via with_battery(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid cycle configuration ({msg}).\nLikely causes: Thresholds swapped or a zero poll interval in the TOML.\nHow to fix: Edit the [cycle] section, then rerun."
            ),
        };
    }

    if let Some(ce) = err.downcast_ref::<CurveError>() {
        return match ce {
            CurveError::Connection(msg) => format!(
                "What happened: Could not reach the battery daemon ({msg}).\nLikely causes: Daemon not running, or wrong [daemon] host/port.\nHow to fix: Start the daemon and check it listens on the configured address (e.g. `nc -z 127.0.0.1 8423`). Charging was re-enabled if the daemon came back."
            ),
            CurveError::Protocol(msg) => format!(
                "What happened: The daemon answered with something unexpected ({msg}).\nLikely causes: Daemon version mismatch, or a notification line not listed in daemon.event_prefixes.\nHow to fix: Re-run with --log-level=trace to see raw responses. Charging was re-enabled on the way out."
            ),
            CurveError::InsufficientData => "What happened: The discharge log has no usable samples.\nLikely causes: Every reading was zero or negative, or the log is empty.\nHow to fix: Check the daemon reports battery_v while discharging and record a new cycle.".to_string(),
            CurveError::Persistence(msg) => format!(
                "What happened: The curve could not be written ({msg}).\nLikely causes: Missing directory or no write permission.\nHow to fix: Point --output (or output.path) at a writable location. The cycle itself completed."
            ),
            CurveError::Interrupted => "What happened: The run was interrupted.\nLikely causes: Ctrl-C or a termination signal.\nHow to fix: Start a new run; charging was re-enabled before exiting.".to_string(),
            CurveError::PhaseTimeout { phase, limit_ms } => format!(
                "What happened: The {phase} phase ran longer than {limit_ms} ms.\nLikely causes: Charger not connected, thresholds out of reach, or a limit set too low.\nHow to fix: Check the battery and thresholds, or raise cycle.max_{}_ms (0 disables).",
                if *phase == "charging" { "charge" } else { "discharge" }
            ),
            CurveError::InvalidTable(msg) => format!(
                "What happened: The curve file is not a valid table ({msg}).\nLikely causes: Hand edits broke ordering, duplicate voltages, or endpoints other than 100/0.\nHow to fix: Regenerate it with `battcurve generate` or fix the listed entry."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from config or CSV loading
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("discharge csv must have headers") {
        return "Invalid headers in discharge CSV. Expected 'elapsed_s,voltage'.".to_string();
    }

    if lower.contains("parse config") || lower.contains("invalid configuration") {
        let cause = err.root_cause().to_string();
        return format!(
            "What happened: Configuration is invalid ({cause}).\nLikely causes: Typo in a key, wrong value type, or out-of-range values.\nHow to fix: Edit the TOML config and try again."
        );
    }

    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes per failure class; anything unclassified is 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<CurveError>() {
        Some(CurveError::Protocol(_)) => 2,
        Some(CurveError::Connection(_)) => 3,
        Some(CurveError::InsufficientData) => 4,
        Some(CurveError::Persistence(_)) => 5,
        Some(CurveError::PhaseTimeout { .. }) => 6,
        Some(CurveError::InvalidTable(_)) => 7,
        Some(CurveError::Interrupted) => 130,
        _ => 1,
    }
}

pub fn reason_name(err: &eyre::Report) -> &'static str {
    match err.downcast_ref::<CurveError>() {
        Some(CurveError::Protocol(_)) => "Protocol",
        Some(CurveError::Connection(_)) => "Connection",
        Some(CurveError::InsufficientData) => "InsufficientData",
        Some(CurveError::Persistence(_)) => "Persistence",
        Some(CurveError::PhaseTimeout { .. }) => "PhaseTimeout",
        Some(CurveError::InvalidTable(_)) => "InvalidTable",
        Some(CurveError::Interrupted) => "Interrupted",
        Some(CurveError::Config(_)) => "Config",
        Some(CurveError::State(_)) => "State",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let message = humanize(err);
    let obj = match err.downcast_ref::<CurveError>() {
        Some(CurveError::PhaseTimeout { phase, limit_ms }) => json!({
            "reason": reason_name(err),
            "details": { "phase": phase, "limit_ms": limit_ms },
            "message": message,
        }),
        _ => json!({ "reason": reason_name(err), "message": message }),
    };
    obj.to_string()
}

use std::path::PathBuf;
use std::time::Duration;

use battcurve_core::mocks::ScriptedBattery;
use battcurve_core::runner::run;
use battcurve_core::{BuildError, CurveError, CycleCfg, JsonFileWriter, MAX_NUM_POINTS, RunParams, SocTable};
use battcurve_traits::ManualClock;

fn params(output: PathBuf, samples_csv: Option<PathBuf>) -> RunParams {
    RunParams {
        cycle: CycleCfg {
            charge_until_v: 4.19,
            discharge_until_v: 3.10,
            poll_interval: Duration::from_secs(10),
            max_charge: None,
            max_discharge: None,
        },
        num_points: 2,
        output,
        samples_csv,
        cancel: None,
    }
}

fn battery() -> ScriptedBattery {
    ScriptedBattery::new([4.19, 4.19, 3.8, 3.5, 3.1])
}

#[test]
fn writes_curve_and_discharge_log() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("battery_curve.json");
    let csv = dir.path().join("discharge.csv");

    let outcome = run(
        battery(),
        ManualClock::new(),
        &JsonFileWriter::new(),
        params(out.clone(), Some(csv.clone())),
    )
    .unwrap();

    assert_eq!(outcome.written.as_ref().unwrap(), &out);
    assert_eq!(outcome.log.len(), 4);
    let persisted = SocTable::from_json(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(persisted, outcome.table);
    assert_eq!(
        std::fs::read_to_string(&csv).unwrap(),
        "elapsed_s,voltage\n0.0,4.19\n10.0,3.8\n20.0,3.5\n30.0,3.1\n"
    );
}

#[test]
fn write_failure_does_not_fail_the_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("missing").join("battery_curve.json");
    let csv = dir.path().join("missing").join("discharge.csv");

    let outcome = run(
        battery(),
        ManualClock::new(),
        &JsonFileWriter::new(),
        params(out, Some(csv)),
    )
    .unwrap();

    assert!(matches!(outcome.written, Err(CurveError::Persistence(_))));
    assert_eq!(outcome.table.len(), 4);
}

#[test]
fn cycle_errors_surface_as_curve_errors() {
    let dir = tempfile::tempdir().unwrap();
    let bat = ScriptedBattery::with_script([Err("connection refused")]);
    let calls = bat.charging_calls();

    let report = run(
        bat,
        ManualClock::new(),
        &JsonFileWriter::new(),
        params(dir.path().join("c.json"), None),
    )
    .unwrap_err();

    assert!(matches!(
        report.downcast_ref::<CurveError>(),
        Some(CurveError::Connection(_))
    ));
    assert_eq!(*calls.lock().unwrap(), vec![true, true]);
    assert!(!dir.path().join("c.json").exists());
}

#[test]
fn oversized_point_count_is_rejected_before_charging() {
    let dir = tempfile::tempdir().unwrap();
    let bat = battery();
    let calls = bat.charging_calls();
    let mut p = params(dir.path().join("c.json"), None);
    p.num_points = usize::MAX;

    let report = run(bat, ManualClock::new(), &JsonFileWriter::new(), p).unwrap_err();

    assert!(matches!(
        report.downcast_ref::<CurveError>(),
        Some(CurveError::Config(m)) if m.contains(&MAX_NUM_POINTS.to_string())
    ));
    assert!(calls.lock().unwrap().is_empty());
}

#[test]
fn invalid_cycle_config_surfaces_as_build_error() {
    let dir = tempfile::tempdir().unwrap();
    let bat = battery();
    let calls = bat.charging_calls();
    let mut p = params(dir.path().join("c.json"), None);
    p.cycle.charge_until_v = 3.0;

    let report = run(bat, ManualClock::new(), &JsonFileWriter::new(), p).unwrap_err();

    assert!(matches!(
        report.downcast_ref::<BuildError>(),
        Some(BuildError::InvalidConfig(_))
    ));
    assert!(calls.lock().unwrap().is_empty());
}

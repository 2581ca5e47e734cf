use std::time::Duration;

use battcurve_core::{CurveError, DischargeLog, VoltageSample, generate};
use rstest::rstest;

fn log(rows: &[(u64, f64)]) -> DischargeLog {
    let samples: Vec<_> = rows
        .iter()
        .map(|&(t, v)| VoltageSample::new(Duration::from_secs(t), v))
        .collect();
    DischargeLog::try_from(samples).unwrap()
}

fn pairs(rows: &[(u64, f64)], n: usize) -> Vec<(i32, u8)> {
    generate(&log(rows), n)
        .unwrap()
        .points()
        .iter()
        .map(|p| (p.centivolts(), p.soc()))
        .collect()
}

const FOUR_SAMPLES: &[(u64, f64)] = &[(0, 4.19), (10, 3.8), (20, 3.5), (30, 3.1)];

#[test]
fn four_sample_discharge_with_two_points() {
    assert_eq!(
        pairs(FOUR_SAMPLES, 2),
        vec![(419, 100), (380, 67), (350, 33), (310, 0)]
    );
}

#[test]
fn four_sample_document_matches_daemon_format() {
    let table = generate(&log(FOUR_SAMPLES), 2).unwrap();
    assert_eq!(
        table.to_json().unwrap(),
        r#"{"battery_curve":[[4.19,100],[3.8,67],[3.5,33],[3.1,0]]}"#
    );
}

#[test]
fn more_points_than_samples_collapses_duplicates() {
    assert_eq!(
        pairs(FOUR_SAMPLES, 15),
        vec![(419, 100), (380, 67), (350, 33), (310, 0)]
    );
}

#[test]
fn non_positive_voltages_are_dropped() {
    let rows = [(0, 4.0), (10, -1.0), (20, 3.6), (30, 0.0), (40, 3.2)];
    assert_eq!(pairs(&rows, 3), vec![(400, 100), (360, 50), (320, 0)]);
}

#[rstest]
#[case::empty(&[])]
#[case::all_zero(&[(0, 0.0), (5, 0.0)])]
#[case::all_negative(&[(0, -3.0)])]
fn nothing_usable_is_insufficient_data(#[case] rows: &[(u64, f64)]) {
    assert_eq!(generate(&log(rows), 15).unwrap_err(), CurveError::InsufficientData);
}

#[test]
fn single_sample_yields_single_full_point() {
    assert_eq!(pairs(&[(0, 3.9)], 5), vec![(390, 100)]);
}

#[test]
fn flat_discharge_collapses_to_one_point() {
    assert_eq!(pairs(&[(0, 4.1), (10, 4.1), (20, 4.1)], 3), vec![(410, 100)]);
}

#[test]
fn equidistant_candidates_resolve_to_earliest_sample() {
    // Estimates 100, 75, 25, 0; the single target 50 is 25 away from both
    // 4.0 V and 3.8 V.
    let rows = [(0, 4.2), (10, 4.0), (30, 3.8), (40, 3.1)];
    assert_eq!(pairs(&rows, 1), vec![(420, 100), (400, 75), (310, 0)]);
}

#[test]
fn duplicate_voltage_keeps_highest_soc() {
    let rows = [(0, 4.1), (10, 3.9), (20, 3.9), (30, 3.0)];
    assert_eq!(pairs(&rows, 2), vec![(410, 100), (390, 67), (300, 0)]);
}

#[test]
fn zero_points_keeps_only_endpoints() {
    assert_eq!(pairs(FOUR_SAMPLES, 0), vec![(419, 100), (310, 0)]);
}

#[test]
fn voltages_round_to_centivolts() {
    let rows = [(0, 4.1849), (10, 3.7712), (20, 3.0951)];
    assert_eq!(pairs(&rows, 1), vec![(418, 100), (377, 50), (310, 0)]);
}

#[test]
fn rising_voltage_still_gets_forced_endpoints() {
    // Recovery at the end of a discharge: the last sample is not the lowest.
    let rows = [(0, 4.0), (10, 3.5), (20, 3.6)];
    let table = generate(&log(&rows), 1).unwrap();
    assert!(table.validate().is_ok());
    let pts: Vec<_> = table.points().iter().map(|p| (p.centivolts(), p.soc())).collect();
    assert_eq!(pts, vec![(400, 100), (360, 0), (350, 0)]);
    assert!(table.is_monotonic());
}

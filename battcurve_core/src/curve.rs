//! SOC curve generation from a discharge log.
//!
//! Each logged sample gets a linear-in-time SOC estimate: the first sample is
//! 100%, the last is 0%. The table is the two endpoints plus `num_points`
//! samples picked nearest to evenly spaced SOC targets.

use std::collections::BTreeMap;

use crate::error::CurveError;
use crate::fixed_point::{round_soc, volts_to_cv};
use crate::sample::{DischargeLog, VoltageSample};
use crate::table::{SocPoint, SocTable};

/// Default number of intermediate points.
pub const DEFAULT_NUM_POINTS: usize = 15;
/// Upper bound on intermediate points, matching `curve.num_points` validation.
pub const MAX_NUM_POINTS: usize = 1000;

/// Reject a point count `generate` would refuse.
pub fn check_num_points(num_points: usize) -> Result<(), CurveError> {
    if num_points > MAX_NUM_POINTS {
        return Err(CurveError::Config(format!(
            "num_points must be <= {MAX_NUM_POINTS}, got {num_points}"
        )));
    }
    Ok(())
}

/// Build a lookup table from `log`.
///
/// Samples with a non-positive voltage are glitches and ignored. Fails with
/// [`CurveError::InsufficientData`] when nothing usable remains, and with
/// [`CurveError::Config`] when `num_points` exceeds [`MAX_NUM_POINTS`]. Output
/// is a deterministic function of the input.
pub fn generate(log: &DischargeLog, num_points: usize) -> Result<SocTable, CurveError> {
    check_num_points(num_points)?;
    let samples: Vec<&VoltageSample> = log.iter().filter(|s| s.voltage > 0.0).collect();
    let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
        return Err(CurveError::InsufficientData);
    };

    let estimates = linear_estimates(&samples);

    let mut candidates: Vec<(i32, u8)> = Vec::with_capacity(num_points + 2);
    candidates.push((volts_to_cv(first.voltage), 100));
    candidates.push((volts_to_cv(last.voltage), 0));
    for i in 1..=num_points {
        let target = 100.0 - 100.0 * i as f64 / (num_points + 1) as f64;
        let idx = nearest(&estimates, target);
        candidates.push((volts_to_cv(samples[idx].voltage), round_soc(estimates[idx])));
    }

    // One entry per voltage, the highest SOC wins.
    let mut by_cv: BTreeMap<i32, u8> = BTreeMap::new();
    for (cv, soc) in candidates {
        by_cv
            .entry(cv)
            .and_modify(|s| *s = (*s).max(soc))
            .or_insert(soc);
    }

    let mut points: Vec<SocPoint> = by_cv
        .into_iter()
        .rev()
        .map(|(cv, soc)| SocPoint::from_centivolts(cv, soc))
        .collect();
    if let Some(p) = points.last_mut() {
        p.soc = 0;
    }
    if let Some(p) = points.first_mut() {
        p.soc = 100;
    }

    tracing::debug!(
        samples = samples.len(),
        points = points.len(),
        "generated soc table"
    );
    Ok(SocTable::from_sorted(points))
}

/// `100 * (1 - elapsed / total)` per sample; all 100 when total elapsed is zero.
fn linear_estimates(samples: &[&VoltageSample]) -> Vec<f64> {
    let total = samples
        .last()
        .map(|s| s.elapsed.as_secs_f64())
        .unwrap_or(0.0);
    samples
        .iter()
        .map(|s| {
            if total > 0.0 {
                100.0 * (1.0 - s.elapsed.as_secs_f64() / total)
            } else {
                100.0
            }
        })
        .collect()
}

/// Index of the estimate closest to `target`; ties go to the earliest sample.
fn nearest(estimates: &[f64], target: f64) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, e) in estimates.iter().enumerate() {
        let d = (e - target).abs();
        if d < best_dist {
            best = i;
            best_dist = d;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn log(rows: &[(u64, f64)]) -> DischargeLog {
        rows.iter()
            .map(|&(t, v)| VoltageSample::new(Duration::from_secs(t), v))
            .collect::<Vec<_>>()
            .try_into()
            .unwrap()
    }

    #[test]
    fn nearest_prefers_earliest_on_tie() {
        assert_eq!(nearest(&[100.0, 50.0, 0.0], 75.0), 0);
        assert_eq!(nearest(&[100.0, 50.0, 0.0], 25.0), 1);
        assert_eq!(nearest(&[100.0, 50.0, 0.0], 60.0), 1);
    }

    #[test]
    fn zero_duration_log_estimates_full() {
        let l = log(&[(0, 3.9)]);
        let samples: Vec<_> = l.iter().collect();
        assert_eq!(linear_estimates(&samples), vec![100.0]);
    }

    #[test]
    fn estimates_fall_linearly() {
        let l = log(&[(0, 4.1), (10, 3.9), (40, 3.2)]);
        let samples: Vec<_> = l.iter().collect();
        assert_eq!(linear_estimates(&samples), vec![100.0, 75.0, 0.0]);
    }

    #[test]
    fn point_count_is_bounded() {
        let l = log(&[(0, 4.19), (10, 3.1)]);
        assert!(generate(&l, MAX_NUM_POINTS).is_ok());
        for n in [MAX_NUM_POINTS + 1, usize::MAX / 2, usize::MAX] {
            assert!(matches!(generate(&l, n), Err(CurveError::Config(_))));
        }
    }

    #[test]
    fn zero_points_gives_endpoints_only() {
        let t = generate(&log(&[(0, 4.1), (10, 3.9), (20, 3.2)]), 0).unwrap();
        let pts: Vec<_> = t.points().iter().map(|p| (p.centivolts(), p.soc())).collect();
        assert_eq!(pts, vec![(410, 100), (320, 0)]);
    }
}

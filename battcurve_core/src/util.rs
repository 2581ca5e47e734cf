//! Cancellation-aware waiting.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use battcurve_traits::Clock;

/// Longest single sleep while waiting out a poll interval.
pub const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Sleep for `total`, in slices of at most [`SLEEP_SLICE`], stopping early when
/// `cancel` is raised. Returns `false` if the wait was cut short.
pub fn sleep_cancellable<C: Clock>(clock: &C, total: Duration, cancel: Option<&AtomicBool>) -> bool {
    let deadline = clock.now() + total;
    loop {
        if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
            return false;
        }
        let remaining = deadline.saturating_duration_since(clock.now());
        if remaining.is_zero() {
            return true;
        }
        clock.sleep(remaining.min(SLEEP_SLICE));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battcurve_traits::ManualClock;

    #[test]
    fn waits_full_duration_without_cancel() {
        let clock = ManualClock::new();
        assert!(sleep_cancellable(&clock, Duration::from_secs(5), None));
        assert_eq!(clock.elapsed(), Duration::from_secs(5));
    }

    #[test]
    fn raised_flag_stops_before_sleeping() {
        let clock = ManualClock::new();
        let flag = AtomicBool::new(true);
        assert!(!sleep_cancellable(&clock, Duration::from_secs(5), Some(&flag)));
        assert_eq!(clock.elapsed(), Duration::ZERO);
    }
}

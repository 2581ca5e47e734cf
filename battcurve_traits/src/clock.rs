use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Time source for the poll loop.
///
/// The cycle only ever asks two things of time: where it is now, and to wait
/// out the poll interval. Swapping the clock lets a multi-hour discharge run
/// in microseconds under test.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);

    /// Whole milliseconds from `epoch` to now; 0 if `epoch` is in the future.
    fn ms_since(&self, epoch: Instant) -> u64 {
        u64::try_from(self.now().saturating_duration_since(epoch).as_millis()).unwrap_or(u64::MAX)
    }
}

/// Wall-clock time via `Instant`; `sleep` blocks the thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, d: Duration) {
        if !d.is_zero() {
            std::thread::sleep(d);
        }
    }
}

/// Virtual clock: `sleep` moves time forward instantly.
///
/// Elapsed values are exact multiples of whatever was slept, so a 5 s poll
/// interval yields samples at 0 s, 5 s, 10 s and so on. Clones share one
/// timeline.
#[derive(Debug, Clone)]
pub struct ManualClock {
    start: Instant,
    nanos: Arc<AtomicU64>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            nanos: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Move the timeline forward by `d` (saturating).
    pub fn advance(&self, d: Duration) {
        let step = u64::try_from(d.as_nanos()).unwrap_or(u64::MAX);
        let _ = self
            .nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                Some(n.saturating_add(step))
            });
    }

    /// Virtual time since construction.
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }

    fn sleep(&self, d: Duration) {
        self.advance(d);
    }
}

//! Time abstraction traits and drift-free software timers.
//!
//! The controller never sleeps. Every wait is expressed as "has enough time
//! elapsed since reference point X", measured against a monotonically
//! increasing millisecond counter supplied through [`TimeSource`].

/// Trait for abstracting the monotonic millisecond counter.
pub trait TimeSource<I: TimeInstant> {
    /// Returns the current time instant.
    fn now(&self) -> I;
}

/// Trait abstraction for duration types.
pub trait TimeDuration: Copy + PartialEq {
    /// Zero duration constant.
    const ZERO: Self;

    /// Converts duration to milliseconds.
    fn as_millis(&self) -> u64;

    /// Creates duration from milliseconds.
    fn from_millis(millis: u64) -> Self;

    /// Saturating subtraction (returns ZERO on underflow).
    fn saturating_sub(self, other: Self) -> Self;
}

/// Trait abstraction for instant types.
///
/// Hardware counters usually wrap; implementations should use wrapping
/// arithmetic in `duration_since` so that a reference taken just before the
/// wrap still measures correctly.
pub trait TimeInstant: Copy {
    /// Duration type for this instant.
    type Duration: TimeDuration;

    /// Calculates duration since an earlier instant.
    fn duration_since(&self, earlier: Self) -> Self::Duration;

    /// Adds duration to instant, returns None on overflow.
    fn checked_add(self, duration: Self::Duration) -> Option<Self>;

    /// Subtracts duration from instant, returns None on underflow.
    fn checked_sub(self, duration: Self::Duration) -> Option<Self>;
}

/// A periodic software timer: one last-trigger instant plus a fixed interval.
///
/// The timer fires when the time elapsed since the reference is at least the
/// interval. Firing advances the reference by exactly the interval rather than
/// to the current time, so late polls do not accumulate drift.
///
/// The length of the *next* period can be stretched or shortened once with
/// [`IntervalTimer::adjust_next_period`]. This is how the clock applies its
/// hourly drift correction and how it aligns the first minute with the RTC's
/// seconds phase, without ever moving the reference into the future.
#[derive(Debug, Clone, Copy)]
pub struct IntervalTimer<I: TimeInstant> {
    reference: I,
    interval_ms: u32,
    next_offset_ms: i64,
}

impl<I: TimeInstant> IntervalTimer<I> {
    /// Creates a timer whose first period starts at `now`.
    pub fn new(now: I, interval_ms: u32) -> Self {
        Self {
            reference: now,
            interval_ms,
            next_offset_ms: 0,
        }
    }

    /// Returns true once per elapsed period.
    ///
    /// If several periods elapsed between polls, each subsequent poll fires
    /// again until the timer has caught up.
    pub fn poll(&mut self, now: I) -> bool {
        let period = self.current_period_ms();
        if self.elapsed_ms(now) < period {
            return false;
        }

        // A wrapping counter never overflows here; fall back to resync otherwise.
        self.reference = self
            .reference
            .checked_add(I::Duration::from_millis(period))
            .unwrap_or(now);
        self.next_offset_ms = 0;
        true
    }

    /// Restarts the current period at `now`, discarding any pending adjustment.
    pub fn reset(&mut self, now: I) {
        self.reference = now;
        self.next_offset_ms = 0;
    }

    /// Lengthens (positive) or shortens (negative) the next period only.
    ///
    /// Adjustments accumulate until the timer next fires. The period never
    /// shrinks below zero.
    pub fn adjust_next_period(&mut self, offset_ms: i64) {
        self.next_offset_ms = self.next_offset_ms.saturating_add(offset_ms);
    }

    /// Milliseconds elapsed since the reference.
    pub fn elapsed_ms(&self, now: I) -> u64 {
        now.duration_since(self.reference).as_millis()
    }

    fn current_period_ms(&self) -> u64 {
        let period = i64::from(self.interval_ms).saturating_add(self.next_offset_ms);
        u64::try_from(period).unwrap_or(0)
    }
}

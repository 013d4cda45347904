//! Core value types owned by the controller.

/// Four decimal digits, most significant first.
pub type Digits = [u8; 4];

/// Wall-clock time with minute resolution.
///
/// Always a valid time of day: hour in 0..=23, minute in 0..=59. Every
/// mutation wraps instead of overflowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    /// Midnight.
    pub const MIDNIGHT: Self = Self { hour: 0, minute: 0 };

    /// Creates a clock time, or `None` if either field is out of range.
    pub const fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self { hour, minute })
        } else {
            None
        }
    }

    /// Hour of day, 0..=23.
    #[inline]
    pub const fn hour(&self) -> u8 {
        self.hour
    }

    /// Minute of hour, 0..=59.
    #[inline]
    pub const fn minute(&self) -> u8 {
        self.minute
    }

    /// Advances by one minute, carrying into the hour.
    ///
    /// Returns true when the minute wrapped to 0 (top of the hour).
    pub fn advance_minute(&mut self) -> bool {
        if self.minute == 59 {
            self.minute = 0;
            self.hour = (self.hour + 1) % 24;
            true
        } else {
            self.minute += 1;
            false
        }
    }

    /// Adds `delta` hours, wrapping within 0..=23.
    pub fn adjust_hour(&mut self, delta: i32) {
        self.hour = wrap(self.hour, delta, 24);
    }

    /// Adds `delta` minutes, wrapping within 0..=59 without touching the hour.
    pub fn adjust_minute(&mut self, delta: i32) {
        self.minute = wrap(self.minute, delta, 60);
    }

    /// `HHMM` digits.
    pub fn digits(&self) -> Digits {
        [self.hour / 10, self.hour % 10, self.minute / 10, self.minute % 10]
    }
}

fn wrap(value: u8, delta: i32, modulus: i32) -> u8 {
    // rem_euclid keeps the result in 0..modulus for negative deltas
    (i32::from(value) + delta).rem_euclid(modulus) as u8
}

/// How an encoder step is applied to the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Adjustment {
    /// Editing a stopped timer: land on the next grid line of the step size.
    Snap,
    /// Adjusting a running countdown: apply the full step.
    Live,
}

/// Countdown duration in whole seconds, always within 0..=5999 (under 100 minutes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerValue(u16);

impl TimerValue {
    /// Zero seconds.
    pub const ZERO: Self = Self(0);

    /// Largest representable duration, 99:59.
    pub const MAX_SECONDS: u16 = 5999;

    /// Creates a timer value, or `None` above [`TimerValue::MAX_SECONDS`].
    pub const fn from_seconds(seconds: u16) -> Option<Self> {
        if seconds <= Self::MAX_SECONDS {
            Some(Self(seconds))
        } else {
            None
        }
    }

    /// Total seconds.
    #[inline]
    pub fn seconds(&self) -> u16 {
        self.0
    }

    /// True when no time remains.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Encoder step size for the current value.
    ///
    /// Coarse steps for long durations, fine steps near zero.
    pub fn step_size(&self) -> u16 {
        match self.0 {
            0 => 10,
            s if s > 360 => 60,
            s if s > 180 => 30,
            s if s > 60 => 15,
            _ => 5,
        }
    }

    /// Applies one increasing encoder step.
    ///
    /// Returns false and leaves the value unchanged when the result would
    /// exceed [`TimerValue::MAX_SECONDS`].
    pub fn increase(&mut self, adjustment: Adjustment) -> bool {
        let step = self.step_size();
        let next = match adjustment {
            Adjustment::Snap => self.0 - self.0 % step + step,
            Adjustment::Live => self.0 + step,
        };

        if next > Self::MAX_SECONDS {
            return false;
        }
        self.0 = next;
        true
    }

    /// Applies one decreasing encoder step.
    ///
    /// A snapping step lands on the grid line below and saturates at zero.
    /// A live step is rejected unless at least one second would remain, so a
    /// running countdown is never emptied by the encoder.
    pub fn decrease(&mut self, adjustment: Adjustment) -> bool {
        let step = self.step_size();
        let next = match adjustment {
            Adjustment::Snap => match self.0 % step {
                0 => self.0.saturating_sub(step),
                partial => self.0 - partial,
            },
            Adjustment::Live if self.0 > step => self.0 - step,
            Adjustment::Live => return false,
        };

        let changed = next != self.0;
        self.0 = next;
        changed
    }

    /// Removes one second.
    ///
    /// Returns true exactly when this call brought the value to zero. At zero
    /// this is a no-op that returns false.
    pub fn count_down(&mut self) -> bool {
        if self.0 == 0 {
            return false;
        }
        self.0 -= 1;
        self.0 == 0
    }

    /// `MMSS` digits.
    pub fn digits(&self) -> Digits {
        let minutes = self.0 / 60;
        let seconds = self.0 % 60;
        [
            (minutes / 10) as u8,
            (minutes % 10) as u8,
            (seconds / 10) as u8,
            (seconds % 10) as u8,
        ]
    }
}

/// The controller's operating mode. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Showing the time of day; the colon blinks at 1 Hz.
    #[default]
    Clock,
    /// Editing the hour; hour digits blink fast.
    SetHour,
    /// Editing the minute; minute digits blink fast.
    SetMinute,
    /// Editing the countdown duration; digits steady.
    SetTimer,
    /// Counting down once per second.
    Countdown,
    /// Countdown expired; buzzer active and display flashing.
    Alarm,
}

impl Mode {
    /// True while the user is editing the wall clock.
    ///
    /// Minute rollover is suspended in these modes.
    pub fn is_setting_clock(&self) -> bool {
        matches!(self, Mode::SetHour | Mode::SetMinute)
    }
}

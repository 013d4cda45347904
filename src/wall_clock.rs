//! RTC-backed time of day.
//!
//! The RTC chip must be present: without it the appliance refuses to start.
//! A present chip that reports garbage is tolerated; the clock then runs from
//! the monotonic counter alone and the status LED blinks to say so.

use crate::types::ClockTime;

/// Date used for every write; only hour and minute carry meaning.
pub const PLACEHOLDER_DATE: (u16, u8, u8) = (2000, 1, 1);

/// A calendar reading as exchanged with the RTC chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RtcDateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl RtcDateTime {
    /// Creates a reading without validating it.
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// The placeholder date at the given time of day, seconds zeroed.
    pub const fn at(time: ClockTime) -> Self {
        let (year, month, day) = PLACEHOLDER_DATE;
        Self::new(year, month, day, time.hour(), time.minute(), 0)
    }

    /// True when every field is in range.
    ///
    /// Chips that lost power often return all-ones registers, which decode
    /// to values like month 165; those readings are rejected here.
    pub fn is_valid(&self) -> bool {
        (1..=12).contains(&self.month)
            && (1..=31).contains(&self.day)
            && self.hour < 24
            && self.minute < 60
            && self.second < 60
    }

    /// The time of day, if the reading is valid.
    pub fn clock_time(&self) -> Option<ClockTime> {
        if self.is_valid() {
            ClockTime::new(self.hour, self.minute)
        } else {
            None
        }
    }
}

/// Trait for abstracting the real-time-clock chip.
pub trait Rtc {
    /// Probes the chip. Returns false when it does not respond.
    fn begin(&mut self) -> bool;

    /// True if the oscillator has been started since the last power loss.
    fn is_running(&mut self) -> bool;

    /// Writes a new date and time and starts the oscillator.
    fn adjust(&mut self, time: RtcDateTime);

    /// Reads the current date and time.
    fn now(&mut self) -> RtcDateTime;
}

/// Trait for the diagnostic status indicator.
pub trait StatusLed {
    /// Turns the indicator on or off.
    fn set(&mut self, on: bool);
}

/// Unrecoverable startup failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartupError {
    /// The RTC chip did not answer the probe.
    RtcNotDetected,
}

impl core::fmt::Display for StartupError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StartupError::RtcNotDetected => write!(f, "RTC not detected"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StartupError {}

/// A valid time read from the RTC at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoadedTime {
    /// Time of day.
    pub time: ClockTime,
    /// Seconds into the current minute, used to phase-align the minute timer.
    pub second: u8,
}

/// Wraps the RTC and the status LED that reports its absence.
pub struct WallClock<R: Rtc, S: StatusLed> {
    rtc: R,
    status: S,
    build_time: RtcDateTime,
    backing_store: bool,
}

impl<R: Rtc, S: StatusLed> WallClock<R, S> {
    /// Creates a wall clock. `build_time` seeds a stopped RTC and the
    /// software-only clock.
    pub fn new(rtc: R, mut status: S, build_time: RtcDateTime) -> Self {
        status.set(false);

        Self {
            rtc,
            status,
            build_time,
            backing_store: false,
        }
    }

    /// Initializes the RTC and reads the current time.
    ///
    /// # Returns
    /// * `Ok(Some(time))` - The RTC holds a valid time
    /// * `Ok(None)` - The RTC reading is invalid; running without backing store
    /// * `Err(RtcNotDetected)` - No RTC chip; the status LED is lit and the caller must halt
    pub fn load(&mut self) -> Result<Option<LoadedTime>, StartupError> {
        if !self.rtc.begin() {
            log!(error, "RTC not detected");
            self.backing_store = false;
            self.status.set(true);
            return Err(StartupError::RtcNotDetected);
        }

        if !self.rtc.is_running() {
            log!(warn, "RTC stopped, seeding with build time");
            self.rtc.adjust(self.build_time);
        }

        let reading = self.rtc.now();
        match reading.clock_time() {
            Some(time) => {
                self.backing_store = true;
                log!(info, "RTC time {=u8}:{=u8}:{=u8}", reading.hour, reading.minute, reading.second);
                Ok(Some(LoadedTime {
                    time,
                    second: reading.second,
                }))
            }
            None => {
                self.backing_store = false;
                log!(warn, "RTC reading invalid, running without backing store");
                Ok(None)
            }
        }
    }

    /// Persists hour and minute. Does nothing without a backing store.
    pub fn save(&mut self, time: ClockTime) {
        if !self.backing_store {
            return;
        }
        log!(info, "saving {=u8}:{=u8} to RTC", time.hour(), time.minute());
        self.rtc.adjust(RtcDateTime::at(time));
    }

    /// True when the RTC holds a valid time and receives saves.
    #[inline]
    pub fn available(&self) -> bool {
        self.backing_store
    }

    /// Time of day the firmware was built, used when the RTC cannot be trusted.
    pub fn build_time(&self) -> ClockTime {
        ClockTime::new(self.build_time.hour, self.build_time.minute).unwrap_or(ClockTime::MIDNIGHT)
    }

    /// Drives the status LED: mirrors `blink_on` without backing store, off otherwise.
    pub fn show_status(&mut self, blink_on: bool) {
        self.status.set(!self.backing_store && blink_on);
    }

    /// Returns a reference to the RTC.
    pub fn rtc(&self) -> &R {
        &self.rtc
    }

    /// Returns a reference to the status LED.
    pub fn status_led(&self) -> &S {
        &self.status
    }

    /// Gives back the RTC and the status LED.
    pub fn into_parts(self) -> (R, S) {
        (self.rtc, self.status)
    }
}

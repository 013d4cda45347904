#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`Controller`**: The single state machine that owns the clock, the timer and the mode
//! - **`Mode`**: Clock, SetHour, SetMinute, SetTimer, Countdown or Alarm
//! - **`transition`**: The pure `(Mode, Event) -> Transition` table behind the controller
//! - **`ClockTime`** / **`TimerValue`**: Always-valid time of day and countdown duration
//! - **`IntervalTimer`**: Drift-free software timer driven by elapsed-time comparisons
//! - **`WallClock`**: RTC loading and saving with a software-only fallback
//! - **`InputReader`**: Debounced button edges and quantized encoder detents
//! - **`DisplayRenderer`**: 7-segment encoding and ambient brightness
//! - **`AlarmSequencer`**: Repeating, decaying-volume tone bursts
//! - **`TimeSource`**, **`Rtc`**, **`RotaryInput`**, **`SegmentDisplay`**, **`AmbientLight`**,
//!   **`Buzzer`**, **`StatusLed`**: Traits to implement for your hardware

// Diagnostics go through defmt when the feature is enabled and vanish otherwise.
macro_rules! log {
    ($level:ident, $($arg:tt)+) => {
        #[cfg(feature = "defmt")]
        defmt::$level!($($arg)+);
    };
}

pub mod alarm;
pub mod config;
pub mod controller;
pub mod display;
pub mod input;
pub mod state;
pub mod time;
pub mod types;
pub mod wall_clock;

pub use alarm::{AlarmSequencer, AlarmState, Buzzer};
pub use config::{Config, ConfigBuilder, ConfigError};
pub use controller::{Controller, ModeChange, Peripherals, PollReport, StartupFailure};
pub use display::{AmbientLight, DisplayRenderer, Frame, SegmentDisplay, Segments};
pub use input::{ButtonEdge, Gesture, InputReader, RotaryInput};
pub use state::{Action, Direction, Event, Transition, transition};
pub use time::{IntervalTimer, TimeDuration, TimeInstant, TimeSource};
pub use types::{Adjustment, ClockTime, Digits, Mode, TimerValue};
pub use wall_clock::{LoadedTime, Rtc, RtcDateTime, StartupError, StatusLed, WallClock};

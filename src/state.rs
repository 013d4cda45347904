//! The mode transition table.
//!
//! [`transition`] is a pure function from the current mode and an input
//! event to the next mode plus the side effect the controller must perform.
//! It knows nothing about time or hardware, so every row of the table can be
//! checked directly.

use crate::types::{Adjustment, Mode};

/// Encoder turn direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Clockwise.
    Up,
    /// Counter-clockwise.
    Down,
}

impl Direction {
    /// +1 or -1.
    pub fn signum(&self) -> i32 {
        match self {
            Direction::Up => 1,
            Direction::Down => -1,
        }
    }
}

/// Inputs to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Button pressed and released. Carries whether the timer is at zero,
    /// which decides between starting a countdown and leaving timer mode.
    ShortPress { timer_empty: bool },
    /// Button held past the long-press threshold.
    LongPress,
    /// One encoder detent.
    Turn(Direction),
    /// The per-second countdown reached zero.
    CountdownExpired,
    /// Timer editing saw no input for the inactivity timeout.
    Timeout,
}

/// Side effect attached to a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Nothing beyond the mode change.
    None,
    /// Show the timer and start the inactivity timeout.
    OpenTimer,
    /// Step the hour.
    AdjustHour(Direction),
    /// Step the minute.
    AdjustMinute(Direction),
    /// Persist the edited time and restart the minute from zero seconds.
    ConfirmClock,
    /// Step the timer value.
    AdjustTimer(Direction, Adjustment),
    /// Start counting down and remember the armed duration.
    StartCountdown,
    /// Stop counting, keeping the remaining time.
    PauseCountdown,
    /// Zero the timer and the remembered duration.
    ResetTimer,
    /// Leave timer mode, zeroing the timer and the remembered duration.
    CloseTimer,
    /// Start the alarm sound at full brightness.
    RaiseAlarm,
    /// Silence the alarm and restore the remembered duration.
    DismissAlarm,
}

/// Result of applying an event to a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    pub next: Mode,
    pub action: Action,
}

impl Transition {
    const fn to(next: Mode, action: Action) -> Self {
        Self { next, action }
    }

    const fn stay(mode: Mode) -> Self {
        Self::to(mode, Action::None)
    }
}

/// Applies `event` in `mode`.
pub fn transition(mode: Mode, event: Event) -> Transition {
    use Event::{CountdownExpired, LongPress, ShortPress, Timeout, Turn};

    match (mode, event) {
        (Mode::Clock, ShortPress { .. }) => Transition::to(Mode::SetTimer, Action::OpenTimer),
        (Mode::Clock, LongPress) => Transition::to(Mode::SetHour, Action::None),
        // Turning up from the clock starts editing the timer straight away.
        (Mode::Clock, Turn(Direction::Up)) => Transition::to(
            Mode::SetTimer,
            Action::AdjustTimer(Direction::Up, Adjustment::Snap),
        ),

        (Mode::SetHour, ShortPress { .. }) => Transition::to(Mode::SetMinute, Action::None),
        (Mode::SetHour, Turn(direction)) => {
            Transition::to(Mode::SetHour, Action::AdjustHour(direction))
        }

        (Mode::SetMinute, ShortPress { .. }) => Transition::to(Mode::Clock, Action::ConfirmClock),
        (Mode::SetMinute, Turn(direction)) => {
            Transition::to(Mode::SetMinute, Action::AdjustMinute(direction))
        }

        (Mode::SetTimer, ShortPress { timer_empty: false }) => {
            Transition::to(Mode::Countdown, Action::StartCountdown)
        }
        (Mode::SetTimer, ShortPress { timer_empty: true }) => {
            Transition::to(Mode::Clock, Action::CloseTimer)
        }
        (Mode::SetTimer, LongPress) => Transition::to(Mode::SetTimer, Action::ResetTimer),
        (Mode::SetTimer, Turn(direction)) => Transition::to(
            Mode::SetTimer,
            Action::AdjustTimer(direction, Adjustment::Snap),
        ),
        (Mode::SetTimer, Timeout) => Transition::to(Mode::Clock, Action::CloseTimer),

        (Mode::Countdown, ShortPress { .. }) => {
            Transition::to(Mode::SetTimer, Action::PauseCountdown)
        }
        (Mode::Countdown, Turn(direction)) => Transition::to(
            Mode::Countdown,
            Action::AdjustTimer(direction, Adjustment::Live),
        ),
        (Mode::Countdown, CountdownExpired) => Transition::to(Mode::Alarm, Action::RaiseAlarm),

        (Mode::Alarm, ShortPress { .. }) => Transition::to(Mode::SetTimer, Action::DismissAlarm),

        (mode, _) => Transition::stay(mode),
    }
}

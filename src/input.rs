//! Button and rotary encoder input.
//!
//! The hardware layer supplies raw readings through [`RotaryInput`]. This
//! module turns them into debounced button edges, quantized encoder detents
//! and short/long press gestures.

use crate::time::{TimeDuration, TimeInstant};

/// Trait for abstracting the encoder module (rotary encoder with push button).
pub trait RotaryInput {
    /// Raw button level: true while held down. May bounce.
    fn button_is_down(&mut self) -> bool;

    /// Signed raw quadrature pulses counted since the previous call.
    ///
    /// Pulses are usually captured in an interrupt so none are lost between
    /// polls. Clockwise is positive.
    fn take_pulses(&mut self) -> i32;
}

/// A debounced button edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEdge {
    /// No change this poll.
    None,
    /// The button went down.
    Pressed,
    /// The button came up.
    Released,
}

/// A complete button gesture, as interpreted by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gesture {
    /// Pressed and released before the long-press threshold.
    ShortPress,
    /// Held for at least the long-press threshold. Fires once per hold.
    LongPress,
}

/// Accepts a level change only after it has been stable for the debounce window.
#[derive(Debug, Clone, Copy)]
pub struct Debouncer<I: TimeInstant> {
    stable_down: bool,
    raw_down: bool,
    raw_since: I,
    window_ms: u32,
}

impl<I: TimeInstant> Debouncer<I> {
    /// Creates a debouncer that starts in the released state.
    pub fn new(now: I, window_ms: u32) -> Self {
        Self {
            stable_down: false,
            raw_down: false,
            raw_since: now,
            window_ms,
        }
    }

    /// Feeds one raw sample and returns the resulting edge, if any.
    pub fn update(&mut self, raw_down: bool, now: I) -> ButtonEdge {
        if raw_down != self.raw_down {
            self.raw_down = raw_down;
            self.raw_since = now;
        }

        if self.raw_down == self.stable_down {
            return ButtonEdge::None;
        }

        let held = now.duration_since(self.raw_since).as_millis();
        if held < u64::from(self.window_ms) {
            return ButtonEdge::None;
        }

        self.stable_down = self.raw_down;
        if self.stable_down {
            ButtonEdge::Pressed
        } else {
            ButtonEdge::Released
        }
    }

    /// Debounced level.
    pub fn is_down(&self) -> bool {
        self.stable_down
    }
}

/// Converts raw encoder pulses into whole detents.
///
/// Partial detents are kept and count toward the next poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetentCounter {
    pulses: i32,
    pulses_per_detent: i32,
}

impl DetentCounter {
    /// Creates a counter. `pulses_per_detent` must be non-zero.
    pub fn new(pulses_per_detent: u8) -> Self {
        Self {
            pulses: 0,
            pulses_per_detent: i32::from(pulses_per_detent.max(1)),
        }
    }

    /// Adds raw pulses and returns the number of complete detents, signed.
    pub fn add(&mut self, pulses: i32) -> i32 {
        self.pulses = self.pulses.saturating_add(pulses);
        let detents = self.pulses / self.pulses_per_detent;
        self.pulses -= detents * self.pulses_per_detent;
        detents
    }

    /// Pulses retained toward the next detent.
    pub fn pending(&self) -> i32 {
        self.pulses
    }
}

/// Tracks how long the button has been held to tell short presses from long ones.
#[derive(Debug, Clone, Copy)]
pub struct PressTracker<I: TimeInstant> {
    pressed_at: Option<I>,
    long_press_ms: u32,
}

impl<I: TimeInstant> PressTracker<I> {
    /// Creates a tracker with no press in progress.
    pub fn new(long_press_ms: u32) -> Self {
        Self {
            pressed_at: None,
            long_press_ms,
        }
    }

    /// Handles a debounced edge.
    ///
    /// A release ends a tracked press as a short press. A release after a
    /// long press already fired is ignored.
    pub fn on_edge(&mut self, edge: ButtonEdge, now: I) -> Option<Gesture> {
        match edge {
            ButtonEdge::Pressed => {
                self.pressed_at = Some(now);
                None
            }
            ButtonEdge::Released => self.pressed_at.take().map(|_| Gesture::ShortPress),
            ButtonEdge::None => None,
        }
    }

    /// Fires a long press once the tracked press reaches the threshold.
    ///
    /// The press is forgotten when it fires so it cannot fire again during
    /// the same hold.
    pub fn poll_hold(&mut self, now: I) -> Option<Gesture> {
        let pressed_at = self.pressed_at?;
        if now.duration_since(pressed_at).as_millis() < u64::from(self.long_press_ms) {
            return None;
        }
        self.pressed_at = None;
        Some(Gesture::LongPress)
    }

    /// True while a press is being tracked.
    pub fn is_tracking(&self) -> bool {
        self.pressed_at.is_some()
    }
}

/// Reads the encoder module once per poll.
pub struct InputReader<I: TimeInstant, P: RotaryInput> {
    port: P,
    debouncer: Debouncer<I>,
    detents: DetentCounter,
}

impl<I: TimeInstant, P: RotaryInput> InputReader<I, P> {
    /// Creates a reader over `port`.
    pub fn new(port: P, now: I, debounce_ms: u32, pulses_per_detent: u8) -> Self {
        Self {
            port,
            debouncer: Debouncer::new(now, debounce_ms),
            detents: DetentCounter::new(pulses_per_detent),
        }
    }

    /// Samples the button and returns a debounced edge.
    pub fn poll_button(&mut self, now: I) -> ButtonEdge {
        let raw = self.port.button_is_down();
        self.debouncer.update(raw, now)
    }

    /// Drains raw pulses and returns complete detents since the last poll.
    pub fn poll_encoder(&mut self) -> i32 {
        let pulses = self.port.take_pulses();
        self.detents.add(pulses)
    }

    /// Returns a reference to the input port.
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Returns a mutable reference to the input port.
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }
}

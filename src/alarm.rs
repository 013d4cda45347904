//! Alarm tone sequencer.
//!
//! One ring is a fixed number of bursts. Each burst is a ramp of short tone
//! pulses from full volume down to the quietest step. After the last burst
//! the sequencer falls silent until it is restarted; the controller restarts
//! it on a fixed interval for as long as the alarm is active, which gives the
//! "ring, pause, ring again" pattern.

use crate::config::Config;
use crate::time::{IntervalTimer, TimeInstant};

/// Trait for abstracting the buzzer driver.
pub trait Buzzer {
    /// Plays a tone. `volume` counts up from 1 (quietest). When `blocking`
    /// is false the call returns immediately and the tone ends on its own.
    fn tone(&mut self, frequency_hz: u16, volume: u8, duration_ms: u16, blocking: bool);
}

/// The current state of the alarm sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmState {
    /// Never started, or stopped. Silent.
    Idle,
    /// Emitting pulses on the tone cadence.
    Ringing,
    /// All bursts of the current ring played. Silent until restarted.
    Complete,
}

/// Drives the buzzer through repeating, decaying-volume bursts.
pub struct AlarmSequencer<I: TimeInstant, Z: Buzzer> {
    buzzer: Z,
    state: AlarmState,
    cadence: IntervalTimer<I>,
    volume: u8,
    bursts_played: u8,
    volume_steps: u8,
    total_bursts: u8,
    frequency_hz: u16,
    pulse_ms: u16,
}

impl<I: TimeInstant, Z: Buzzer> AlarmSequencer<I, Z> {
    /// Creates an idle sequencer.
    pub fn new(buzzer: Z, now: I, config: &Config) -> Self {
        Self {
            buzzer,
            state: AlarmState::Idle,
            cadence: IntervalTimer::new(now, config.alarm_tone_cadence_ms),
            volume: config.alarm_volume_steps,
            bursts_played: 0,
            volume_steps: config.alarm_volume_steps,
            total_bursts: config.alarm_bursts,
            frequency_hz: config.alarm_tone_hz,
            pulse_ms: config.alarm_tone_duration_ms,
        }
    }

    /// Advances the sequence.
    ///
    /// With `restart` set, the ring starts over at full volume with no bursts
    /// played and the first pulse sounds immediately. Otherwise a pulse sounds
    /// whenever the tone cadence elapses while ringing.
    pub fn tick(&mut self, now: I, restart: bool) {
        if restart {
            self.volume = self.volume_steps;
            self.bursts_played = 0;
            self.cadence.reset(now);
            self.state = AlarmState::Ringing;
            self.pulse();
            return;
        }

        if self.state == AlarmState::Ringing && self.cadence.poll(now) {
            self.pulse();
        }
    }

    /// Silences the sequencer until the next restart.
    pub fn stop(&mut self) {
        self.state = AlarmState::Idle;
    }

    /// Returns the current state.
    pub fn state(&self) -> AlarmState {
        self.state
    }

    /// Volume of the next pulse.
    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Bursts completed in the current ring.
    pub fn bursts_played(&self) -> u8 {
        self.bursts_played
    }

    /// Returns a reference to the buzzer.
    pub fn buzzer(&self) -> &Z {
        &self.buzzer
    }

    fn pulse(&mut self) {
        self.buzzer
            .tone(self.frequency_hz, self.volume, self.pulse_ms, false);

        self.volume -= 1;
        if self.volume == 0 {
            self.volume = self.volume_steps;
            self.bursts_played += 1;
            if self.bursts_played >= self.total_bursts {
                self.state = AlarmState::Complete;
            }
        }
    }
}

//! 4-digit 7-segment rendering and adaptive brightness.
//!
//! Segment bytes use the common `.gfedcba` layout: bit 0 is segment a, bit 6
//! is segment g and bit 7 drives the colon on the second digit.

use crate::config::Config;
use crate::time::{IntervalTimer, TimeInstant};
use crate::types::Digits;

/// Raw segment data for the four digit positions.
pub type Segments = [u8; 4];

/// Segment patterns for 0-9.
pub const DIGIT_SEGMENTS: [u8; 10] = [
    0b0011_1111, // 0
    0b0000_0110, // 1
    0b0101_1011, // 2
    0b0100_1111, // 3
    0b0110_0110, // 4
    0b0110_1101, // 5
    0b0111_1101, // 6
    0b0000_0111, // 7
    0b0111_1111, // 8
    0b0110_1111, // 9
];

/// Colon bit, overlaid on the second digit.
pub const COLON: u8 = 0b1000_0000;

/// All segments off.
pub const BLANK: u8 = 0;

/// Trait for abstracting the 7-segment display module.
pub trait SegmentDisplay {
    /// Shows `segments` at `brightness` (0..=7). When `visible` is false the
    /// display is switched off for this frame, keeping its contents.
    fn write(&mut self, segments: &Segments, brightness: u8, visible: bool);
}

/// Trait for abstracting the ambient light sensor.
pub trait AmbientLight {
    /// One analog reading; higher is brighter.
    fn read(&mut self) -> u16;
}

/// What the controller wants on the display this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    pub digits: Digits,
    pub colon: bool,
    pub show_left: bool,
    pub show_right: bool,
    pub visible: bool,
}

impl Frame {
    /// All four digits shown, colon as given.
    pub fn steady(digits: Digits, colon: bool) -> Self {
        Self {
            digits,
            colon,
            show_left: true,
            show_right: true,
            visible: true,
        }
    }
}

/// Encodes four digits into segment bytes.
///
/// A zero in the first position is blanked. A hidden pair blanks both of its
/// digits. The colon bit is added to the second digit.
pub fn encode(digits: Digits, colon: bool, show_left: bool, show_right: bool) -> Segments {
    let glyph = |d: u8| DIGIT_SEGMENTS.get(usize::from(d)).copied().unwrap_or(BLANK);

    let mut segments = digits.map(glyph);
    if digits[0] == 0 {
        segments[0] = BLANK;
    }
    if !show_left {
        segments[0] = BLANK;
        segments[1] = BLANK;
    }
    if !show_right {
        segments[2] = BLANK;
        segments[3] = BLANK;
    }
    if colon {
        segments[1] |= COLON;
    }
    segments
}

/// Picks a brightness level from the ambient light sensor.
///
/// Readings are taken on a fixed cadence and only applied when they leave
/// the hysteresis band around the last applied reading.
#[derive(Debug, Clone, Copy)]
pub struct BrightnessControl<I: TimeInstant> {
    sample_timer: IntervalTimer<I>,
    applied_reading: Option<u16>,
    level: u8,
    threshold: u16,
    hysteresis: u16,
    min: u8,
    max: u8,
}

impl<I: TimeInstant> BrightnessControl<I> {
    /// Creates a control at maximum brightness with no reading applied yet.
    pub fn new(now: I, config: &Config) -> Self {
        Self {
            sample_timer: IntervalTimer::new(now, config.light_sample_ms),
            applied_reading: None,
            level: config.brightness_max,
            threshold: config.light_threshold,
            hysteresis: config.light_hysteresis,
            min: config.brightness_min,
            max: config.brightness_max,
        }
    }

    /// Samples the sensor if the cadence allows and returns the current level.
    pub fn update<A: AmbientLight>(&mut self, now: I, light: &mut A) -> u8 {
        if self.sample_timer.poll(now) {
            self.apply(light.read());
        }
        self.level
    }

    /// Applies a reading if it moved far enough from the last applied one.
    pub fn apply(&mut self, reading: u16) {
        if let Some(previous) = self.applied_reading {
            if reading.abs_diff(previous) <= self.hysteresis {
                return;
            }
        }
        self.applied_reading = Some(reading);
        self.level = self.level_for(reading);
    }

    /// Forgets the last applied reading so the next sample is always applied.
    pub fn invalidate(&mut self) {
        self.applied_reading = None;
    }

    /// Current level.
    pub fn level(&self) -> u8 {
        self.level
    }

    // Above the threshold is bright, anything else dim; there is no in-between.
    fn level_for(&self, reading: u16) -> u8 {
        if reading > self.threshold {
            self.max
        } else {
            self.min
        }
    }
}

/// Owns the display and light sensor and turns frames into segment writes.
pub struct DisplayRenderer<I: TimeInstant, D: SegmentDisplay, A: AmbientLight> {
    display: D,
    light: A,
    brightness: BrightnessControl<I>,
    max_brightness: u8,
    last_written: Option<(Segments, u8, bool)>,
}

impl<I: TimeInstant, D: SegmentDisplay, A: AmbientLight> DisplayRenderer<I, D, A> {
    /// Creates a renderer and applies an initial light reading.
    pub fn new(display: D, mut light: A, now: I, config: &Config) -> Self {
        let mut brightness = BrightnessControl::new(now, config);
        brightness.apply(light.read());

        Self {
            display,
            light,
            brightness,
            max_brightness: config.brightness_max,
            last_written: None,
        }
    }

    /// Samples ambient light on its cadence.
    pub fn update_brightness(&mut self, now: I) {
        self.brightness.update(now, &mut self.light);
    }

    /// Brightness for the next frame: maximum during the alarm, ambient otherwise.
    pub fn brightness(&self, alarm: bool) -> u8 {
        if alarm {
            self.max_brightness
        } else {
            self.brightness.level()
        }
    }

    /// Makes the next light sample apply unconditionally.
    pub fn resample_light(&mut self) {
        self.brightness.invalidate();
    }

    /// Encodes and writes a frame. Identical consecutive writes are skipped.
    pub fn show(&mut self, frame: Frame, alarm: bool) {
        let segments = encode(frame.digits, frame.colon, frame.show_left, frame.show_right);
        let brightness = self.brightness(alarm);
        let output = (segments, brightness, frame.visible);

        if self.last_written == Some(output) {
            return;
        }
        self.display.write(&segments, brightness, frame.visible);
        self.last_written = Some(output);
    }

    /// Returns a reference to the display.
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Returns a mutable reference to the light sensor.
    pub fn light_mut(&mut self) -> &mut A {
        &mut self.light
    }
}

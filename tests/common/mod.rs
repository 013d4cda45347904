//! Shared test infrastructure for kitchen-clock integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use core::cell::Cell;

use kitchen_clock::{
    AmbientLight, Buzzer, Config, Controller, Peripherals, RotaryInput, Rtc, RtcDateTime,
    SegmentDisplay, Segments, StatusLed, TimeDuration, TimeInstant, TimeSource,
};

// ============================================================================
// Mock Time Types
// ============================================================================

/// Mock duration type for testing (wraps milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestDuration(pub u64);

impl TimeDuration for TestDuration {
    const ZERO: Self = TestDuration(0);

    fn as_millis(&self) -> u64 {
        self.0
    }

    fn from_millis(millis: u64) -> Self {
        TestDuration(millis)
    }

    fn saturating_sub(self, other: Self) -> Self {
        TestDuration(self.0.saturating_sub(other.0))
    }
}

/// Mock instant type for testing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestInstant(pub u64);

impl TimeInstant for TestInstant {
    type Duration = TestDuration;

    fn duration_since(&self, earlier: Self) -> Self::Duration {
        TestDuration(self.0 - earlier.0)
    }

    fn checked_add(self, duration: Self::Duration) -> Option<Self> {
        Some(TestInstant(self.0 + duration.0))
    }

    fn checked_sub(self, duration: Self::Duration) -> Option<Self> {
        self.0.checked_sub(duration.0).map(TestInstant)
    }
}

// ============================================================================
// Mock Time Source
// ============================================================================

/// Mock time source with controllable time advancement
pub struct MockTimeSource {
    current_time: Cell<TestInstant>,
}

impl MockTimeSource {
    pub fn new() -> Self {
        Self {
            current_time: Cell::new(TestInstant(0)),
        }
    }

    /// Advance time by the given number of milliseconds
    pub fn advance(&self, millis: u64) {
        let current = self.current_time.get();
        self.current_time.set(TestInstant(current.0 + millis));
    }

    pub fn now_ms(&self) -> u64 {
        self.current_time.get().0
    }
}

impl TimeSource<TestInstant> for MockTimeSource {
    fn now(&self) -> TestInstant {
        self.current_time.get()
    }
}

// ============================================================================
// Mock Peripherals
// ============================================================================

/// Mock RTC chip holding one reading and recording every write
pub struct MockRtc {
    pub present: bool,
    pub running: bool,
    pub time: RtcDateTime,
    pub writes: heapless::Vec<RtcDateTime, 64>,
}

impl MockRtc {
    pub fn at(hour: u8, minute: u8, second: u8) -> Self {
        Self {
            present: true,
            running: true,
            time: RtcDateTime::new(2000, 1, 1, hour, minute, second),
            writes: heapless::Vec::new(),
        }
    }

    pub fn missing() -> Self {
        Self {
            present: false,
            ..Self::at(0, 0, 0)
        }
    }

    pub fn garbage() -> Self {
        Self {
            time: RtcDateTime::new(2165, 165, 165, 45, 85, 85),
            ..Self::at(0, 0, 0)
        }
    }

    pub fn last_write(&self) -> Option<RtcDateTime> {
        self.writes.last().copied()
    }
}

impl Rtc for MockRtc {
    fn begin(&mut self) -> bool {
        self.present
    }

    fn is_running(&mut self) -> bool {
        self.running
    }

    fn adjust(&mut self, time: RtcDateTime) {
        self.time = time;
        self.running = true;
        let _ = self.writes.push(time);
    }

    fn now(&mut self) -> RtcDateTime {
        self.time
    }
}

/// Mock status LED
pub struct MockStatusLed {
    pub on: bool,
    pub toggles: u32,
}

impl MockStatusLed {
    pub fn new() -> Self {
        Self { on: false, toggles: 0 }
    }
}

impl StatusLed for MockStatusLed {
    fn set(&mut self, on: bool) {
        if on != self.on {
            self.toggles += 1;
        }
        self.on = on;
    }
}

/// Mock encoder module; tests press the button and queue pulses directly
pub struct MockInput {
    pub button_down: bool,
    pub pulses: i32,
}

impl MockInput {
    pub fn new() -> Self {
        Self {
            button_down: false,
            pulses: 0,
        }
    }
}

impl RotaryInput for MockInput {
    fn button_is_down(&mut self) -> bool {
        self.button_down
    }

    fn take_pulses(&mut self) -> i32 {
        core::mem::take(&mut self.pulses)
    }
}

/// One write to the mock display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayWrite {
    pub segments: Segments,
    pub brightness: u8,
    pub visible: bool,
}

/// Mock display that records the latest write and counts all of them
pub struct MockDisplay {
    pub last: Option<DisplayWrite>,
    pub writes: u32,
}

impl MockDisplay {
    pub fn new() -> Self {
        Self { last: None, writes: 0 }
    }
}

impl SegmentDisplay for MockDisplay {
    fn write(&mut self, segments: &Segments, brightness: u8, visible: bool) {
        self.last = Some(DisplayWrite {
            segments: *segments,
            brightness,
            visible,
        });
        self.writes += 1;
    }
}

/// Mock light sensor returning a settable reading
pub struct MockLight {
    pub reading: u16,
    pub reads: u32,
}

impl MockLight {
    pub fn new(reading: u16) -> Self {
        Self { reading, reads: 0 }
    }
}

impl AmbientLight for MockLight {
    fn read(&mut self) -> u16 {
        self.reads += 1;
        self.reading
    }
}

/// One tone played by the mock buzzer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tone {
    pub at_ms: u64,
    pub frequency_hz: u16,
    pub volume: u8,
    pub duration_ms: u16,
    pub blocking: bool,
}

/// Mock buzzer recording every tone
pub struct MockBuzzer<'t> {
    time: &'t MockTimeSource,
    pub tones: heapless::Vec<Tone, 256>,
}

impl<'t> MockBuzzer<'t> {
    pub fn new(time: &'t MockTimeSource) -> Self {
        Self {
            time,
            tones: heapless::Vec::new(),
        }
    }

    pub fn volumes(&self) -> heapless::Vec<u8, 256> {
        self.tones.iter().map(|tone| tone.volume).collect()
    }
}

impl Buzzer for MockBuzzer<'_> {
    fn tone(&mut self, frequency_hz: u16, volume: u8, duration_ms: u16, blocking: bool) {
        let _ = self.tones.push(Tone {
            at_ms: self.time.now_ms(),
            frequency_hz,
            volume,
            duration_ms,
            blocking,
        });
    }
}

// ============================================================================
// Controller Rig
// ============================================================================

pub type TestController<'t> = Controller<
    't,
    TestInstant,
    MockTimeSource,
    MockRtc,
    MockStatusLed,
    MockInput,
    MockDisplay,
    MockLight,
    MockBuzzer<'t>,
>;

pub const BUILD_TIME: RtcDateTime = RtcDateTime::new(2024, 5, 17, 14, 22, 0);

/// Builds a controller over mock peripherals with the default configuration
pub fn controller(time: &MockTimeSource, rtc: MockRtc) -> TestController<'_> {
    controller_with(time, rtc, Config::default())
}

pub fn controller_with(time: &MockTimeSource, rtc: MockRtc, config: Config) -> TestController<'_> {
    let peripherals = Peripherals {
        rtc,
        status_led: MockStatusLed::new(),
        input: MockInput::new(),
        display: MockDisplay::new(),
        light: MockLight::new(800),
        buzzer: MockBuzzer::new(time),
    };
    Controller::new(peripherals, time, BUILD_TIME, config).unwrap()
}

/// Polls every 10ms for `millis`
pub fn run_for(controller: &mut TestController<'_>, time: &MockTimeSource, millis: u64) {
    let mut elapsed = 0;
    while elapsed < millis {
        let step = (millis - elapsed).min(10);
        time.advance(step);
        controller.poll();
        elapsed += step;
    }
}

/// Presses and releases the button, holding it for `hold_ms`
pub fn press_for(controller: &mut TestController<'_>, time: &MockTimeSource, hold_ms: u64) {
    controller.input_mut().button_down = true;
    run_for(controller, time, hold_ms);
    controller.input_mut().button_down = false;
    run_for(controller, time, 100);
}

/// A 100ms press
pub fn short_press(controller: &mut TestController<'_>, time: &MockTimeSource) {
    press_for(controller, time, 100);
}

/// Turns the encoder by whole detents (negative is counter-clockwise) and polls once
pub fn turn(controller: &mut TestController<'_>, time: &MockTimeSource, detents: i32) {
    let pulses = detents * i32::from(controller.config().pulses_per_detent);
    controller.input_mut().pulses += pulses;
    time.advance(10);
    controller.poll();
}

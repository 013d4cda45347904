//! The cooperative poll loop that runs the whole appliance.
//!
//! [`Controller::poll`] is called as often as possible from the firmware's
//! main loop. Each call reads the monotonic clock once and then, in this
//! fixed order:
//!
//! 1. advances the wall clock and the countdown,
//! 2. handles encoder detents,
//! 3. handles button edges and long presses,
//! 4. applies the timer-editing inactivity timeout,
//! 5. drives the alarm sound, brightness, status LED and display refresh.
//!
//! Later stages read state written by earlier ones in the same call, so the
//! order must not change. Nothing here blocks.

use heapless::Vec;

use crate::alarm::{AlarmSequencer, Buzzer};
use crate::config::Config;
use crate::display::{AmbientLight, DisplayRenderer, Frame, SegmentDisplay};
use crate::input::{Gesture, InputReader, PressTracker, RotaryInput};
use crate::state::{Action, Direction, Event, transition};
use crate::time::{IntervalTimer, TimeDuration, TimeInstant, TimeSource};
use crate::types::{ClockTime, Mode, TimerValue};
use crate::wall_clock::{Rtc, RtcDateTime, StartupError, StatusLed, WallClock};

/// Most mode changes reported from a single poll.
pub const MAX_CHANGES_PER_POLL: usize = 8;

/// A mode change and the event that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModeChange {
    pub from: Mode,
    pub to: Mode,
    pub event: Event,
}

/// Mode changes taken during one poll, oldest first.
pub type PollReport = Vec<ModeChange, MAX_CHANGES_PER_POLL>;

/// The hardware the controller drives.
pub struct Peripherals<R, S, P, D, A, Z> {
    pub rtc: R,
    pub status_led: S,
    pub input: P,
    pub display: D,
    pub light: A,
    pub buzzer: Z,
}

/// Returned by [`Controller::new`] when the appliance cannot run.
///
/// Carries the peripherals back so the firmware can keep signalling the
/// failure while it halts. The status LED is already lit.
pub struct StartupFailure<R, S, P, D, A, Z> {
    pub error: StartupError,
    pub peripherals: Peripherals<R, S, P, D, A, Z>,
}

impl<R, S: StatusLed, P, D, A, Z> StartupFailure<R, S, P, D, A, Z> {
    /// Drives the status LED, typically from a blink loop.
    pub fn signal(&mut self, on: bool) {
        self.peripherals.status_led.set(on);
    }
}

impl<R, S, P, D, A, Z> core::fmt::Debug for StartupFailure<R, S, P, D, A, Z> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StartupFailure")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

/// A flag that toggles every half-period.
#[derive(Debug, Clone, Copy)]
struct Blink<I: TimeInstant> {
    timer: IntervalTimer<I>,
    on: bool,
}

impl<I: TimeInstant> Blink<I> {
    fn new(now: I, half_period_ms: u32) -> Self {
        Self {
            timer: IntervalTimer::new(now, half_period_ms),
            on: true,
        }
    }

    fn update(&mut self, now: I) -> bool {
        if self.timer.poll(now) {
            self.on = !self.on;
        }
        self.on
    }
}

/// Clock, kitchen timer and alarm in one state machine.
///
/// # Type Parameters
/// * `'t` - Lifetime of the time source reference
/// * `I` - Time instant type
/// * `T` - Monotonic time source
/// * `R`, `S` - RTC chip and status LED
/// * `P` - Encoder module (button and rotary encoder)
/// * `D`, `A` - 7-segment display and ambient light sensor
/// * `Z` - Buzzer
pub struct Controller<'t, I, T, R, S, P, D, A, Z>
where
    I: TimeInstant,
    T: TimeSource<I>,
    R: Rtc,
    S: StatusLed,
    P: RotaryInput,
    D: SegmentDisplay,
    A: AmbientLight,
    Z: Buzzer,
{
    time_source: &'t T,
    config: Config,
    wall_clock: WallClock<R, S>,
    input: InputReader<I, P>,
    press: PressTracker<I>,
    renderer: DisplayRenderer<I, D, A>,
    alarm: AlarmSequencer<I, Z>,

    mode: Mode,
    clock: ClockTime,
    timer: TimerValue,
    timer_start: TimerValue,

    minute_timer: IntervalTimer<I>,
    second_timer: IntervalTimer<I>,
    refresh_timer: IntervalTimer<I>,
    alarm_restart_timer: IntervalTimer<I>,
    slow_blink: Blink<I>,
    fast_blink: Blink<I>,
    last_activity: I,
}

impl<'t, I, T, R, S, P, D, A, Z> Controller<'t, I, T, R, S, P, D, A, Z>
where
    I: TimeInstant,
    T: TimeSource<I>,
    R: Rtc,
    S: StatusLed,
    P: RotaryInput,
    D: SegmentDisplay,
    A: AmbientLight,
    Z: Buzzer,
{
    /// Starts the appliance in clock mode.
    ///
    /// Loads the time from the RTC. A missing RTC is fatal: the status LED is
    /// lit and the peripherals come back in the error so the firmware can
    /// halt and keep signalling. An RTC with an invalid time falls back to
    /// `build_time` and runs without backing store.
    pub fn new(
        peripherals: Peripherals<R, S, P, D, A, Z>,
        time_source: &'t T,
        build_time: RtcDateTime,
        config: Config,
    ) -> Result<Self, StartupFailure<R, S, P, D, A, Z>> {
        let now = time_source.now();

        let mut wall_clock = WallClock::new(peripherals.rtc, peripherals.status_led, build_time);
        let mut minute_timer = IntervalTimer::new(now, config.minute_ms);

        let loaded = match wall_clock.load() {
            Ok(loaded) => loaded,
            Err(error) => {
                let (rtc, status_led) = wall_clock.into_parts();
                return Err(StartupFailure {
                    error,
                    peripherals: Peripherals {
                        rtc,
                        status_led,
                        input: peripherals.input,
                        display: peripherals.display,
                        light: peripherals.light,
                        buzzer: peripherals.buzzer,
                    },
                });
            }
        };

        let clock = match loaded {
            Some(loaded) => {
                // Finish the minute the RTC is already part-way through.
                let into_minute = i64::from(loaded.second) * i64::from(config.second_ms);
                minute_timer.adjust_next_period(-into_minute);
                loaded.time
            }
            None => wall_clock.build_time(),
        };

        log!(info, "starting at {=u8}:{=u8}", clock.hour(), clock.minute());

        Ok(Self {
            time_source,
            wall_clock,
            input: InputReader::new(
                peripherals.input,
                now,
                config.debounce_ms,
                config.pulses_per_detent,
            ),
            press: PressTracker::new(config.long_press_ms),
            renderer: DisplayRenderer::new(peripherals.display, peripherals.light, now, &config),
            alarm: AlarmSequencer::new(peripherals.buzzer, now, &config),
            mode: Mode::Clock,
            clock,
            timer: TimerValue::ZERO,
            timer_start: TimerValue::ZERO,
            minute_timer,
            second_timer: IntervalTimer::new(now, config.second_ms),
            refresh_timer: IntervalTimer::new(now, config.display_refresh_ms),
            alarm_restart_timer: IntervalTimer::new(now, config.alarm_restart_ms),
            slow_blink: Blink::new(now, config.slow_blink_ms),
            fast_blink: Blink::new(now, config.fast_blink_ms),
            last_activity: now,
            config,
        })
    }

    /// Runs one iteration of the main loop.
    ///
    /// Returns every mode change taken during this iteration.
    pub fn poll(&mut self) -> PollReport {
        let now = self.time_source.now();
        let mut report = PollReport::new();

        self.update_clock(now);
        self.update_countdown(now, &mut report);

        let detents = self.input.poll_encoder();
        if detents != 0 {
            self.last_activity = now;
            let direction = if detents > 0 { Direction::Up } else { Direction::Down };
            for _ in 0..detents.unsigned_abs() {
                self.dispatch(Event::Turn(direction), now, &mut report);
            }
        }

        let edge = self.input.poll_button(now);
        if let Some(gesture) = self.press.on_edge(edge, now) {
            self.last_activity = now;
            self.dispatch_gesture(gesture, now, &mut report);
        }
        if let Some(gesture) = self.press.poll_hold(now) {
            self.last_activity = now;
            self.dispatch_gesture(gesture, now, &mut report);
        }

        if self.mode == Mode::SetTimer && self.press.is_tracking() {
            // A press in progress counts as activity.
            self.last_activity = now;
        }
        // Only a timer that was never started gives up on its own; a paused
        // or restored countdown waits for the user.
        let timeout = u64::from(self.config.set_timer_timeout_ms);
        let never_started = self.timer_start.is_zero();
        if self.mode == Mode::SetTimer && never_started && self.idle_ms(now) >= timeout {
            self.dispatch(Event::Timeout, now, &mut report);
        }

        self.update_outputs(now);
        report
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Current time of day.
    pub fn clock_time(&self) -> ClockTime {
        self.clock
    }

    /// Current timer value.
    pub fn timer_value(&self) -> TimerValue {
        self.timer
    }

    /// Duration restored when the alarm is dismissed.
    pub fn timer_start(&self) -> TimerValue {
        self.timer_start
    }

    /// True when the RTC holds a valid time and receives saves.
    pub fn has_backing_store(&self) -> bool {
        self.wall_clock.available()
    }

    /// Brightness that the next display write will use.
    pub fn brightness(&self) -> u8 {
        self.renderer.brightness(self.mode == Mode::Alarm)
    }

    /// Active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a reference to the alarm sequencer.
    pub fn alarm(&self) -> &AlarmSequencer<I, Z> {
        &self.alarm
    }

    /// Returns a reference to the display.
    pub fn display(&self) -> &D {
        self.renderer.display()
    }

    /// Returns a reference to the RTC.
    pub fn rtc(&self) -> &R {
        self.wall_clock.rtc()
    }

    /// Returns a reference to the status LED.
    pub fn status_led(&self) -> &S {
        self.wall_clock.status_led()
    }

    /// Returns a mutable reference to the encoder module.
    pub fn input_mut(&mut self) -> &mut P {
        self.input.port_mut()
    }

    /// Returns a mutable reference to the light sensor.
    pub fn light_mut(&mut self) -> &mut A {
        self.renderer.light_mut()
    }

    fn idle_ms(&self, now: I) -> u64 {
        now.duration_since(self.last_activity).as_millis()
    }

    fn update_clock(&mut self, now: I) {
        if self.mode.is_setting_clock() || !self.minute_timer.poll(now) {
            return;
        }

        if self.clock.advance_minute() {
            self.wall_clock.save(self.clock);
            let correction = i64::from(self.config.drift_correction_ms_per_hour);
            self.minute_timer.adjust_next_period(-correction);
        }
    }

    fn update_countdown(&mut self, now: I, report: &mut PollReport) {
        if self.mode != Mode::Countdown || !self.second_timer.poll(now) {
            return;
        }

        if self.timer.count_down() {
            self.dispatch(Event::CountdownExpired, now, report);
        }
    }

    fn dispatch_gesture(&mut self, gesture: Gesture, now: I, report: &mut PollReport) {
        let event = match gesture {
            Gesture::ShortPress => Event::ShortPress {
                timer_empty: self.timer.is_zero(),
            },
            Gesture::LongPress => Event::LongPress,
        };
        self.dispatch(event, now, report);
    }

    fn dispatch(&mut self, event: Event, now: I, report: &mut PollReport) {
        let step = transition(self.mode, event);
        self.perform(step.action, now);

        if step.next != self.mode {
            log!(info, "{} -> {} on {}", self.mode, step.next, event);
            // Overflowing the report only loses diagnostics.
            let _ = report.push(ModeChange {
                from: self.mode,
                to: step.next,
                event,
            });
        }
        self.mode = step.next;
    }

    fn perform(&mut self, action: Action, now: I) {
        match action {
            Action::None | Action::OpenTimer | Action::PauseCountdown => {}
            Action::AdjustHour(direction) => self.clock.adjust_hour(direction.signum()),
            Action::AdjustMinute(direction) => self.clock.adjust_minute(direction.signum()),
            Action::ConfirmClock => {
                self.wall_clock.save(self.clock);
                self.minute_timer.reset(now);
            }
            Action::AdjustTimer(direction, adjustment) => {
                let applied = match direction {
                    Direction::Up => self.timer.increase(adjustment),
                    Direction::Down => self.timer.decrease(adjustment),
                };
                if !applied {
                    log!(debug, "timer step rejected at {=u16}s", self.timer.seconds());
                }
            }
            Action::StartCountdown => {
                self.second_timer.reset(now);
                if self.timer >= self.timer_start {
                    self.timer_start = self.timer;
                }
            }
            Action::ResetTimer | Action::CloseTimer => {
                self.timer = TimerValue::ZERO;
                self.timer_start = TimerValue::ZERO;
            }
            Action::RaiseAlarm => {
                log!(info, "alarm");
                self.alarm_restart_timer.reset(now);
                self.alarm.tick(now, true);
            }
            Action::DismissAlarm => {
                self.alarm.stop();
                self.timer = self.timer_start;
                self.renderer.resample_light();
            }
        }
    }

    fn update_outputs(&mut self, now: I) {
        let slow = self.slow_blink.update(now);
        let fast = self.fast_blink.update(now);

        if self.mode == Mode::Alarm {
            let restart = self.alarm_restart_timer.poll(now);
            if restart {
                log!(debug, "alarm ring restart");
            }
            self.alarm.tick(now, restart);
        }

        self.renderer.update_brightness(now);
        self.wall_clock.show_status(slow);

        if self.refresh_timer.poll(now) {
            let frame = self.frame(slow, fast);
            self.renderer.show(frame, self.mode == Mode::Alarm);
        }
    }

    fn frame(&self, slow: bool, fast: bool) -> Frame {
        let clock = self.clock.digits();
        let timer = self.timer.digits();

        match self.mode {
            Mode::Clock => Frame::steady(clock, slow),
            Mode::SetHour => Frame {
                show_left: fast,
                ..Frame::steady(clock, true)
            },
            Mode::SetMinute => Frame {
                show_right: fast,
                ..Frame::steady(clock, true)
            },
            Mode::SetTimer => Frame::steady(timer, true),
            Mode::Countdown => Frame::steady(timer, slow),
            Mode::Alarm => Frame {
                visible: fast,
                ..Frame::steady(timer, true)
            },
        }
    }
}

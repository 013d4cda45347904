//! Build-time tuning constants and the validated [`Config`] built from them.
//!
//! The appliance has no settings menu. Every tunable is fixed at build time;
//! [`Config::builder`] exists so boards and tests can override individual
//! values and have the combination checked once up front.

/// Hold time that turns a press into a long press.
pub const LONG_PRESS_MS: u32 = 3000;
/// Inactivity after which timer editing falls back to the clock.
pub const SET_TIMER_TIMEOUT_MS: u32 = 60_000;
/// Stable time required before a button level change is accepted.
pub const DEBOUNCE_MS: u32 = 30;
/// Raw quadrature pulses per encoder detent.
pub const PULSES_PER_DETENT: u8 = 4;

/// Wall-clock minute.
pub const MINUTE_MS: u32 = 60_000;
/// Countdown tick.
pub const SECOND_MS: u32 = 1000;
/// Milliseconds the monotonic counter loses per hour; subtracted at the top of each hour.
pub const DRIFT_CORRECTION_MS_PER_HOUR: i32 = 360;

/// Display refresh cadence.
pub const DISPLAY_REFRESH_MS: u32 = 50;
/// Colon blink half-period (1 Hz blink).
pub const SLOW_BLINK_MS: u32 = 500;
/// Half-period of the fast blink used while editing and during the alarm.
pub const FAST_BLINK_MS: u32 = 150;

/// Ambient light sampling cadence.
pub const LIGHT_SAMPLE_MS: u32 = 100;
/// Readings above this are "bright".
pub const LIGHT_THRESHOLD: u16 = 500;
/// A new reading must move more than this from the last applied one.
pub const LIGHT_HYSTERESIS: u16 = 10;
/// Brightness used in a dim room.
pub const BRIGHTNESS_MIN: u8 = 1;
/// Brightness used in a bright room and during the alarm.
pub const BRIGHTNESS_MAX: u8 = 7;
/// Highest level the display driver accepts (8 levels, 0..=7).
pub const BRIGHTNESS_LIMIT: u8 = 7;

/// Interval between alarm tone pulses.
pub const ALARM_TONE_CADENCE_MS: u32 = 120;
/// Length of one alarm tone pulse.
pub const ALARM_TONE_DURATION_MS: u16 = 80;
/// Alarm tone pitch.
pub const ALARM_TONE_HZ: u16 = 2700;
/// Volume steps in one burst, loud to quiet.
pub const ALARM_VOLUME_STEPS: u8 = 9;
/// Bursts per alarm ring.
pub const ALARM_BURSTS: u8 = 3;
/// The ring restarts this often while the alarm is active.
pub const ALARM_RESTART_MS: u32 = 10_000;

/// Configuration validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A cadence or timeout was zero.
    ZeroInterval(&'static str),

    /// The encoder would never produce a step.
    ZeroPulsesPerDetent,

    /// Brightness bounds are inverted or above the driver limit.
    InvalidBrightness { min: u8, max: u8 },

    /// The alarm ring would be silent.
    EmptyAlarmPattern,

    /// Drift correction of a minute or more per hour.
    DriftCorrectionTooLarge(i32),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::ZeroInterval(name) => {
                write!(f, "{} must be greater than zero", name)
            }
            ConfigError::ZeroPulsesPerDetent => {
                write!(f, "encoder pulses per detent must be greater than zero")
            }
            ConfigError::InvalidBrightness { min, max } => {
                write!(
                    f,
                    "brightness range {}..={} is invalid (levels are 0..={})",
                    min, max, BRIGHTNESS_LIMIT
                )
            }
            ConfigError::EmptyAlarmPattern => {
                write!(f, "alarm needs at least one burst of at least one volume step")
            }
            ConfigError::DriftCorrectionTooLarge(ms) => {
                write!(f, "drift correction of {}ms per hour is a minute or more", ms)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Validated controller tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub long_press_ms: u32,
    pub set_timer_timeout_ms: u32,
    pub debounce_ms: u32,
    pub pulses_per_detent: u8,
    pub minute_ms: u32,
    pub second_ms: u32,
    pub drift_correction_ms_per_hour: i32,
    pub display_refresh_ms: u32,
    pub slow_blink_ms: u32,
    pub fast_blink_ms: u32,
    pub light_sample_ms: u32,
    pub light_threshold: u16,
    pub light_hysteresis: u16,
    pub brightness_min: u8,
    pub brightness_max: u8,
    pub alarm_tone_cadence_ms: u32,
    pub alarm_tone_duration_ms: u16,
    pub alarm_tone_hz: u16,
    pub alarm_volume_steps: u8,
    pub alarm_bursts: u8,
    pub alarm_restart_ms: u32,
}

impl Config {
    /// Creates a builder seeded with the build-time constants.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            long_press_ms: LONG_PRESS_MS,
            set_timer_timeout_ms: SET_TIMER_TIMEOUT_MS,
            debounce_ms: DEBOUNCE_MS,
            pulses_per_detent: PULSES_PER_DETENT,
            minute_ms: MINUTE_MS,
            second_ms: SECOND_MS,
            drift_correction_ms_per_hour: DRIFT_CORRECTION_MS_PER_HOUR,
            display_refresh_ms: DISPLAY_REFRESH_MS,
            slow_blink_ms: SLOW_BLINK_MS,
            fast_blink_ms: FAST_BLINK_MS,
            light_sample_ms: LIGHT_SAMPLE_MS,
            light_threshold: LIGHT_THRESHOLD,
            light_hysteresis: LIGHT_HYSTERESIS,
            brightness_min: BRIGHTNESS_MIN,
            brightness_max: BRIGHTNESS_MAX,
            alarm_tone_cadence_ms: ALARM_TONE_CADENCE_MS,
            alarm_tone_duration_ms: ALARM_TONE_DURATION_MS,
            alarm_tone_hz: ALARM_TONE_HZ,
            alarm_volume_steps: ALARM_VOLUME_STEPS,
            alarm_bursts: ALARM_BURSTS,
            alarm_restart_ms: ALARM_RESTART_MS,
        }
    }
}

/// Builder for a validated [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a builder holding the build-time defaults.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Sets the long-press hold time.
    pub fn long_press_ms(mut self, ms: u32) -> Self {
        self.config.long_press_ms = ms;
        self
    }

    /// Sets the timer-editing inactivity timeout.
    pub fn set_timer_timeout_ms(mut self, ms: u32) -> Self {
        self.config.set_timer_timeout_ms = ms;
        self
    }

    /// Sets the button debounce window.
    pub fn debounce_ms(mut self, ms: u32) -> Self {
        self.config.debounce_ms = ms;
        self
    }

    /// Sets the encoder quantization.
    pub fn pulses_per_detent(mut self, pulses: u8) -> Self {
        self.config.pulses_per_detent = pulses;
        self
    }

    /// Sets the hourly drift correction. Positive values shorten the first
    /// minute of each hour.
    pub fn drift_correction_ms_per_hour(mut self, ms: i32) -> Self {
        self.config.drift_correction_ms_per_hour = ms;
        self
    }

    /// Sets the ambient light threshold and hysteresis band.
    pub fn light(mut self, threshold: u16, hysteresis: u16) -> Self {
        self.config.light_threshold = threshold;
        self.config.light_hysteresis = hysteresis;
        self
    }

    /// Sets the dim and bright brightness levels.
    pub fn brightness(mut self, min: u8, max: u8) -> Self {
        self.config.brightness_min = min;
        self.config.brightness_max = max;
        self
    }

    /// Sets the alarm burst pattern.
    pub fn alarm_pattern(mut self, bursts: u8, volume_steps: u8, cadence_ms: u32) -> Self {
        self.config.alarm_bursts = bursts;
        self.config.alarm_volume_steps = volume_steps;
        self.config.alarm_tone_cadence_ms = cadence_ms;
        self
    }

    /// Sets how often the alarm ring restarts.
    pub fn alarm_restart_ms(mut self, ms: u32) -> Self {
        self.config.alarm_restart_ms = ms;
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    /// * `ZeroInterval` - A cadence or timeout is zero
    /// * `ZeroPulsesPerDetent` - Encoder quantization is zero
    /// * `InvalidBrightness` - Bounds inverted or above the driver limit
    /// * `EmptyAlarmPattern` - No bursts or no volume steps
    /// * `DriftCorrectionTooLarge` - Correction magnitude of a minute or more
    pub fn build(self) -> Result<Config, ConfigError> {
        let config = self.config;

        let intervals = [
            ("long press", config.long_press_ms),
            ("set timer timeout", config.set_timer_timeout_ms),
            ("minute", config.minute_ms),
            ("second", config.second_ms),
            ("display refresh", config.display_refresh_ms),
            ("slow blink", config.slow_blink_ms),
            ("fast blink", config.fast_blink_ms),
            ("light sample", config.light_sample_ms),
            ("alarm tone cadence", config.alarm_tone_cadence_ms),
            ("alarm restart", config.alarm_restart_ms),
        ];
        if let Some((name, _)) = intervals.iter().find(|(_, ms)| *ms == 0) {
            return Err(ConfigError::ZeroInterval(*name));
        }

        if config.pulses_per_detent == 0 {
            return Err(ConfigError::ZeroPulsesPerDetent);
        }

        if config.brightness_min > config.brightness_max || config.brightness_max > BRIGHTNESS_LIMIT
        {
            return Err(ConfigError::InvalidBrightness {
                min: config.brightness_min,
                max: config.brightness_max,
            });
        }

        if config.alarm_bursts == 0 || config.alarm_volume_steps == 0 {
            return Err(ConfigError::EmptyAlarmPattern);
        }

        if config.drift_correction_ms_per_hour.unsigned_abs() >= config.minute_ms {
            return Err(ConfigError::DriftCorrectionTooLarge(
                config.drift_correction_ms_per_hour,
            ));
        }

        Ok(config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//! HC-SR04 ultrasonic ranger driver.
//!
//! Issues a trigger pulse, then busy-polls the echo line for its rising
//! and falling edges.  Both waits share one deadline measured from the
//! start of the trigger, so a dead sensor costs at most `timeout_us`.
//!
//! ## Dual-target design
//!
//! The driver is generic over `embedded-hal` 1.0 pin and delay traits plus
//! a [`MonotonicClock`].  On the Pi the `rppal` adapter supplies real pins
//! (see `adapters::rpi_gpio`); tests drive it with scripted fakes on a
//! simulated clock.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::{debug, warn};

use crate::config::SystemConfig;
use crate::error::SensorError;

/// Half the speed of sound at ~20 °C, in cm/s.  The echo covers the
/// distance twice.
pub const HALF_SPEED_OF_SOUND_CM_PER_S: f32 = 17_150.0;

/// Trigger line must sit LOW this long before the pulse (µs).
const SETTLE_US: u32 = 2;
/// Trigger pulse width (µs).
const TRIGGER_PULSE_US: u32 = 10;

/// Microsecond time source used for edge timing.
pub trait MonotonicClock {
    fn now_us(&self) -> u64;
}

/// Convert an echo pulse width to a distance.
pub fn pulse_to_cm(pulse_secs: f32) -> f32 {
    pulse_secs * HALF_SPEED_OF_SOUND_CM_PER_S
}

/// One ranging result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeReading {
    pub distance_cm: f32,
    /// `true` when `distance_cm` is the sentinel rather than a measurement.
    pub timed_out: bool,
}

/// HC-SR04 driver.  Never fails: a missed edge or pin fault reads as the
/// sentinel distance.
pub struct UltrasonicRanger<T, E, D, C> {
    trig: T,
    echo: E,
    delay: D,
    clock: C,
    timeout_us: u64,
    sentinel_cm: f32,
    consecutive_timeouts: u32,
    total_timeouts: u64,
}

impl<T, E, D, C> UltrasonicRanger<T, E, D, C>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
    C: MonotonicClock,
{
    pub fn new(trig: T, echo: E, delay: D, clock: C, timeout_us: u32, sentinel_cm: f32) -> Self {
        Self {
            trig,
            echo,
            delay,
            clock,
            timeout_us: u64::from(timeout_us),
            sentinel_cm,
            consecutive_timeouts: 0,
            total_timeouts: 0,
        }
    }

    pub fn from_config(trig: T, echo: E, delay: D, clock: C, config: &SystemConfig) -> Self {
        Self::new(
            trig,
            echo,
            delay,
            clock,
            config.echo_timeout_us,
            config.sentinel_distance_cm,
        )
    }

    /// Measure once, substituting the sentinel on any failure.
    pub fn measure(&mut self) -> RangeReading {
        match self.try_measure() {
            Ok(distance_cm) => {
                self.consecutive_timeouts = 0;
                RangeReading {
                    distance_cm,
                    timed_out: false,
                }
            }
            Err(e) => {
                self.consecutive_timeouts = self.consecutive_timeouts.saturating_add(1);
                self.total_timeouts = self.total_timeouts.saturating_add(1);
                match e {
                    SensorError::PinFault => warn!("Ultrasonic: {e}, reporting sentinel"),
                    SensorError::EchoTimeout => debug!(
                        "Ultrasonic: {e} ({} in a row)",
                        self.consecutive_timeouts
                    ),
                }
                RangeReading {
                    distance_cm: self.sentinel_cm,
                    timed_out: true,
                }
            }
        }
    }

    /// Measure once, reporting why no distance was obtained.
    pub fn try_measure(&mut self) -> Result<f32, SensorError> {
        let start = self.clock.now_us();
        let deadline = start.saturating_add(self.timeout_us);

        self.trig.set_low().map_err(|_| SensorError::PinFault)?;
        self.delay.delay_us(SETTLE_US);
        self.trig.set_high().map_err(|_| SensorError::PinFault)?;
        self.delay.delay_us(TRIGGER_PULSE_US);
        self.trig.set_low().map_err(|_| SensorError::PinFault)?;

        let mut pulse_start = self.clock.now_us();
        while self.echo.is_low().map_err(|_| SensorError::PinFault)? {
            pulse_start = self.clock.now_us();
            if pulse_start > deadline {
                return Err(SensorError::EchoTimeout);
            }
        }

        let mut pulse_end = pulse_start;
        while self.echo.is_high().map_err(|_| SensorError::PinFault)? {
            pulse_end = self.clock.now_us();
            if pulse_end > deadline {
                return Err(SensorError::EchoTimeout);
            }
        }

        let width_us = pulse_end.saturating_sub(pulse_start);
        Ok(pulse_to_cm(width_us as f32 / 1_000_000.0))
    }

    /// Timeouts since the last good reading.
    pub fn consecutive_timeouts(&self) -> u32 {
        self.consecutive_timeouts
    }

    pub fn total_timeouts(&self) -> u64 {
        self.total_timeouts
    }
}

//! Raspberry Pi GPIO wiring for the ultrasonic ranger.
//!
//! `rppal` pins implement the `embedded-hal` 1.0 digital traits and its
//! `Delay` implements `DelayNs`, so the generic driver runs unchanged.
//! Pins are reset to inputs when dropped.

use log::info;
use rppal::gpio::{Gpio, InputPin, OutputPin};
use rppal::hal::Delay;

use super::time::SystemClock;
use crate::config::SystemConfig;
use crate::error::StartupError;
use crate::pins;
use crate::sensors::UltrasonicRanger;

pub type PiRanger = UltrasonicRanger<OutputPin, InputPin, Delay, SystemClock>;

pub fn open_ranger(config: &SystemConfig, clock: SystemClock) -> Result<PiRanger, StartupError> {
    let gpio = Gpio::new().map_err(|e| StartupError::Hardware(format!("GPIO: {e}")))?;
    let trig = gpio
        .get(pins::ULTRASONIC_TRIG_GPIO)
        .map_err(|e| StartupError::Hardware(format!("TRIG GPIO{}: {e}", pins::ULTRASONIC_TRIG_GPIO)))?
        .into_output_low();
    let echo = gpio
        .get(pins::ULTRASONIC_ECHO_GPIO)
        .map_err(|e| StartupError::Hardware(format!("ECHO GPIO{}: {e}", pins::ULTRASONIC_ECHO_GPIO)))?
        .into_input();
    info!(
        "Ultrasonic: TRIG=GPIO{} ECHO=GPIO{} timeout={}us",
        pins::ULTRASONIC_TRIG_GPIO,
        pins::ULTRASONIC_ECHO_GPIO,
        config.echo_timeout_us
    );
    Ok(UltrasonicRanger::from_config(
        trig,
        echo,
        Delay::new(),
        clock,
        config,
    ))
}

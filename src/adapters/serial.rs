//! UART link to the servo controller.

use std::time::Duration;

use log::info;
use serialport::SerialPort;

use crate::config::SystemConfig;
use crate::drivers::SerialActuator;
use crate::error::StartupError;

pub type SerialLink = SerialActuator<Box<dyn SerialPort>>;

/// Open the configured port.  The caller falls back to
/// [`NullChannel`](crate::drivers::NullChannel) on error.
pub fn open_actuator(config: &SystemConfig) -> Result<SerialLink, StartupError> {
    let port = serialport::new(&config.serial_device, config.serial_baud)
        .timeout(Duration::from_millis(config.serial_timeout_ms))
        .open()
        .map_err(|e| StartupError::Hardware(format!("{}: {e}", config.serial_device)))?;
    info!(
        "Serial link to servo controller on {} @ {} baud",
        config.serial_device, config.serial_baud
    );
    Ok(SerialActuator::new(port))
}

//! GPIO / peripheral assignments for the SmartBin controller board.
//!
//! Every adapter references this module rather than
//! hard-coding pin numbers.  Numbers are BCM (Broadcom) GPIO numbers.

// ---------------------------------------------------------------------------
// HC-SR04 ultrasonic ranger
// ---------------------------------------------------------------------------

/// Digital output: 10 µs HIGH pulse starts a measurement.
pub const ULTRASONIC_TRIG_GPIO: u8 = 23;
/// Digital input: HIGH for the duration of the echo round trip.
/// Routed through a 5 V → 3.3 V divider.
pub const ULTRASONIC_ECHO_GPIO: u8 = 24;

// ---------------------------------------------------------------------------
// Actuator link (Maker Feather servo controller)
// ---------------------------------------------------------------------------

/// Primary UART on the 40-pin header (GPIO 14 TX / GPIO 15 RX).
pub const SERIAL_DEVICE: &str = "/dev/serial0";

//! Actuator drivers.

pub mod actuation;

pub use actuation::{NullChannel, SerialActuator, encode_command};

//! Sensor drivers.
//!
//! The bin carries a single ranging sensor over the chute.  Each control
//! tick reads it once through [`RangingPort`](crate::app::ports::RangingPort).

pub mod ultrasonic;

pub use ultrasonic::{MonotonicClock, RangeReading, UltrasonicRanger};

//! Host time adapter.
//!
//! - [`ClockPort`]: wall-clock UNIX seconds for record stamps, and seconds
//!   since construction for cooldowns and telemetry cadence.
//! - [`MonotonicClock`]: microseconds since construction for echo timing.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::app::ports::ClockPort;
use crate::sensors::MonotonicClock;

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Seconds since construction (monotonic).
    pub fn uptime_secs(&self) -> u64 {
        self.start.elapsed().as_secs()
    }
}

impl ClockPort for SystemClock {
    fn now_secs(&self) -> f64 {
        // A clock set before 1970 reads as the epoch.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0.0, |d| d.as_secs_f64())
    }

    fn monotonic_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl MonotonicClock for SystemClock {
    fn now_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

//! Runtime diagnostics.
//!
//! [`RuntimeMetrics`] counts what the control loop absorbed rather than
//! propagated: skipped ticks, sensor timeouts, dropped samples, actuator
//! failures.  The binary logs [`RuntimeMetrics::summary`] on shutdown.

use core::fmt::Write as _;

/// Control-loop counters.  All fields only ever increase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeMetrics {
    /// Ticks that reached the ranging step.
    pub control_cycles: u64,
    /// Ticks skipped because no display frame was available.
    pub skipped_ticks: u64,
    pub sensor_timeouts: u64,
    pub bursts: u64,
    pub accepted: u64,
    pub uncertain: u64,
    /// Burst samples lost to capture or inference failures.
    pub dropped_samples: u64,
    /// Accepted decisions that did not reach the actuator.
    pub actuation_failures: u64,
    /// Telemetry records emitted.
    pub status_reports: u64,
}

impl RuntimeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share of bursts that ended in an accepted decision, in percent.
    pub fn acceptance_rate(&self) -> Option<f32> {
        (self.bursts > 0).then(|| self.accepted as f32 * 100.0 / self.bursts as f32)
    }

    /// One-line report for the log.
    pub fn summary(&self) -> String {
        let mut s = String::with_capacity(160);
        let _ = write!(
            s,
            "cycles={} skipped={} timeouts={} bursts={} accepted={} uncertain={} \
             dropped_samples={} actuation_failures={} reports={}",
            self.control_cycles,
            self.skipped_ticks,
            self.sensor_timeouts,
            self.bursts,
            self.accepted,
            self.uncertain,
            self.dropped_samples,
            self.actuation_failures,
            self.status_reports,
        );
        if let Some(rate) = self.acceptance_rate() {
            let _ = write!(s, " acceptance={rate:.0}%");
        }
        s
    }
}

// ───────────────────────────────────────────────────────────────
// Panic hook
// ───────────────────────────────────────────────────────────────

/// Route panics through the logger before the default hook runs.
///
/// Call once during init, after the logger is installed.
pub fn install_panic_handler() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let reason = if let Some(msg) = info.payload().downcast_ref::<&str>() {
            *msg
        } else if let Some(msg) = info.payload().downcast_ref::<String>() {
            msg.as_str()
        } else {
            "unknown panic"
        };
        match info.location() {
            Some(loc) => log::error!("PANIC at {}:{}: {}", loc.file(), loc.line(), reason),
            None => log::error!("PANIC: {}", reason),
        }
        default_hook(info);
    }));
}

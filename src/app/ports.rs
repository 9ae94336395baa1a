//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (ranger, camera, model runtime, actuator link, clock,
//! event sinks, operator display) implement these traits.  The
//! [`AppService`](super::service::AppService) consumes them via generics,
//! so the domain core never touches hardware directly.

use crate::config::SystemConfig;
use crate::error::{ActuationError, CaptureError, InferenceError};
use crate::fsm::context::Presentation;
use crate::sensors::RangeReading;
use crate::vision::{ClassificationResult, Frame};

// ───────────────────────────────────────────────────────────────
// Ranging port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

pub trait RangingPort {
    /// One bounded measurement.  Never fails; a missed echo reads as the
    /// sentinel with `timed_out` set.
    fn measure(&mut self) -> RangeReading;
}

// ───────────────────────────────────────────────────────────────
// Frame port (driven adapter: camera → domain)
// ───────────────────────────────────────────────────────────────

pub trait FramePort {
    /// Next frame for live display.  `Ok(None)` skips this tick; `Err`
    /// is unrecoverable and stops the loop.
    fn peek(&mut self) -> Result<Option<Frame>, CaptureError>;

    /// Skip up to `n` buffered frames without decoding them.
    fn discard(&mut self, n: usize) -> usize;

    /// One fresh frame for a verification sample.
    fn sample(&mut self) -> Option<Frame>;
}

// ───────────────────────────────────────────────────────────────
// Classifier port
// ───────────────────────────────────────────────────────────────

pub trait ClassifierPort {
    fn classify(&mut self, frame: &Frame) -> Result<ClassificationResult, InferenceError>;
}

// ───────────────────────────────────────────────────────────────
// Actuation channel (driven adapter: domain → servo controller)
// ───────────────────────────────────────────────────────────────

/// Fire-and-forget command link.  Must never block on a missing peer.
pub trait ActuationChannel {
    fn send(&mut self, label: &str) -> Result<(), ActuationError>;

    fn is_connected(&self) -> bool;
}

impl<A: ActuationChannel + ?Sized> ActuationChannel for Box<A> {
    fn send(&mut self, label: &str) -> Result<(), ActuationError> {
        (**self).send(label)
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

pub trait ClockPort {
    /// Wall-clock UNIX seconds.  Only stamps telemetry records; may step
    /// when NTP corrects the clock.
    fn now_secs(&self) -> f64;

    /// Seconds on a clock that never jumps.  Drives cooldown and
    /// telemetry cadence.
    fn monotonic_secs(&self) -> f64;
}

/// Everything one control tick touches on the device side.
pub trait DevicePorts:
    RangingPort + FramePort + ClassifierPort + ActuationChannel + ClockPort
{
}

impl<T> DevicePorts for T where
    T: RangingPort + FramePort + ClassifierPort + ActuationChannel + ClockPort
{
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

/// Fan out to two sinks.
impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn emit(&mut self, event: &super::events::AppEvent) {
        self.0.emit(event);
        self.1.emit(event);
    }
}

/// An absent sink drops events.
impl<S: EventSink> EventSink for Option<S> {
    fn emit(&mut self, event: &super::events::AppEvent) {
        if let Some(sink) = self {
            sink.emit(event);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → operator)
// ───────────────────────────────────────────────────────────────

/// What the operator did since the last frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorInput {
    None,
    Stop,
}

pub trait DisplayPort {
    /// Draw `view` over `frame` and poll for operator input.
    fn render(&mut self, frame: &Frame, view: &Presentation) -> OperatorInput;
}

impl<D: DisplayPort + ?Sized> DisplayPort for Box<D> {
    fn render(&mut self, frame: &Frame, view: &Presentation) -> OperatorInput {
        (**self).render(frame, view)
    }
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Loads system configuration.
///
/// Implementations MUST run [`SystemConfig::validate`] and reject invalid
/// values with [`ConfigError::ValidationFailed`], not clamp them.
pub trait ConfigPort {
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The stored config could not be read.
    Io(String),
    /// The stored config is not valid JSON for [`SystemConfig`].
    Corrupted(String),
    /// A config field failed range validation.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
            Self::Corrupted(msg) => write!(f, "config corrupted: {msg}"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for crate::error::StartupError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

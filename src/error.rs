//! Unified error types for the SmartBin controller.
//!
//! Per-tick faults (`SensorError`, `CaptureError::Unavailable`,
//! `ActuationError`, `InferenceError`) are absorbed by the control loop and
//! only counted and logged.  `StartupError` and the unrecoverable capture
//! variants end the process.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The ranging sensor produced no usable echo.
    Sensor(SensorError),
    /// The camera could not deliver a frame.
    Capture(CaptureError),
    /// The actuator link rejected or could not carry a command.
    Actuation(ActuationError),
    /// The model forward pass failed.
    Inference(InferenceError),
    /// The process cannot start.
    Startup(StartupError),
    /// A runtime configuration update was rejected.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Capture(e) => write!(f, "capture: {e}"),
            Self::Actuation(e) => write!(f, "actuation: {e}"),
            Self::Inference(e) => write!(f, "inference: {e}"),
            Self::Startup(e) => write!(f, "startup: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// No echo edge before the deadline.  Expected; maps to the sentinel.
    EchoTimeout,
    /// A trigger or echo pin operation failed.
    PinFault,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EchoTimeout => write!(f, "echo timeout"),
            Self::PinFault => write!(f, "GPIO pin fault"),
        }
    }
}

impl std::error::Error for SensorError {}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Capture errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The camera returned no frame this time.  Non-fatal.
    Unavailable,
    /// The device went away (unplugged, driver reset).
    Disconnected,
    /// The capture backend reported an error.
    Backend(String),
}

impl CaptureError {
    /// Whether the control loop can keep running after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "frame unavailable"),
            Self::Disconnected => write!(f, "camera disconnected"),
            Self::Backend(msg) => write!(f, "backend error: {msg}"),
        }
    }
}

impl std::error::Error for CaptureError {}

impl From<CaptureError> for Error {
    fn from(e: CaptureError) -> Self {
        Self::Capture(e)
    }
}

// ---------------------------------------------------------------------------
// Actuation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuationError {
    /// No actuator link is connected.
    Unavailable,
    /// The link is connected but the write did not complete.
    WriteFailed,
}

impl fmt::Display for ActuationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "actuator link unavailable"),
            Self::WriteFailed => write!(f, "actuator write failed"),
        }
    }
}

impl std::error::Error for ActuationError {}

impl From<ActuationError> for Error {
    fn from(e: ActuationError) -> Self {
        Self::Actuation(e)
    }
}

// ---------------------------------------------------------------------------
// Inference errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InferenceError {
    /// Output width does not match the label vocabulary.
    OutputMismatch { expected: usize, actual: usize },
    /// The runtime rejected the forward pass.
    Runtime(String),
}

impl fmt::Display for InferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutputMismatch { expected, actual } => {
                write!(f, "expected {expected} class scores, got {actual}")
            }
            Self::Runtime(msg) => write!(f, "runtime: {msg}"),
        }
    }
}

impl std::error::Error for InferenceError {}

impl From<InferenceError> for Error {
    fn from(e: InferenceError) -> Self {
        Self::Inference(e)
    }
}

// ---------------------------------------------------------------------------
// Startup errors (fatal)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupError {
    /// The model file could not be loaded or has an unexpected shape.
    ModelLoad(String),
    /// The label vocabulary could not be read or is unusable.
    VocabularyLoad(String),
    /// Configuration file is unreadable or invalid.
    Config(String),
    /// A peripheral could not be opened.
    Hardware(String),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModelLoad(msg) => write!(f, "model load failed: {msg}"),
            Self::VocabularyLoad(msg) => write!(f, "vocabulary load failed: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Hardware(msg) => write!(f, "hardware init: {msg}"),
        }
    }
}

impl std::error::Error for StartupError {}

impl From<StartupError> for Error {
    fn from(e: StartupError) -> Self {
        Self::Startup(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  The two telemetry records
//! are serialised verbatim for the downstream relay, so their field names
//! are part of the wire contract.

use serde::{Deserialize, Serialize};

use crate::error::ActuationError;
use crate::fsm::StateId;
use crate::vision::Decision;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The application service has started (carries initial state).
    Started(StateId),

    /// The FSM moved during a tick.
    StateChanged { from: StateId, to: StateId },

    /// Periodic fill-level report.
    BinStatus(BinStatusRecord),

    /// A verification burst finished.
    BurstCompleted {
        decision: Decision,
        votes_cast: usize,
        dropped: u8,
    },

    /// Outcome of the routing step for a finished burst.
    Actuation(ActuationRecord),

    /// An accepted label could not be delivered.
    ActuationFailed { label: String, error: ActuationError },

    /// The loop was asked to stop.
    Stopped,
}

/// Distance reading as stored in the `bin_status` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinStatusRecord {
    pub device_id: String,
    pub distance_cm: f32,
    /// UNIX seconds.
    pub timestamp: f64,
}

/// Routing outcome as stored in the `servo_actions` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActuationRecord {
    /// Accepted label, or `"unknown"` for an uncertain burst.
    pub bin_type: String,
    /// The command reached the actuator link.
    pub opened: bool,
    /// UNIX seconds.
    pub timestamp: f64,
}

impl ActuationRecord {
    pub const UNKNOWN_BIN: &'static str = "unknown";
}

//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (stderr through `env_logger` on the device).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::vision::Decision;

/// Adapter that logs every [`AppEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::BinStatus(r) => {
                info!(
                    "TELEM | device={} | distance={:.1}cm | t={:.0}",
                    r.device_id, r.distance_cm, r.timestamp
                );
            }
            AppEvent::BurstCompleted {
                decision,
                votes_cast,
                dropped,
            } => {
                let outcome = match decision {
                    Decision::Accepted(label) => label.to_uppercase(),
                    Decision::Uncertain => String::from("UNCERTAIN"),
                };
                info!(
                    "BURST | {} | classified={} dropped={}",
                    outcome, votes_cast, dropped
                );
            }
            AppEvent::Actuation(r) => {
                info!("SERVO | bin={} opened={}", r.bin_type, r.opened);
            }
            AppEvent::ActuationFailed { label, error } => {
                warn!("SERVO | {} not sent: {}", label, error);
            }
            AppEvent::Stopped => {
                info!("STOP");
            }
        }
    }
}

//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (operator
//! window, supervisor process, tests) that the
//! [`AppService`](super::service::AppService) interprets and acts upon.

use crate::config::SystemConfig;
use crate::fsm::StateId;

#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Stop the control loop after the current tick.
    Shutdown,

    /// Hot-reload the detection window, vote policy, burst shape, cooldown,
    /// telemetry cadence and device id.  Rejected if it fails validation or
    /// changes a peripheral setting (ranger timing, model, camera, serial
    /// link, telemetry file).
    UpdateConfig(SystemConfig),

    /// Force the FSM into a specific state (debug / testing only).
    ForceState(StateId),

    /// Forget the last decision time so the next detection verifies
    /// immediately.
    ResetCooldown,
}

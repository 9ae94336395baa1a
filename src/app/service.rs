//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the FSM, its shared context and the verification
//! engine.  All I/O flows through port traits injected at call sites,
//! making the whole control loop testable with mock adapters.
//!
//! ```text
//!   RangingPort ──▶ ┌─────────────────────────┐ ──▶ EventSink
//!   FramePort   ──▶ │       AppService         │ ──▶ DisplayPort
//! ClassifierPort ──▶│  FSM · Verification      │ ──▶ ActuationChannel
//!   ClockPort   ──▶ └─────────────────────────┘
//! ```

use log::{debug, error, info, warn};

use crate::config::SystemConfig;
use crate::diagnostics::RuntimeMetrics;
use crate::error::{Error, Result};
use crate::fsm::context::{FsmContext, Presentation};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::vision::{Decision, Frame, VerificationEngine};

use super::commands::AppCommand;
use super::events::{ActuationRecord, AppEvent, BinStatusRecord};
use super::ports::{DevicePorts, DisplayPort, EventSink, OperatorInput};

/// What one call to [`AppService::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No display frame; nothing else ran.
    Skipped,
    Continue,
    /// The loop should end (operator stop or `Shutdown`).
    Stopped,
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

pub struct AppService {
    fsm: Fsm,
    ctx: FsmContext,
    engine: VerificationEngine,
    metrics: RuntimeMetrics,
    running: bool,
    last_status_at: Option<f64>,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM; call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Self {
        let engine = VerificationEngine::from_config(&config);
        Self {
            fsm: Fsm::new(build_state_table(), StateId::Idle),
            ctx: FsmContext::new(config),
            engine,
            metrics: RuntimeMetrics::new(),
            running: false,
            last_status_at: None,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        self.running = true;
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!(
            "AppService started in {:?}, waiting for object within {}cm",
            self.fsm.current_state(),
            self.ctx.config.full_threshold_cm
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle:
    /// frame → range → FSM → (burst → actuate) → telemetry → display.
    ///
    /// `hw` satisfies every device port at once, which avoids juggling
    /// several mutable borrows of the same adapter.  An unrecoverable
    /// capture fault is the only error returned.
    pub fn tick(
        &mut self,
        hw: &mut impl DevicePorts,
        sink: &mut impl EventSink,
        display: &mut impl DisplayPort,
    ) -> Result<TickOutcome> {
        if !self.running {
            return Ok(TickOutcome::Stopped);
        }

        // 1. Display frame.  Without one the whole tick is skipped.
        let frame = match hw.peek() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                self.metrics.skipped_ticks += 1;
                debug!("Tick skipped: no frame");
                return Ok(TickOutcome::Skipped);
            }
            Err(e) => {
                error!("Camera fault, stopping: {e}");
                self.running = false;
                return Err(Error::Capture(e));
            }
        };
        self.metrics.control_cycles += 1;

        // 2. Range
        let reading = hw.measure();
        if reading.timed_out {
            self.metrics.sensor_timeouts += 1;
        }
        let now = hw.monotonic_secs();
        self.ctx.observe(reading, now);

        // 3. FSM
        let prev_state = self.fsm.current_state();
        self.fsm.tick(&mut self.ctx);

        // 4. Burst, if the FSM asked for one
        if self.fsm.current_state() == StateId::Verifying && !self.ctx.has_pending_burst() {
            self.run_burst(hw, sink, display, &frame);
            self.fsm.resume(&mut self.ctx);
        }

        let new_state = self.fsm.current_state();
        if new_state != prev_state {
            sink.emit(&AppEvent::StateChanged {
                from: prev_state,
                to: new_state,
            });
        }

        // 5. Telemetry
        self.report_status_if_due(now, hw.now_secs(), sink);

        // 6. Operator display
        if display.render(&frame, &self.ctx.presentation) == OperatorInput::Stop {
            self.handle_command(AppCommand::Shutdown, sink)?;
            return Ok(TickOutcome::Stopped);
        }
        Ok(TickOutcome::Continue)
    }

    // ── Command handling ──────────────────────────────────────

    pub fn handle_command(&mut self, cmd: AppCommand, sink: &mut impl EventSink) -> Result<()> {
        match cmd {
            AppCommand::Shutdown => {
                if self.running {
                    self.running = false;
                    info!("Shutdown requested");
                    sink.emit(&AppEvent::Stopped);
                }
            }
            AppCommand::UpdateConfig(new_config) => {
                new_config.validate().map_err(Error::Config)?;
                self.ctx
                    .config
                    .check_runtime_update(&new_config)
                    .map_err(Error::Config)?;
                self.engine = VerificationEngine::from_config(&new_config);
                self.ctx.config = new_config;
                info!("Configuration updated at runtime");
            }
            AppCommand::ForceState(target) => {
                let prev = self.fsm.current_state();
                self.fsm.force_transition(target, &mut self.ctx);
                if prev != target {
                    sink.emit(&AppEvent::StateChanged {
                        from: prev,
                        to: target,
                    });
                }
            }
            AppCommand::ResetCooldown => {
                self.ctx.cooldown.reset();
                info!("Cooldown reset");
            }
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn tick_count(&self) -> u64 {
        self.fsm.tick_count()
    }

    /// Monotonic time the last burst finished.
    pub fn last_decision_at(&self) -> Option<f64> {
        self.ctx.cooldown.last_decision_at()
    }

    pub fn last_decision(&self) -> Option<&Decision> {
        self.ctx.last_decision.as_ref()
    }

    pub fn presentation(&self) -> &Presentation {
        &self.ctx.presentation
    }

    pub fn metrics(&self) -> &RuntimeMetrics {
        &self.metrics
    }

    pub fn current_config(&self) -> SystemConfig {
        self.ctx.config.clone()
    }

    // ── Internal ──────────────────────────────────────────────

    /// One blocking burst: show VERIFYING, vote, actuate, record.
    fn run_burst(
        &mut self,
        hw: &mut impl DevicePorts,
        sink: &mut impl EventSink,
        display: &mut impl DisplayPort,
        frame: &Frame,
    ) {
        // Push VERIFYING to the operator before blocking on the burst.
        display.render(frame, &self.ctx.presentation);

        let report = self.engine.verify(hw);
        self.metrics.bursts += 1;
        self.metrics.dropped_samples += u64::from(report.dropped);

        let opened = match &report.decision {
            Decision::Accepted(label) => {
                self.metrics.accepted += 1;
                match hw.send(label) {
                    Ok(()) => true,
                    Err(e) => {
                        self.metrics.actuation_failures += 1;
                        warn!("Actuation of {label} skipped: {e}");
                        sink.emit(&AppEvent::ActuationFailed {
                            label: label.clone(),
                            error: e,
                        });
                        false
                    }
                }
            }
            Decision::Uncertain => {
                self.metrics.uncertain += 1;
                false
            }
        };

        let completed_at = hw.monotonic_secs();
        sink.emit(&AppEvent::BurstCompleted {
            decision: report.decision.clone(),
            votes_cast: report.samples.len(),
            dropped: report.dropped,
        });
        sink.emit(&AppEvent::Actuation(ActuationRecord {
            bin_type: report
                .decision
                .label()
                .unwrap_or(ActuationRecord::UNKNOWN_BIN)
                .to_owned(),
            opened,
            timestamp: hw.now_secs(),
        }));

        self.ctx.complete_burst(report.decision, completed_at);
    }

    /// Cadence runs on monotonic `now`; the record carries the wall-clock
    /// `stamp`.
    fn report_status_if_due(&mut self, now: f64, stamp: f64, sink: &mut impl EventSink) {
        let interval = f64::from(self.ctx.config.telemetry_interval_secs);
        let due = self.last_status_at.is_none_or(|last| now - last >= interval);
        if !due {
            return;
        }
        self.last_status_at = Some(now);
        self.metrics.status_reports += 1;
        sink.emit(&AppEvent::BinStatus(BinStatusRecord {
            device_id: self.ctx.config.device_id.clone(),
            distance_cm: self.ctx.sample.distance_cm,
            timestamp: stamp,
        }));
    }
}

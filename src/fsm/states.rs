//! Concrete state handler functions and table builder.
//!
//! ```text
//!  IDLE ──[object in window]──▶ DETECTED ──[cooldown elapsed]──▶ VERIFYING
//!    ▲                             │                                 │
//!    └──────[object gone]──────────┘                          [burst done]
//!    ▲                                                               ▼
//!    └──────────[cooldown elapsed or object gone]─────────────── COOLDOWN
//! ```
//!
//! VERIFYING does not run the burst itself.  The control loop sees the
//! state, runs the burst against the hardware, stores the outcome with
//! [`FsmContext::complete_burst`] and resumes the machine.

use super::context::{DisplayLabel, FsmContext};
use super::{StateDescriptor, StateId};
use crate::vision::Decision;
use log::info;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Idle
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: None,
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1: Detected
        StateDescriptor {
            id: StateId::Detected,
            name: "Detected",
            on_enter: Some(detected_enter),
            on_exit: None,
            on_update: detected_update,
        },
        // Index 2: Verifying
        StateDescriptor {
            id: StateId::Verifying,
            name: "Verifying",
            on_enter: Some(verifying_enter),
            on_exit: None,
            on_update: verifying_update,
        },
        // Index 3: Cooldown
        StateDescriptor {
            id: StateId::Cooldown,
            name: "Cooldown",
            on_enter: Some(cooldown_enter),
            on_exit: None,
            on_update: cooldown_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE
// ═══════════════════════════════════════════════════════════════════════════

fn idle_update(ctx: &mut FsmContext) -> Option<StateId> {
    ctx.object_present().then_some(StateId::Detected)
}

// ═══════════════════════════════════════════════════════════════════════════
//  DETECTED: object at the chute, waiting out any cooldown
// ═══════════════════════════════════════════════════════════════════════════

fn detected_enter(ctx: &mut FsmContext) {
    info!("DETECTED: object at {:.1} cm", ctx.sample.distance_cm);
}

fn detected_update(ctx: &mut FsmContext) -> Option<StateId> {
    if !ctx.object_present() {
        return Some(StateId::Idle);
    }
    if ctx.cooldown_elapsed() {
        return Some(StateId::Verifying);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  VERIFYING: one burst in flight
// ═══════════════════════════════════════════════════════════════════════════

fn verifying_enter(ctx: &mut FsmContext) {
    ctx.pending = None;
    ctx.presentation.item = DisplayLabel::Verifying;
}

fn verifying_update(ctx: &mut FsmContext) -> Option<StateId> {
    let burst = ctx.pending.take()?;

    // Both outcomes rearm the cooldown.
    ctx.cooldown.rearm(burst.completed_at);
    ctx.presentation.item = match &burst.decision {
        Decision::Accepted(label) => DisplayLabel::Accepted(label.clone()),
        Decision::Uncertain => DisplayLabel::Uncertain,
    };
    ctx.last_decision = Some(burst.decision);
    Some(StateId::Cooldown)
}

// ═══════════════════════════════════════════════════════════════════════════
//  COOLDOWN
// ═══════════════════════════════════════════════════════════════════════════

fn cooldown_enter(ctx: &mut FsmContext) {
    info!(
        "COOLDOWN: {} → next burst after {:.1}s",
        ctx.presentation.item.text(),
        ctx.config.cooldown_secs
    );
}

fn cooldown_update(ctx: &mut FsmContext) -> Option<StateId> {
    (!ctx.object_present() || ctx.cooldown_elapsed()).then_some(StateId::Idle)
}

//! Integration tests for the AppService → FSM → burst → actuator pipeline.
//!
//! These run on the host and drive whole control ticks against the
//! scripted [`MockDevice`], checking what reaches the actuator link, the
//! event sinks and the operator display.

use crate::mock_hw::{CollectSink, MockDevice, MockDisplay, PeekScript};

use smartbin::app::commands::AppCommand;
use smartbin::app::events::{ActuationRecord, AppEvent};
use smartbin::app::service::{AppService, TickOutcome};
use smartbin::config::SystemConfig;
use smartbin::error::{ActuationError, CaptureError, Error};
use smartbin::fsm::StateId;
use smartbin::fsm::context::DisplayLabel;
use smartbin::vision::{ClassificationResult, Decision};

const T0: f64 = 1_700_000_000.0;

fn make_app() -> (AppService, CollectSink, MockDisplay) {
    let mut app = AppService::new(SystemConfig::default());
    let mut sink = CollectSink::default();
    app.start(&mut sink);
    (app, sink, MockDisplay::default())
}

fn tick(
    app: &mut AppService,
    hw: &mut MockDevice,
    sink: &mut CollectSink,
    display: &mut MockDisplay,
) -> TickOutcome {
    app.tick(hw, sink, display).expect("tick should not fail")
}

fn actuation_records(sink: &CollectSink) -> Vec<ActuationRecord> {
    sink.events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Actuation(r) => Some(r.clone()),
            _ => None,
        })
        .collect()
}

// ── Detection → burst → actuation ─────────────────────────────

#[test]
fn approaching_object_triggers_exactly_one_burst() {
    let (mut app, mut sink, mut display) = make_app();
    let mut hw = MockDevice::new(T0);
    hw.script_distances(&[25.0, 15.0, 15.0, 15.0]);

    assert_eq!(tick(&mut app, &mut hw, &mut sink, &mut display), TickOutcome::Continue);
    assert_eq!(app.state(), StateId::Idle, "25 cm is outside the window");

    hw.advance(0.05);
    tick(&mut app, &mut hw, &mut sink, &mut display);
    let completed_at = hw.now();
    assert_eq!(app.state(), StateId::Cooldown);
    assert_eq!(hw.sent, vec!["glass".to_owned()]);
    assert_eq!(app.last_decision_at(), Some(completed_at));
    assert_eq!(app.last_decision(), Some(&Decision::Accepted("glass".into())));

    for _ in 0..2 {
        hw.advance(0.05);
        tick(&mut app, &mut hw, &mut sink, &mut display);
    }
    assert_eq!(hw.sent.len(), 1, "object still present inside cooldown");
    assert_eq!(sink.bursts(), 1);
    assert_eq!(hw.discarded, 4, "one flush of the default backlog");

    let records = actuation_records(&sink);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].bin_type, "glass");
    assert!(records[0].opened);
    assert_eq!(records[0].timestamp, completed_at);
}

#[test]
fn display_shows_verifying_before_the_verdict() {
    let (mut app, mut sink, mut display) = make_app();
    let mut hw = MockDevice::new(T0);
    hw.script_distances(&[40.0, 12.0, 12.0]);

    for _ in 0..3 {
        hw.advance(0.05);
        tick(&mut app, &mut hw, &mut sink, &mut display);
    }

    let glass = DisplayLabel::Accepted("glass".into());
    assert_eq!(
        display.items,
        vec![
            DisplayLabel::Ready,
            DisplayLabel::Verifying,
            glass.clone(),
            glass,
        ]
    );
    assert_eq!(app.presentation().item_text(), "ITEM: GLASS");
}

#[test]
fn state_changes_are_reported_per_tick() {
    let (mut app, mut sink, mut display) = make_app();
    let mut hw = MockDevice::new(T0);
    hw.script_distances(&[15.0]);

    tick(&mut app, &mut hw, &mut sink, &mut display);

    // The whole Idle → Detected → Verifying → Cooldown run collapses into
    // one reported change.
    let changes: Vec<_> = sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::StateChanged { .. }))
        .collect();
    assert_eq!(
        changes,
        vec![&AppEvent::StateChanged {
            from: StateId::Idle,
            to: StateId::Cooldown,
        }]
    );
}

// ── Cooldown ──────────────────────────────────────────────────

#[test]
fn redetection_inside_cooldown_waits() {
    let (mut app, mut sink, mut display) = make_app();
    let mut hw = MockDevice::new(T0);
    hw.hold_distance(15.0);

    tick(&mut app, &mut hw, &mut sink, &mut display);
    let done = hw.now();
    assert_eq!(hw.sent.len(), 1);

    // Item removed.
    hw.hold_distance(50.0);
    hw.set_now(done + 1.0);
    tick(&mut app, &mut hw, &mut sink, &mut display);
    assert_eq!(app.state(), StateId::Idle);

    // Next item 3 s after the last decision: detected, not verified.
    hw.hold_distance(15.0);
    hw.set_now(done + 3.0);
    tick(&mut app, &mut hw, &mut sink, &mut display);
    assert_eq!(app.state(), StateId::Detected);
    assert_eq!(hw.sent.len(), 1);

    // 6 s after: verified.
    hw.set_now(done + 6.0);
    tick(&mut app, &mut hw, &mut sink, &mut display);
    assert_eq!(hw.sent.len(), 2);
    assert_eq!(app.state(), StateId::Cooldown);
}

#[test]
fn cooldown_boundary_is_strict() {
    let (mut app, mut sink, mut display) = make_app();
    let mut hw = MockDevice::new(T0);
    hw.secs_per_inference = 0.25;
    hw.hold_distance(15.0);

    tick(&mut app, &mut hw, &mut sink, &mut display);
    let done = hw.now();

    hw.set_now(done + 5.0);
    tick(&mut app, &mut hw, &mut sink, &mut display);
    assert_eq!(app.state(), StateId::Cooldown, "exactly 5 s is not past cooldown");
    assert_eq!(sink.bursts(), 1);

    hw.set_now(done + 5.25);
    tick(&mut app, &mut hw, &mut sink, &mut display);
    assert_eq!(sink.bursts(), 2, "object still present after cooldown re-verifies");
}

#[test]
fn wall_clock_step_forward_does_not_shorten_cooldown() {
    let (mut app, mut sink, mut display) = make_app();
    let mut hw = MockDevice::new(T0);
    hw.hold_distance(15.0);

    tick(&mut app, &mut hw, &mut sink, &mut display);
    assert_eq!(sink.bursts(), 1);

    // One real second later NTP moves the wall clock an hour ahead.
    hw.advance(1.0);
    hw.step_wall_clock(3600.0);
    tick(&mut app, &mut hw, &mut sink, &mut display);
    assert_eq!(sink.bursts(), 1, "still inside the real cooldown");
    assert_eq!(app.state(), StateId::Cooldown);

    hw.advance(5.0);
    tick(&mut app, &mut hw, &mut sink, &mut display);
    assert_eq!(sink.bursts(), 2);
    let records = actuation_records(&sink);
    assert_eq!(
        records[1].timestamp,
        hw.now() + 3600.0,
        "records carry the corrected wall clock"
    );
}

#[test]
fn wall_clock_step_backward_does_not_stall_the_loop() {
    let (mut app, mut sink, mut display) = make_app();
    let mut hw = MockDevice::new(T0);
    hw.hold_distance(15.0);

    tick(&mut app, &mut hw, &mut sink, &mut display);
    hw.step_wall_clock(-3600.0);

    hw.advance(6.0);
    tick(&mut app, &mut hw, &mut sink, &mut display);
    assert_eq!(sink.bursts(), 2, "cooldown measured on the monotonic clock");

    hw.advance(60.0);
    tick(&mut app, &mut hw, &mut sink, &mut display);
    assert_eq!(sink.bin_status_count(), 2, "cadence unaffected by the step");
}

#[test]
fn uncertain_burst_still_rearms_cooldown() {
    let (mut app, mut sink, mut display) = make_app();
    let mut hw = MockDevice::new(T0);
    hw.default_result = ClassificationResult::new("background", 0.99);
    hw.hold_distance(15.0);

    tick(&mut app, &mut hw, &mut sink, &mut display);

    assert!(hw.sent.is_empty());
    assert_eq!(app.last_decision(), Some(&Decision::Uncertain));
    assert_eq!(app.last_decision_at(), Some(hw.now()));
    assert_eq!(app.presentation().item, DisplayLabel::Uncertain);
    let records = actuation_records(&sink);
    assert_eq!(records[0].bin_type, ActuationRecord::UNKNOWN_BIN);
    assert!(!records[0].opened);
    assert_eq!(app.metrics().uncertain, 1);
}

#[test]
fn reset_cooldown_allows_immediate_reverification() {
    let (mut app, mut sink, mut display) = make_app();
    let mut hw = MockDevice::new(T0);
    hw.hold_distance(15.0);

    tick(&mut app, &mut hw, &mut sink, &mut display);
    app.handle_command(AppCommand::ResetCooldown, &mut sink).unwrap();
    hw.advance(0.05);
    tick(&mut app, &mut hw, &mut sink, &mut display);

    assert_eq!(hw.sent.len(), 2);
}

// ── Detection window ──────────────────────────────────────────

#[test]
fn sensor_noise_below_min_range_is_ignored() {
    let (mut app, mut sink, mut display) = make_app();
    let mut hw = MockDevice::new(T0);
    hw.hold_distance(1.9);

    for _ in 0..3 {
        hw.advance(0.05);
        tick(&mut app, &mut hw, &mut sink, &mut display);
    }
    assert_eq!(app.state(), StateId::Idle);
    assert_eq!(sink.bursts(), 0);

    hw.hold_distance(15.0);
    tick(&mut app, &mut hw, &mut sink, &mut display);
    assert_eq!(sink.bursts(), 1);
}

#[test]
fn echo_timeout_never_triggers_a_burst() {
    let (mut app, mut sink, mut display) = make_app();
    let mut hw = MockDevice::new(T0);
    hw.readings.push_back(smartbin::sensors::RangeReading {
        distance_cm: 10.0,
        timed_out: true,
    });

    tick(&mut app, &mut hw, &mut sink, &mut display);

    assert_eq!(app.state(), StateId::Idle);
    assert_eq!(app.metrics().sensor_timeouts, 1);
}

// ── Capture faults ────────────────────────────────────────────

#[test]
fn missing_frame_skips_the_whole_tick() {
    let (mut app, mut sink, mut display) = make_app();
    let mut hw = MockDevice::new(T0);
    hw.peeks.push_back(PeekScript::Nothing);
    hw.script_distances(&[15.0]);

    assert_eq!(tick(&mut app, &mut hw, &mut sink, &mut display), TickOutcome::Skipped);

    assert_eq!(hw.readings.len(), 1, "ranger was not polled");
    assert!(display.items.is_empty());
    assert_eq!(app.tick_count(), 0);
    assert_eq!(app.metrics().skipped_ticks, 1);
    assert!(app.is_running());

    tick(&mut app, &mut hw, &mut sink, &mut display);
    assert_eq!(hw.sent.len(), 1);
}

#[test]
fn camera_disconnect_stops_the_loop() {
    let (mut app, mut sink, mut display) = make_app();
    let mut hw = MockDevice::new(T0);
    hw.peeks.push_back(PeekScript::Fault(CaptureError::Disconnected));

    let err = app.tick(&mut hw, &mut sink, &mut display).unwrap_err();

    assert_eq!(err, Error::Capture(CaptureError::Disconnected));
    assert!(!app.is_running());
    assert_eq!(
        app.tick(&mut hw, &mut sink, &mut display).unwrap(),
        TickOutcome::Stopped
    );
}

// ── Operator + actuator link ──────────────────────────────────

#[test]
fn operator_stop_ends_the_loop() {
    let (mut app, mut sink, mut display) = make_app();
    let mut hw = MockDevice::new(T0);
    display.stop_on_render = Some(2);

    assert_eq!(tick(&mut app, &mut hw, &mut sink, &mut display), TickOutcome::Continue);
    assert_eq!(tick(&mut app, &mut hw, &mut sink, &mut display), TickOutcome::Stopped);

    assert!(!app.is_running());
    assert_eq!(sink.events.last(), Some(&AppEvent::Stopped));
    assert_eq!(tick(&mut app, &mut hw, &mut sink, &mut display), TickOutcome::Stopped);
    assert_eq!(display.items.len(), 2);
}

#[test]
fn unavailable_actuator_link_is_reported_not_fatal() {
    let (mut app, mut sink, mut display) = make_app();
    let mut hw = MockDevice::new(T0);
    hw.connected = false;
    hw.hold_distance(15.0);

    assert_eq!(tick(&mut app, &mut hw, &mut sink, &mut display), TickOutcome::Continue);

    assert!(sink.events.contains(&AppEvent::ActuationFailed {
        label: "glass".into(),
        error: ActuationError::Unavailable,
    }));
    let records = actuation_records(&sink);
    assert_eq!(records[0].bin_type, "glass");
    assert!(!records[0].opened);
    assert_eq!(app.metrics().actuation_failures, 1);
    assert_eq!(
        app.presentation().item,
        DisplayLabel::Accepted("glass".into()),
        "the verdict still reaches the operator"
    );
}

// ── Telemetry cadence ─────────────────────────────────────────

#[test]
fn bin_status_is_reported_once_per_interval() {
    let (mut app, mut sink, mut display) = make_app();
    let mut hw = MockDevice::new(T0);
    hw.hold_distance(42.0);

    for offset in [0.0, 30.0, 60.0, 61.0, 119.0, 120.0] {
        hw.set_now(T0 + offset);
        tick(&mut app, &mut hw, &mut sink, &mut display);
    }

    let stamps: Vec<f64> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::BinStatus(r) => Some(r.timestamp),
            _ => None,
        })
        .collect();
    assert_eq!(stamps, vec![T0, T0 + 60.0, T0 + 120.0]);
    assert_eq!(app.metrics().status_reports, 3);

    let first = sink.events.iter().find_map(|e| match e {
        AppEvent::BinStatus(r) => Some(r.clone()),
        _ => None,
    });
    let first = first.unwrap();
    assert_eq!(first.device_id, "smartbin-01");
    assert_eq!(first.distance_cm, 42.0);
}

// ── Runtime reconfiguration ───────────────────────────────────

#[test]
fn config_update_changes_the_quorum() {
    let (mut app, mut sink, mut display) = make_app();
    let strict = SystemConfig {
        quorum: 5,
        ..SystemConfig::default()
    };
    app.handle_command(AppCommand::UpdateConfig(strict), &mut sink)
        .unwrap();

    let mut hw = MockDevice::new(T0);
    hw.results.push_back(Ok(ClassificationResult::new("plastic", 0.95)));
    hw.hold_distance(15.0);
    tick(&mut app, &mut hw, &mut sink, &mut display);

    assert_eq!(app.last_decision(), Some(&Decision::Uncertain));
    assert!(hw.sent.is_empty());
}

#[test]
fn forced_state_is_reported() {
    let (mut app, mut sink, _display) = make_app();
    app.handle_command(AppCommand::ForceState(StateId::Cooldown), &mut sink)
        .unwrap();
    assert_eq!(app.state(), StateId::Cooldown);
    assert!(sink.events.contains(&AppEvent::StateChanged {
        from: StateId::Idle,
        to: StateId::Cooldown,
    }));
}

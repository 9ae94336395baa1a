//! End-to-end verification through the real adapter composition.
//!
//! [`HardwareAdapter`] wires a [`FramePipeline`] and a [`Classifier`] over
//! stub camera and model backends, so these tests cover flushing,
//! preprocessing, argmax, vocabulary lookup, voting and the actuator wire
//! format together.

use std::cell::Cell;
use std::collections::VecDeque;

use crate::mock_hw::{CollectSink, MockDisplay};

use smartbin::adapters::hardware::HardwareAdapter;
use smartbin::app::events::AppEvent;
use smartbin::app::ports::{ClockPort, RangingPort};
use smartbin::app::service::AppService;
use smartbin::config::SystemConfig;
use smartbin::drivers::{NullChannel, SerialActuator};
use smartbin::error::{CaptureError, InferenceError, StartupError};
use smartbin::sensors::RangeReading;
use smartbin::vision::{
    Classifier, Decision, Frame, FrameGrabber, FramePipeline, InferenceBackend,
    VerificationEngine, Vocabulary,
};

const LABELS: &str = "0 Background\n1 Glass\n2 Paper\n";

// ── Stubs ─────────────────────────────────────────────────────

/// Camera with `backlog` queued frames to flush, then live frames.
struct StubCamera {
    backlog: usize,
}

impl FrameGrabber for StubCamera {
    fn grab(&mut self) -> Result<bool, CaptureError> {
        if self.backlog == 0 {
            return Ok(false);
        }
        self.backlog -= 1;
        Ok(true)
    }

    fn read(&mut self) -> Result<Option<Frame>, CaptureError> {
        Ok(Some(Frame::new(16, 12)))
    }
}

/// Model returning scripted score vectors, then `background` forever.
struct ScriptedModel {
    outputs: VecDeque<Result<Vec<f32>, InferenceError>>,
    inputs_seen: usize,
}

impl ScriptedModel {
    fn new(outputs: Vec<Result<Vec<f32>, InferenceError>>) -> Self {
        Self {
            outputs: outputs.into(),
            inputs_seen: 0,
        }
    }
}

impl InferenceBackend for ScriptedModel {
    fn input_size(&self) -> (u32, u32) {
        (4, 4)
    }

    fn num_classes(&self) -> usize {
        3
    }

    fn forward(&mut self, input: &[f32]) -> Result<Vec<f32>, InferenceError> {
        assert_eq!(input.len(), 4 * 4 * 3, "NHWC input at model size");
        self.inputs_seen += 1;
        self.outputs
            .pop_front()
            .unwrap_or_else(|| Ok(vec![0.98, 0.01, 0.01]))
    }
}

struct FixedRanger(f32);

impl RangingPort for FixedRanger {
    fn measure(&mut self) -> RangeReading {
        RangeReading {
            distance_cm: self.0,
            timed_out: false,
        }
    }
}

struct StillClock(Cell<f64>);

impl ClockPort for StillClock {
    fn now_secs(&self) -> f64 {
        self.0.get()
    }

    fn monotonic_secs(&self) -> f64 {
        self.0.get()
    }
}

fn glass(p: f32) -> Result<Vec<f32>, InferenceError> {
    Ok(vec![(1.0 - p) / 2.0, p, (1.0 - p) / 2.0])
}

fn paper(p: f32) -> Result<Vec<f32>, InferenceError> {
    Ok(vec![(1.0 - p) / 2.0, (1.0 - p) / 2.0, p])
}

fn classifier(outputs: Vec<Result<Vec<f32>, InferenceError>>) -> Classifier<ScriptedModel> {
    let vocab = Vocabulary::parse(LABELS).unwrap();
    Classifier::new(ScriptedModel::new(outputs), vocab).unwrap()
}

// ── Tests ─────────────────────────────────────────────────────

#[test]
fn majority_of_confident_votes_is_accepted() {
    let mut hw = HardwareAdapter::new(
        FixedRanger(15.0),
        FramePipeline::new(StubCamera { backlog: 10 }),
        classifier(vec![
            glass(0.95),
            glass(0.97),
            paper(0.99),
            Ok(vec![0.99, 0.005, 0.005]),
            glass(0.50),
        ]),
        NullChannel,
        StillClock(Cell::new(0.0)),
    );
    let engine = VerificationEngine::from_config(&SystemConfig::default());

    let report = engine.verify(&mut hw);

    assert_eq!(report.decision, Decision::Accepted("glass".into()));
    assert_eq!(report.samples.len(), 5);
    assert_eq!(report.dropped, 0);
    assert_eq!(report.flushed, 4);
    assert_eq!(hw.frames().frames_discarded(), 4);
    assert_eq!(hw.frames().frames_read(), 5);
}

#[test]
fn short_backlog_flushes_what_is_there() {
    let mut hw = HardwareAdapter::new(
        FixedRanger(15.0),
        FramePipeline::new(StubCamera { backlog: 1 }),
        classifier(vec![]),
        NullChannel,
        StillClock(Cell::new(0.0)),
    );
    let report = VerificationEngine::from_config(&SystemConfig::default()).verify(&mut hw);

    assert_eq!(report.flushed, 1);
    assert_eq!(report.decision, Decision::Uncertain, "background never votes");
}

#[test]
fn failed_inferences_are_dropped_not_retried() {
    let mut hw = HardwareAdapter::new(
        FixedRanger(15.0),
        FramePipeline::new(StubCamera { backlog: 0 }),
        classifier(vec![
            glass(0.95),
            Err(InferenceError::Runtime("npu reset".into())),
            Ok(vec![0.1, 0.9]),
            paper(0.92),
            glass(0.93),
        ]),
        NullChannel,
        StillClock(Cell::new(0.0)),
    );
    let report = VerificationEngine::from_config(&SystemConfig::default()).verify(&mut hw);

    assert_eq!(report.dropped, 2, "runtime error and width mismatch");
    assert_eq!(report.samples.len(), 3);
    assert_eq!(report.decision, Decision::Accepted("glass".into()));
}

#[test]
fn vocabulary_must_match_model_width() {
    let vocab = Vocabulary::parse("0 Glass\n1 Paper\n").unwrap();
    let err = Classifier::new(ScriptedModel::new(vec![]), vocab)
        .err()
        .expect("two labels for three outputs");
    assert_eq!(
        err,
        StartupError::VocabularyLoad("model has 3 outputs, vocabulary has 2 labels".into())
    );
}

#[test]
fn accepted_label_goes_out_as_one_line() {
    let mut hw = HardwareAdapter::new(
        FixedRanger(12.0),
        FramePipeline::new(StubCamera { backlog: 4 }),
        classifier(vec![paper(0.96), paper(0.95), paper(0.91)]),
        SerialActuator::new(Vec::new()),
        StillClock(Cell::new(1_700_000_000.0)),
    );
    let mut app = AppService::new(SystemConfig::default());
    let mut sink = CollectSink::default();
    let mut display = MockDisplay::default();
    app.start(&mut sink);

    app.tick(&mut hw, &mut sink, &mut display).unwrap();

    assert_eq!(hw.actuator().get_ref().as_slice(), b"paper\n");
    assert_eq!(hw.actuator().commands_sent(), 1);
    assert!(sink.events.iter().any(|e| matches!(
        e,
        AppEvent::Actuation(r) if r.bin_type == "paper" && r.opened
    )));
}

#[test]
fn null_channel_records_closed_actuation() {
    let mut hw = HardwareAdapter::new(
        FixedRanger(12.0),
        FramePipeline::new(StubCamera { backlog: 4 }),
        classifier(vec![glass(0.99), glass(0.99)]),
        NullChannel,
        StillClock(Cell::new(1_700_000_000.0)),
    );
    let mut app = AppService::new(SystemConfig::default());
    let mut sink = CollectSink::default();
    let mut display = MockDisplay::default();
    app.start(&mut sink);

    app.tick(&mut hw, &mut sink, &mut display).unwrap();

    assert_eq!(app.last_decision(), Some(&Decision::Accepted("glass".into())));
    assert!(sink.events.iter().any(|e| matches!(
        e,
        AppEvent::Actuation(r) if r.bin_type == "glass" && !r.opened
    )));
    assert_eq!(app.metrics().actuation_failures, 1);
}

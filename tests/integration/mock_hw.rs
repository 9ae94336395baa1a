//! Mock device adapter for integration tests.
//!
//! One scripted object stands in for the ranger, camera, classifier,
//! actuator link and clock, and records every actuator command so tests
//! can assert on the full history.

use std::cell::Cell;
use std::collections::VecDeque;

use smartbin::app::events::AppEvent;
use smartbin::app::ports::{
    ActuationChannel, ClassifierPort, ClockPort, DisplayPort, EventSink, FramePort,
    OperatorInput, RangingPort,
};
use smartbin::error::{ActuationError, CaptureError, InferenceError};
use smartbin::fsm::context::{DisplayLabel, Presentation};
use smartbin::sensors::RangeReading;
use smartbin::vision::{ClassificationResult, Frame};

/// Distance the mock reports when its script runs dry and no object
/// was scripted.
pub const EMPTY_BIN_CM: f32 = 60.0;

/// What the next display peek returns.
#[derive(Debug, Clone, PartialEq)]
pub enum PeekScript {
    Frame,
    Nothing,
    Fault(CaptureError),
}

// ── MockDevice ────────────────────────────────────────────────

pub struct MockDevice {
    /// Readings consumed one per `measure`; the last one repeats.
    pub readings: VecDeque<RangeReading>,
    last_reading: RangeReading,
    /// Peek outcomes consumed one per tick; afterwards every peek yields a frame.
    pub peeks: VecDeque<PeekScript>,
    /// Results consumed one per classification; afterwards `default_result` repeats.
    pub results: VecDeque<Result<ClassificationResult, InferenceError>>,
    pub default_result: ClassificationResult,
    /// Number of upcoming sample captures that fail.
    pub failing_samples: usize,
    pub connected: bool,
    pub sent: Vec<String>,
    pub discarded: usize,
    now: Cell<f64>,
    /// Wall clock minus monotonic clock; changes when NTP steps the clock.
    wall_offset: Cell<f64>,
    /// Clock advance per classification, so bursts take measurable time.
    pub secs_per_inference: f64,
}

#[allow(dead_code)]
impl MockDevice {
    pub fn new(start_secs: f64) -> Self {
        let idle = reading(EMPTY_BIN_CM);
        Self {
            readings: VecDeque::new(),
            last_reading: idle,
            peeks: VecDeque::new(),
            results: VecDeque::new(),
            default_result: ClassificationResult::new("glass", 0.97),
            failing_samples: 0,
            connected: true,
            sent: Vec::new(),
            discarded: 0,
            now: Cell::new(start_secs),
            wall_offset: Cell::new(0.0),
            secs_per_inference: 0.1,
        }
    }

    /// Queue distances (cm), one per tick.
    pub fn script_distances(&mut self, distances: &[f32]) {
        self.readings.extend(distances.iter().copied().map(reading));
    }

    /// Hold one distance for every following tick.
    pub fn hold_distance(&mut self, cm: f32) {
        self.readings.clear();
        self.last_reading = reading(cm);
    }

    pub fn set_now(&self, secs: f64) {
        self.now.set(secs);
    }

    pub fn advance(&self, secs: f64) {
        self.now.set(self.now.get() + secs);
    }

    /// Monotonic time.
    pub fn now(&self) -> f64 {
        self.now.get()
    }

    /// Step the wall clock only, as an NTP correction does.
    pub fn step_wall_clock(&self, secs: f64) {
        self.wall_offset.set(self.wall_offset.get() + secs);
    }
}

pub fn reading(cm: f32) -> RangeReading {
    RangeReading {
        distance_cm: cm,
        timed_out: false,
    }
}

pub fn blank_frame() -> Frame {
    Frame::new(8, 6)
}

impl RangingPort for MockDevice {
    fn measure(&mut self) -> RangeReading {
        if let Some(next) = self.readings.pop_front() {
            self.last_reading = next;
        }
        self.last_reading
    }
}

impl FramePort for MockDevice {
    fn peek(&mut self) -> Result<Option<Frame>, CaptureError> {
        match self.peeks.pop_front().unwrap_or(PeekScript::Frame) {
            PeekScript::Frame => Ok(Some(blank_frame())),
            PeekScript::Nothing => Ok(None),
            PeekScript::Fault(e) => Err(e),
        }
    }

    fn discard(&mut self, n: usize) -> usize {
        self.discarded += n;
        n
    }

    fn sample(&mut self) -> Option<Frame> {
        if self.failing_samples > 0 {
            self.failing_samples -= 1;
            return None;
        }
        Some(blank_frame())
    }
}

impl ClassifierPort for MockDevice {
    fn classify(&mut self, _frame: &Frame) -> Result<ClassificationResult, InferenceError> {
        self.advance(self.secs_per_inference);
        self.results
            .pop_front()
            .unwrap_or_else(|| Ok(self.default_result.clone()))
    }
}

impl ActuationChannel for MockDevice {
    fn send(&mut self, label: &str) -> Result<(), ActuationError> {
        if !self.connected {
            return Err(ActuationError::Unavailable);
        }
        self.sent.push(label.to_owned());
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

impl ClockPort for MockDevice {
    fn now_secs(&self) -> f64 {
        self.now.get() + self.wall_offset.get()
    }

    fn monotonic_secs(&self) -> f64 {
        self.now.get()
    }
}

// ── MockDisplay ───────────────────────────────────────────────

#[derive(Default)]
pub struct MockDisplay {
    /// Item label of every rendered frame, in order.
    pub items: Vec<DisplayLabel>,
    /// Return `Stop` on this render (1-based).
    pub stop_on_render: Option<usize>,
}

impl DisplayPort for MockDisplay {
    fn render(&mut self, _frame: &Frame, view: &Presentation) -> OperatorInput {
        self.items.push(view.item.clone());
        if self.stop_on_render == Some(self.items.len()) {
            OperatorInput::Stop
        } else {
            OperatorInput::None
        }
    }
}

// ── CollectSink ───────────────────────────────────────────────

#[derive(Default)]
pub struct CollectSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl CollectSink {
    pub fn bin_status_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::BinStatus(_)))
            .count()
    }

    pub fn bursts(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::BurstCompleted { .. }))
            .count()
    }
}

impl EventSink for CollectSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

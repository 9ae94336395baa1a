//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the ranger, the frame pipeline, the classifier, the actuator link
//! and the clock, exposing them through the device ports.  Each part is a
//! type parameter so the same composition runs on the Pi and in tests.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::app::ports::{ActuationChannel, ClassifierPort, ClockPort, FramePort, RangingPort};
use crate::error::{ActuationError, CaptureError, InferenceError};
use crate::sensors::{MonotonicClock, RangeReading, UltrasonicRanger};
use crate::vision::{
    ClassificationResult, Classifier, Frame, FrameGrabber, FramePipeline, InferenceBackend,
};

/// Concrete adapter that combines all device hardware behind port traits.
pub struct HardwareAdapter<R, G, B, A, C> {
    ranger: R,
    frames: FramePipeline<G>,
    classifier: Classifier<B>,
    actuator: A,
    clock: C,
}

impl<R, G, B, A, C> HardwareAdapter<R, G, B, A, C>
where
    R: RangingPort,
    G: FrameGrabber,
    B: InferenceBackend,
    A: ActuationChannel,
    C: ClockPort,
{
    pub fn new(
        ranger: R,
        frames: FramePipeline<G>,
        classifier: Classifier<B>,
        actuator: A,
        clock: C,
    ) -> Self {
        Self {
            ranger,
            frames,
            classifier,
            actuator,
            clock,
        }
    }

    pub fn frames(&self) -> &FramePipeline<G> {
        &self.frames
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }
}

// ── RangingPort for the HC-SR04 driver ────────────────────────

impl<T, E, D, K> RangingPort for UltrasonicRanger<T, E, D, K>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
    K: MonotonicClock,
{
    fn measure(&mut self) -> RangeReading {
        UltrasonicRanger::measure(self)
    }
}

// ── Port delegation ───────────────────────────────────────────

impl<R: RangingPort, G, B, A, C> RangingPort for HardwareAdapter<R, G, B, A, C> {
    fn measure(&mut self) -> RangeReading {
        self.ranger.measure()
    }
}

impl<R, G: FrameGrabber, B, A, C> FramePort for HardwareAdapter<R, G, B, A, C> {
    fn peek(&mut self) -> Result<Option<Frame>, CaptureError> {
        self.frames.peek()
    }

    fn discard(&mut self, n: usize) -> usize {
        self.frames.discard(n)
    }

    fn sample(&mut self) -> Option<Frame> {
        self.frames.sample()
    }
}

impl<R, G, B: InferenceBackend, A, C> ClassifierPort for HardwareAdapter<R, G, B, A, C> {
    fn classify(&mut self, frame: &Frame) -> Result<ClassificationResult, InferenceError> {
        self.classifier.classify(frame)
    }
}

impl<R, G, B, A: ActuationChannel, C> ActuationChannel for HardwareAdapter<R, G, B, A, C> {
    fn send(&mut self, label: &str) -> Result<(), ActuationError> {
        self.actuator.send(label)
    }

    fn is_connected(&self) -> bool {
        self.actuator.is_connected()
    }
}

impl<R, G, B, A, C: ClockPort> ClockPort for HardwareAdapter<R, G, B, A, C> {
    fn now_secs(&self) -> f64 {
        self.clock.now_secs()
    }

    fn monotonic_secs(&self) -> f64 {
        self.clock.monotonic_secs()
    }
}

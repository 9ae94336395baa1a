//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to: the latest distance sample, the cooldown timer, the outcome
//! of a finished burst waiting to be consumed, operator presentation and
//! configuration.  The control loop writes the sample before each tick and
//! hands in burst results; handlers never touch hardware.

use crate::config::SystemConfig;
use crate::sensors::RangeReading;
use crate::vision::Decision;

// ---------------------------------------------------------------------------
// Distance sample (written by the control loop each tick)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceSample {
    pub distance_cm: f32,
    /// Monotonic seconds (see [`ClockPort::monotonic_secs`]).
    ///
    /// [`ClockPort::monotonic_secs`]: crate::app::ports::ClockPort::monotonic_secs
    pub at: f64,
    /// `distance_cm` is the no-echo sentinel.
    pub timed_out: bool,
}

impl Default for DistanceSample {
    fn default() -> Self {
        Self {
            distance_cm: f32::INFINITY,
            at: 0.0,
            timed_out: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Cooldown
// ---------------------------------------------------------------------------

/// Time of the last completed burst.  Only rearmed after a burst ends.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CooldownTimer {
    last_decision_at: Option<f64>,
}

impl CooldownTimer {
    /// Strictly more than `cooldown_secs` since the last decision.  True
    /// when no decision has been made yet.
    pub fn elapsed(&self, now: f64, cooldown_secs: f64) -> bool {
        self.last_decision_at
            .is_none_or(|last| now - last > cooldown_secs)
    }

    pub fn rearm(&mut self, at: f64) {
        self.last_decision_at = Some(at);
    }

    pub fn reset(&mut self) {
        self.last_decision_at = None;
    }

    pub fn last_decision_at(&self) -> Option<f64> {
        self.last_decision_at
    }
}

// ---------------------------------------------------------------------------
// Presentation (operator feedback only; never read by transitions)
// ---------------------------------------------------------------------------

/// Colour triple in OpenCV's BGR order.
pub type Bgr = (u8, u8, u8);

pub const WHITE: Bgr = (255, 255, 255);
pub const GREY: Bgr = (200, 200, 200);
pub const YELLOW: Bgr = (0, 255, 255);
pub const GREEN: Bgr = (0, 255, 0);
pub const RED: Bgr = (0, 0, 255);

/// What the item line shows.  Persists until the next burst.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DisplayLabel {
    #[default]
    Ready,
    Verifying,
    Accepted(String),
    Uncertain,
}

impl DisplayLabel {
    pub fn text(&self) -> String {
        match self {
            Self::Ready => String::from("READY"),
            Self::Verifying => String::from("VERIFYING..."),
            Self::Accepted(label) => label.to_uppercase(),
            Self::Uncertain => String::from("UNCERTAIN"),
        }
    }

    pub fn colour(&self) -> Bgr {
        match self {
            Self::Ready => WHITE,
            Self::Verifying => YELLOW,
            Self::Accepted(_) => GREEN,
            Self::Uncertain => RED,
        }
    }
}

/// Sensor status line.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum StatusLine {
    /// No reading yet.
    #[default]
    Checking,
    Detected(f32),
    Clear(f32),
}

impl StatusLine {
    pub fn text(&self) -> String {
        match *self {
            Self::Checking => String::from("Checking..."),
            Self::Detected(cm) => format!("STATUS: DETECTED ({}cm)", cm as i32),
            Self::Clear(cm) => format!("STATUS: CLEAR ({}cm)", cm as i32),
        }
    }

    pub fn colour(&self) -> Bgr {
        match self {
            Self::Checking => GREY,
            Self::Detected(_) => RED,
            Self::Clear(_) => GREEN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Presentation {
    pub item: DisplayLabel,
    pub status: StatusLine,
}

impl Presentation {
    pub fn item_text(&self) -> String {
        format!("ITEM: {}", self.item.text())
    }
}

// ---------------------------------------------------------------------------
// Finished burst awaiting the Verifying handler
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CompletedBurst {
    pub decision: Decision,
    /// Monotonic seconds at which the burst (and any actuation) finished.
    pub completed_at: f64,
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Timing --
    /// Ticks elapsed since the current state was entered.
    pub ticks_in_state: u64,
    /// Monotonic total tick count.
    pub total_ticks: u64,

    // -- Inputs --
    /// Latest ranging result.  Updated before each FSM tick.
    pub sample: DistanceSample,
    /// Set by the control loop when a burst finishes; consumed by the
    /// Verifying handler.
    pub pending: Option<CompletedBurst>,

    // -- Decision state --
    pub cooldown: CooldownTimer,
    pub last_decision: Option<Decision>,

    // -- Outputs --
    pub presentation: Presentation,

    // -- Configuration --
    pub config: SystemConfig,
}

impl FsmContext {
    pub fn new(config: SystemConfig) -> Self {
        Self {
            ticks_in_state: 0,
            total_ticks: 0,
            sample: DistanceSample::default(),
            pending: None,
            cooldown: CooldownTimer::default(),
            last_decision: None,
            presentation: Presentation::default(),
            config,
        }
    }

    /// Record this tick's ranging result and refresh the status line.
    pub fn observe(&mut self, reading: RangeReading, at: f64) {
        self.sample = DistanceSample {
            distance_cm: reading.distance_cm,
            at,
            timed_out: reading.timed_out,
        };
        let cm = reading.distance_cm;
        self.presentation.status = if self.object_present() {
            StatusLine::Detected(cm)
        } else {
            StatusLine::Clear(cm)
        };
    }

    /// An object sits in the detection window `(min_range, full_threshold)`.
    /// The timeout sentinel never counts.
    pub fn object_present(&self) -> bool {
        let d = self.sample.distance_cm;
        !self.sample.timed_out && d > self.config.min_range_cm && d < self.config.full_threshold_cm
    }

    /// Cooldown measured against the latest sample time.
    pub fn cooldown_elapsed(&self) -> bool {
        self.cooldown
            .elapsed(self.sample.at, self.config.cooldown_secs)
    }

    /// Hand a finished burst to the Verifying handler.
    pub fn complete_burst(&mut self, decision: Decision, completed_at: f64) {
        self.pending = Some(CompletedBurst {
            decision,
            completed_at,
        });
    }

    pub fn has_pending_burst(&self) -> bool {
        self.pending.is_some()
    }
}

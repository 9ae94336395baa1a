//! System configuration parameters
//!
//! All tunable parameters for the SmartBin edge controller.
//! Values can be overridden from a JSON file through a [`ConfigPort`]
//! adapter; anything absent from the file keeps its default.
//!
//! [`ConfigPort`]: crate::app::ports::ConfigPort

use serde::{Deserialize, Serialize};

use crate::pins;
use crate::vision::ChannelOrder;

/// Upper bound on samples per verification burst.  Sizes the fixed-capacity
/// tally and sample buffers in [`crate::vision::verification`].
pub const MAX_SAMPLES: usize = 16;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Identity ---
    /// Device identifier stamped on bin-status telemetry
    pub device_id: String,

    // --- Detection ---
    /// Readings at or below this distance (cm) are treated as sensor self-noise
    pub min_range_cm: f32,
    /// Readings below this distance (cm) mean an object sits at the chute
    pub full_threshold_cm: f32,
    /// Echo wait deadline measured from the start of the trigger pulse (µs)
    pub echo_timeout_us: u32,
    /// Distance reported when no echo edge is observed in time (cm)
    pub sentinel_distance_cm: f32,

    // --- Verification ---
    /// Minimum time between the end of one burst and the start of the next (s)
    pub cooldown_secs: f64,
    /// Per-sample probability required for a vote to count (0–1]
    pub confidence_threshold: f32,
    /// Matching votes required to accept a label
    pub quorum: u8,
    /// Fresh samples drawn per burst
    pub sample_count: u8,
    /// Buffered frames skipped before a burst starts
    pub flush_frames: u8,
    /// Model label that never counts as a vote
    pub background_label: String,

    // --- Model ---
    /// Path to the classifier model
    pub model_path: String,
    /// Path to the newline-delimited label vocabulary
    pub labels_path: String,
    /// Model input width (px)
    pub model_input_width: u32,
    /// Model input height (px)
    pub model_input_height: u32,
    /// Channel order the model expects ("rgb" or "bgr")
    pub model_channel_order: ChannelOrder,

    // --- Camera ---
    pub camera_index: i32,
    pub camera_width: u32,
    pub camera_height: u32,
    pub camera_fps: u32,
    /// Show the operator window (disable for headless installs)
    pub show_window: bool,

    // --- Actuator link ---
    pub serial_device: String,
    pub serial_baud: u32,
    /// Read timeout configured when the port is opened (ms)
    pub serial_timeout_ms: u64,

    // --- Telemetry ---
    /// Bin-status report interval (seconds)
    pub telemetry_interval_secs: u32,
    /// Append telemetry records as JSON lines here (None = log only)
    pub telemetry_path: Option<String>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            device_id: String::from("smartbin-01"),

            // Detection
            min_range_cm: 2.0,
            full_threshold_cm: 20.0,
            echo_timeout_us: 40_000, // 40 ms
            sentinel_distance_cm: 100.0,

            // Verification
            cooldown_secs: 5.0,
            confidence_threshold: 0.90,
            quorum: 2,
            sample_count: 5,
            flush_frames: 4,
            background_label: String::from("background"),

            // Model
            model_path: String::from("model_unquant.onnx"),
            labels_path: String::from("labels.txt"),
            model_input_width: 224,
            model_input_height: 224,
            model_channel_order: ChannelOrder::Rgb,

            // Camera
            camera_index: 0,
            camera_width: 640,
            camera_height: 480,
            camera_fps: 30,
            show_window: true,

            // Actuator link
            serial_device: String::from(pins::SERIAL_DEVICE),
            serial_baud: 115_200,
            serial_timeout_ms: 1000,

            // Telemetry
            telemetry_interval_secs: 60, // 1/min
            telemetry_path: None,
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.device_id.trim().is_empty() {
            return Err("device_id must not be empty");
        }
        if !(self.min_range_cm >= 0.0) {
            return Err("min_range_cm must be >= 0");
        }
        if !(self.full_threshold_cm > self.min_range_cm) {
            return Err("full_threshold_cm must be above min_range_cm");
        }
        if self.echo_timeout_us == 0 {
            return Err("echo_timeout_us must be > 0");
        }
        if !(self.cooldown_secs > 0.0) {
            return Err("cooldown_secs must be > 0");
        }
        if !(self.confidence_threshold > 0.0 && self.confidence_threshold <= 1.0) {
            return Err("confidence_threshold must be in (0, 1]");
        }
        if self.sample_count == 0 || self.sample_count as usize > MAX_SAMPLES {
            return Err("sample_count must be in 1..=MAX_SAMPLES");
        }
        if self.quorum == 0 || self.quorum > self.sample_count {
            return Err("quorum must be in 1..=sample_count");
        }
        if self.model_input_width == 0 || self.model_input_height == 0 {
            return Err("model input dimensions must be > 0");
        }
        if self.camera_width == 0 || self.camera_height == 0 || self.camera_fps == 0 {
            return Err("camera dimensions and fps must be > 0");
        }
        if self.serial_baud == 0 {
            return Err("serial_baud must be > 0");
        }
        if self.telemetry_interval_secs == 0 {
            return Err("telemetry_interval_secs must be > 0");
        }
        Ok(())
    }

    /// Reject a runtime update that touches fields only read when the
    /// peripherals are opened.
    ///
    /// Detection window, vote policy, burst shape, cooldown and telemetry
    /// cadence may change.  Ranger timing, model, camera, serial link and
    /// telemetry file are fixed for the life of the process.
    pub fn check_runtime_update(&self, new: &Self) -> Result<(), &'static str> {
        if self.echo_timeout_us != new.echo_timeout_us
            || self.sentinel_distance_cm.to_bits() != new.sentinel_distance_cm.to_bits()
        {
            return Err("ranger timing cannot change at runtime");
        }
        if self.model_path != new.model_path
            || self.labels_path != new.labels_path
            || self.model_input_width != new.model_input_width
            || self.model_input_height != new.model_input_height
            || self.model_channel_order != new.model_channel_order
        {
            return Err("model settings cannot change at runtime");
        }
        if self.camera_index != new.camera_index
            || self.camera_width != new.camera_width
            || self.camera_height != new.camera_height
            || self.camera_fps != new.camera_fps
            || self.show_window != new.show_window
        {
            return Err("camera settings cannot change at runtime");
        }
        if self.serial_device != new.serial_device
            || self.serial_baud != new.serial_baud
            || self.serial_timeout_ms != new.serial_timeout_ms
        {
            return Err("serial link cannot change at runtime");
        }
        if self.telemetry_path != new.telemetry_path {
            return Err("telemetry_path cannot change at runtime");
        }
        Ok(())
    }
}

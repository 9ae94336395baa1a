//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements                      | Connects to               |
//! |---------------|---------------------------------|---------------------------|
//! | `hardware`    | Ranging/Frame/Classifier ports  | composed device drivers   |
//! |               | ActuationChannel, ClockPort     |                           |
//! | `time`        | ClockPort, MonotonicClock       | system clocks             |
//! | `log_sink`    | EventSink                       | `log` facade              |
//! | `json_sink`   | EventSink                       | JSON-lines telemetry file |
//! | `display`     | DisplayPort                     | `log` facade (headless)   |
//! | `config_file` | ConfigPort                      | JSON config file          |
//! | `rpi_gpio`    | (ranger wiring)                 | BCM GPIO via `rppal`      |
//! | `serial`      | (actuator wiring)               | UART via `serialport`     |
//! | `camera`      | FrameGrabber, DisplayPort       | OpenCV videoio / highgui  |
//! | `onnx`        | InferenceBackend                | ONNX Runtime              |

pub mod config_file;
pub mod display;
pub mod hardware;
pub mod json_sink;
pub mod log_sink;
pub mod time;

#[cfg(feature = "camera")]
pub mod camera;
#[cfg(feature = "onnx")]
pub mod onnx;
#[cfg(feature = "gpio")]
pub mod rpi_gpio;
#[cfg(feature = "serial")]
pub mod serial;

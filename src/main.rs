//! SmartBin controller entry point
//!
//! Hexagonal architecture with a single-threaded, frame-paced control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter           LogEventSink   JsonLinesSink        │
//! │  (Ranger+Camera+Model      (EventSink)    (EventSink)          │
//! │   +Actuator+Clock)         HighGuiDisplay FileConfigAdapter    │
//! │                            (DisplayPort)  (ConfigPort)         │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  FSM · Verification · Telemetry cadence                │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Context, Result, bail};
use log::{error, info, warn};

use smartbin::adapters::camera::{HighGuiDisplay, OpenCvGrabber, WINDOW_TITLE};
use smartbin::adapters::config_file::{CONFIG_ENV, FileConfigAdapter};
use smartbin::adapters::display::LogDisplay;
use smartbin::adapters::hardware::HardwareAdapter;
use smartbin::adapters::json_sink::JsonLinesSink;
use smartbin::adapters::log_sink::LogEventSink;
use smartbin::adapters::onnx::OnnxBackend;
use smartbin::adapters::rpi_gpio::open_ranger;
use smartbin::adapters::serial::open_actuator;
use smartbin::adapters::time::SystemClock;
use smartbin::app::ports::{ActuationChannel, ConfigPort, DisplayPort};
use smartbin::app::service::{AppService, TickOutcome};
use smartbin::diagnostics;
use smartbin::drivers::NullChannel;
use smartbin::vision::{Classifier, FramePipeline, Vocabulary};

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    diagnostics::install_panic_handler();

    info!("╔══════════════════════════════════════╗");
    info!("║  SmartBin v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Config (file, or defaults) ─────────────────────────
    let config_port =
        FileConfigAdapter::resolve(std::env::args().nth(1), std::env::var(CONFIG_ENV).ok());
    let config = config_port
        .load()
        .with_context(|| format!("loading {}", config_port.path().display()))?;
    info!("Config: {}", config_port.path().display());

    // ── 3. Model + vocabulary (fatal on failure) ──────────────
    let vocabulary = Vocabulary::load(&config.labels_path).context("label vocabulary")?;
    info!("Vocabulary: {} labels", vocabulary.len());
    let backend = OnnxBackend::load(
        &config.model_path,
        config.model_input_width,
        config.model_input_height,
    )
    .context("classifier model")?;
    let classifier = Classifier::new(backend, vocabulary)
        .context("classifier")?
        .with_channel_order(config.model_channel_order);

    // ── 4. Peripherals ────────────────────────────────────────
    let clock = SystemClock::new();
    let frames = FramePipeline::new(OpenCvGrabber::open(&config).context("camera")?);
    let ranger = open_ranger(&config, clock).context("ultrasonic ranger")?;

    // A missing actuator link is not fatal; decisions still show on screen.
    let actuator: Box<dyn ActuationChannel> = match open_actuator(&config) {
        Ok(link) => Box::new(link),
        Err(e) => {
            warn!("Actuator link unavailable ({e}), continuing without it");
            Box::new(NullChannel)
        }
    };

    let mut hw = HardwareAdapter::new(ranger, frames, classifier, actuator, clock);

    // ── 5. Sinks + display ────────────────────────────────────
    let json_sink = match &config.telemetry_path {
        Some(path) => match JsonLinesSink::append(path) {
            Ok(sink) => {
                info!("Telemetry: appending to {path}");
                Some(sink)
            }
            Err(e) => {
                warn!("Telemetry file {path} unavailable ({e}), logging only");
                None
            }
        },
        None => None,
    };
    let mut sink = (LogEventSink::new(), json_sink);

    let mut display: Box<dyn DisplayPort> = if config.show_window {
        Box::new(HighGuiDisplay::open(WINDOW_TITLE).context("operator window")?)
    } else {
        Box::new(LogDisplay::new())
    };

    // ── 6. App service ────────────────────────────────────────
    let mut app = AppService::new(config);
    app.start(&mut sink);
    info!("System ready. Entering control loop.");

    // ── 7. Control loop (paced by camera frame delivery) ──────
    let mut fault = None;
    while app.is_running() {
        match app.tick(&mut hw, &mut sink, &mut display) {
            Ok(TickOutcome::Stopped) => break,
            Ok(TickOutcome::Skipped | TickOutcome::Continue) => {}
            Err(e) => {
                error!("Control loop stopped: {e}");
                fault = Some(e);
                break;
            }
        }
    }

    info!("Uptime {}s, {}", clock.uptime_secs(), app.metrics().summary());
    if let Some(e) = fault {
        bail!(e);
    }
    Ok(())
}

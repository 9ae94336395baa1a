//! JSON-lines telemetry sink.
//!
//! Appends one JSON object per telemetry record, tagged with the
//! collection it belongs to:
//!
//! ```text
//! {"collection":"bin_status","device_id":"smartbin-01","distance_cm":14.2,"timestamp":1700000000.1}
//! {"collection":"servo_actions","bin_type":"glass","opened":true,"timestamp":1700000003.4}
//! ```
//!
//! The local broker bridge tails this stream; the relay and dashboard
//! live outside this process.  Non-telemetry events are ignored.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::warn;
use serde::Serialize;

use crate::app::events::{ActuationRecord, AppEvent, BinStatusRecord};
use crate::app::ports::EventSink;

#[derive(Serialize)]
#[serde(tag = "collection")]
enum TelemetryLine<'a> {
    #[serde(rename = "bin_status")]
    BinStatus(&'a BinStatusRecord),
    #[serde(rename = "servo_actions")]
    ServoAction(&'a ActuationRecord),
}

pub struct JsonLinesSink<W: Write> {
    out: W,
    lines_written: u64,
    write_failures: u64,
}

impl JsonLinesSink<BufWriter<File>> {
    /// Append to `path`, creating it if needed.
    pub fn append(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            lines_written: 0,
            write_failures: 0,
        }
    }

    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    pub fn write_failures(&self) -> u64 {
        self.write_failures
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &TelemetryLine<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, line)?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
    fn emit(&mut self, event: &AppEvent) {
        let line = match event {
            AppEvent::BinStatus(r) => TelemetryLine::BinStatus(r),
            AppEvent::Actuation(r) => TelemetryLine::ServoAction(r),
            _ => return,
        };
        match self.write_line(&line) {
            Ok(()) => self.lines_written += 1,
            Err(e) => {
                self.write_failures += 1;
                warn!("Telemetry write failed: {e}");
            }
        }
    }
}

//! Frame acquisition pipeline.
//!
//! Camera backends queue several decoded frames internally.  Live display
//! uses whatever is next ([`FramePipeline::peek`]); a verification burst
//! first skips the queued backlog ([`FramePipeline::discard`]) so that the
//! [`FramePipeline::sample`] calls that follow see the scene as it is now.

use log::{debug, warn};

use super::Frame;
use crate::error::CaptureError;

/// Raw access to a camera stream.
pub trait FrameGrabber {
    /// Advance past the next frame without decoding it.  `Ok(false)` when
    /// the backend had nothing to skip.
    fn grab(&mut self) -> Result<bool, CaptureError>;

    /// Grab and decode the next frame.  `Ok(None)` when the backend
    /// returned no frame this time.
    fn read(&mut self) -> Result<Option<Frame>, CaptureError>;
}

/// Display and sampling front-end over a [`FrameGrabber`].
pub struct FramePipeline<G> {
    grabber: G,
    frames_read: u64,
    frames_discarded: u64,
    failed_reads: u64,
}

impl<G: FrameGrabber> FramePipeline<G> {
    pub fn new(grabber: G) -> Self {
        Self {
            grabber,
            frames_read: 0,
            frames_discarded: 0,
            failed_reads: 0,
        }
    }

    /// Next frame for live display.
    ///
    /// `Ok(None)` means "no frame this tick".  Errors that are not
    /// [recoverable](CaptureError::is_recoverable) are returned so the
    /// control loop can stop.
    pub fn peek(&mut self) -> Result<Option<Frame>, CaptureError> {
        match self.grabber.read() {
            Ok(Some(frame)) => {
                self.frames_read += 1;
                Ok(Some(frame))
            }
            Ok(None) => {
                self.failed_reads += 1;
                Ok(None)
            }
            Err(e) if e.is_recoverable() => {
                self.failed_reads += 1;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Skip up to `n` buffered frames.  Returns how many were skipped.
    pub fn discard(&mut self, n: usize) -> usize {
        let mut skipped = 0;
        for _ in 0..n {
            match self.grabber.grab() {
                Ok(true) => skipped += 1,
                Ok(false) => break,
                Err(e) => {
                    warn!("Pipeline: flush stopped after {skipped} frames: {e}");
                    break;
                }
            }
        }
        self.frames_discarded += skipped as u64;
        debug!("Pipeline: flushed {skipped}/{n} buffered frames");
        skipped
    }

    /// One fresh frame for a verification sample.  Any failure yields
    /// `None`; the caller drops that sample.
    pub fn sample(&mut self) -> Option<Frame> {
        match self.grabber.read() {
            Ok(Some(frame)) => {
                self.frames_read += 1;
                Some(frame)
            }
            Ok(None) => {
                self.failed_reads += 1;
                None
            }
            Err(e) => {
                self.failed_reads += 1;
                warn!("Pipeline: sample capture failed: {e}");
                None
            }
        }
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    pub fn frames_discarded(&self) -> u64 {
        self.frames_discarded
    }

    pub fn failed_reads(&self) -> u64 {
        self.failed_reads
    }

    pub fn grabber_mut(&mut self) -> &mut G {
        &mut self.grabber
    }
}

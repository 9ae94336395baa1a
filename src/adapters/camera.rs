//! OpenCV camera capture and operator window.
//!
//! OpenCV hands out BGR `Mat`s; frames cross into the domain as RGB
//! [`Frame`]s and are converted back only for drawing.

use log::{info, warn};
use opencv::{
    core::{self, Mat},
    highgui, imgproc,
    prelude::*,
    videoio::{self, VideoCapture},
};

use crate::app::ports::{DisplayPort, OperatorInput};
use crate::config::SystemConfig;
use crate::error::{CaptureError, StartupError};
use crate::fsm::context::{Bgr, Presentation};
use crate::vision::{Frame, FrameGrabber};

pub const WINDOW_TITLE: &str = "Smart Bin AI";

/// Height of the black banner behind the item line (px).
const BANNER_HEIGHT: i32 = 80;

fn backend(e: opencv::Error) -> CaptureError {
    CaptureError::Backend(e.to_string())
}

fn scalar((b, g, r): Bgr) -> core::Scalar {
    core::Scalar::new(f64::from(b), f64::from(g), f64::from(r), 0.0)
}

// ───────────────────────────────────────────────────────────────
// Capture
// ───────────────────────────────────────────────────────────────

pub struct OpenCvGrabber {
    cap: VideoCapture,
}

impl OpenCvGrabber {
    pub fn open(config: &SystemConfig) -> Result<Self, StartupError> {
        let hw = |e: opencv::Error| StartupError::Hardware(format!("camera: {e}"));
        let mut cap = VideoCapture::new(config.camera_index, videoio::CAP_ANY).map_err(hw)?;
        if !cap.is_opened().map_err(hw)? {
            return Err(StartupError::Hardware(format!(
                "camera {} could not be opened",
                config.camera_index
            )));
        }
        cap.set(videoio::CAP_PROP_FRAME_WIDTH, f64::from(config.camera_width))
            .map_err(hw)?;
        cap.set(videoio::CAP_PROP_FRAME_HEIGHT, f64::from(config.camera_height))
            .map_err(hw)?;
        cap.set(videoio::CAP_PROP_FPS, f64::from(config.camera_fps))
            .map_err(hw)?;
        // Not every backend honours this; bursts flush explicitly anyway.
        cap.set(videoio::CAP_PROP_BUFFERSIZE, 1.0).map_err(hw)?;
        info!(
            "Camera {}: {}x{} @ {} fps",
            config.camera_index, config.camera_width, config.camera_height, config.camera_fps
        );
        Ok(Self { cap })
    }

    fn lost_or_empty(&self) -> Result<Option<Frame>, CaptureError> {
        if self.cap.is_opened().map_err(backend)? {
            Ok(None)
        } else {
            Err(CaptureError::Disconnected)
        }
    }
}

impl FrameGrabber for OpenCvGrabber {
    fn grab(&mut self) -> Result<bool, CaptureError> {
        self.cap.grab().map_err(backend)
    }

    fn read(&mut self) -> Result<Option<Frame>, CaptureError> {
        let mut mat = Mat::default();
        if !self.cap.read(&mut mat).map_err(backend)? || mat.empty() {
            return self.lost_or_empty();
        }
        mat_to_frame(&mat).map(Some)
    }
}

fn mat_to_frame(bgr: &Mat) -> Result<Frame, CaptureError> {
    let mut rgb = Mat::default();
    imgproc::cvt_color(bgr, &mut rgb, imgproc::COLOR_BGR2RGB, 0).map_err(backend)?;
    let (width, height) = (rgb.cols() as u32, rgb.rows() as u32);
    let data = rgb.data_bytes().map_err(backend)?.to_vec();
    Frame::from_raw(width, height, data)
        .ok_or_else(|| CaptureError::Backend(String::from("frame buffer size mismatch")))
}

// ───────────────────────────────────────────────────────────────
// Operator window
// ───────────────────────────────────────────────────────────────

pub struct HighGuiDisplay {
    window: String,
}

impl HighGuiDisplay {
    pub fn open(title: &str) -> Result<Self, StartupError> {
        highgui::named_window(title, highgui::WINDOW_AUTOSIZE)
            .map_err(|e| StartupError::Hardware(format!("display: {e}")))?;
        Ok(Self {
            window: title.to_owned(),
        })
    }

    fn draw(&self, frame: &Frame, view: &Presentation) -> opencv::Result<OperatorInput> {
        let height = frame.height() as i32;
        let mat = Mat::from_slice(frame.as_raw())?;
        let mat = mat.reshape(3, height)?;
        let mut out = Mat::default();
        imgproc::cvt_color(&mat, &mut out, imgproc::COLOR_RGB2BGR, 0)?;

        imgproc::rectangle(
            &mut out,
            core::Rect::new(0, 0, frame.width() as i32, BANNER_HEIGHT),
            scalar((0, 0, 0)),
            -1,
            imgproc::LINE_8,
            0,
        )?;
        imgproc::put_text(
            &mut out,
            &view.item_text(),
            core::Point::new(10, 50),
            imgproc::FONT_HERSHEY_SIMPLEX,
            1.2,
            scalar(view.item.colour()),
            2,
            imgproc::LINE_8,
            false,
        )?;
        imgproc::put_text(
            &mut out,
            &view.status.text(),
            core::Point::new(10, height - 30),
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.7,
            scalar(view.status.colour()),
            2,
            imgproc::LINE_8,
            false,
        )?;

        highgui::imshow(&self.window, &out)?;
        let key = highgui::wait_key(1)?;
        Ok(if key == i32::from(b'q') {
            OperatorInput::Stop
        } else {
            OperatorInput::None
        })
    }
}

impl DisplayPort for HighGuiDisplay {
    fn render(&mut self, frame: &Frame, view: &Presentation) -> OperatorInput {
        self.draw(frame, view).unwrap_or_else(|e| {
            warn!("Display: {e}");
            OperatorInput::None
        })
    }
}

impl Drop for HighGuiDisplay {
    fn drop(&mut self) {
        if let Err(e) = highgui::destroy_all_windows() {
            warn!("Display: close failed: {e}");
        }
    }
}

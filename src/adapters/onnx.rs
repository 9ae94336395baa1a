//! ONNX Runtime inference backend.
//!
//! The model is the unquantised classifier exported to ONNX with an NHWC
//! float input.  Its class count is discovered at load time with one
//! zero-input probe pass, which also proves the input size is right.

use std::path::Path;

use log::info;
use ort::session::Session;
use ort::value::Tensor;

use crate::error::{InferenceError, StartupError};
use crate::vision::InferenceBackend;

pub struct OnnxBackend {
    session: Session,
    width: u32,
    height: u32,
    num_classes: usize,
}

impl OnnxBackend {
    pub fn load(path: impl AsRef<Path>, width: u32, height: u32) -> Result<Self, StartupError> {
        let path = path.as_ref();
        info!("Loading ONNX model {}", path.display());
        let session = Session::builder()
            .map_err(|e| StartupError::ModelLoad(format!("session builder: {e}")))?
            .commit_from_file(path)
            .map_err(|e| StartupError::ModelLoad(format!("{}: {e}", path.display())))?;

        let mut backend = Self {
            session,
            width,
            height,
            num_classes: 0,
        };
        let probe = vec![0.0f32; (width * height * 3) as usize];
        let scores = backend
            .run(&probe)
            .map_err(|e| StartupError::ModelLoad(format!("probe pass failed: {e}")))?;
        if scores.is_empty() {
            return Err(StartupError::ModelLoad(String::from("model has no outputs")));
        }
        backend.num_classes = scores.len();
        info!("Model ready: {width}x{height} input, {} classes", scores.len());
        Ok(backend)
    }

    fn run(&mut self, input: &[f32]) -> Result<Vec<f32>, InferenceError> {
        let rt = |e: ort::Error| InferenceError::Runtime(e.to_string());
        let shape = vec![1_i64, i64::from(self.height), i64::from(self.width), 3];
        let tensor = Tensor::from_array((shape, input.to_vec())).map_err(rt)?;
        let outputs = self.session.run(ort::inputs![tensor]).map_err(rt)?;
        let (_, scores) = outputs[0].try_extract_tensor::<f32>().map_err(rt)?;
        Ok(scores.to_vec())
    }
}

impl InferenceBackend for OnnxBackend {
    fn input_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn num_classes(&self) -> usize {
        self.num_classes
    }

    fn forward(&mut self, input: &[f32]) -> Result<Vec<f32>, InferenceError> {
        self.run(input)
    }
}

//! Single-frame material classifier.
//!
//! The model artifact takes one `[1, H, W, 3]` float tensor and returns
//! `[1, num_classes]` class probabilities.  Output index `i` names the
//! `i`-th entry of the [`Vocabulary`], so the vocabulary file order must
//! match the model's training order exactly.

use std::path::Path;

use image::imageops::{self, FilterType};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::Frame;
use crate::error::{InferenceError, StartupError};

/// One classifier output.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub label: String,
    /// Probability of `label`, in `[0, 1]`.
    pub confidence: f32,
}

impl ClassificationResult {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

// ---------------------------------------------------------------------------
// Vocabulary
// ---------------------------------------------------------------------------

/// Ordered class names, index-aligned with the model output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    labels: Vec<String>,
}

impl Vocabulary {
    /// Parse a newline-delimited label list.
    ///
    /// Each line is `"<index> <name>"` or just `"<name>"`.  A leading
    /// all-digit token is dropped, names are lower-cased.  Blank lines are
    /// skipped and take no index slot, so a stray blank line shortens the
    /// vocabulary and [`Classifier::new`] rejects it against the model.
    pub fn parse(text: &str) -> Result<Self, StartupError> {
        let labels: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                let name = match line.split_once(' ') {
                    Some((idx, rest)) if idx.bytes().all(|b| b.is_ascii_digit()) => rest.trim(),
                    _ => line,
                };
                name.to_lowercase()
            })
            .collect();

        if labels.is_empty() {
            return Err(StartupError::VocabularyLoad(String::from("no labels")));
        }
        Ok(Self { labels })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, StartupError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| StartupError::VocabularyLoad(format!("{}: {e}", path.display())))?;
        let vocab = Self::parse(&text)?;
        info!("Vocabulary: {} classes from {}", vocab.len(), path.display());
        Ok(vocab)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Pre/post-processing
// ---------------------------------------------------------------------------

/// Channel order the model was trained on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOrder {
    #[default]
    Rgb,
    Bgr,
}

/// Resize to the model input, reorder channels, and map `[0, 255]` to
/// `[-1, 1]`.
///
/// Output is NHWC with the batch dimension implied.
pub fn preprocess(frame: &Frame, width: u32, height: u32, order: ChannelOrder) -> Vec<f32> {
    let resized = if frame.dimensions() == (width, height) {
        frame.clone()
    } else {
        imageops::resize(frame, width, height, FilterType::Triangle)
    };
    let norm = |v: u8| (f32::from(v) - 127.5) / 127.5;
    match order {
        ChannelOrder::Rgb => resized.as_raw().iter().map(|&v| norm(v)).collect(),
        ChannelOrder::Bgr => resized
            .pixels()
            .flat_map(|p| [norm(p[2]), norm(p[1]), norm(p[0])])
            .collect(),
    }
}

/// Index of the largest score.  The first one wins on equal scores.
pub fn argmax(scores: &[f32]) -> Option<(usize, f32)> {
    scores
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best, (i, s)| match best {
            Some((_, b)) if s <= b => best,
            _ if s.is_nan() => best,
            _ => Some((i, s)),
        })
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// A model runtime that maps one preprocessed input to class scores.
pub trait InferenceBackend {
    /// Model input `(width, height)`.
    fn input_size(&self) -> (u32, u32);

    /// Number of class scores the model produces.
    fn num_classes(&self) -> usize;

    /// Run one forward pass over an NHWC tensor.
    fn forward(&mut self, input: &[f32]) -> Result<Vec<f32>, InferenceError>;
}

/// Couples a backend with its vocabulary.
pub struct Classifier<B> {
    backend: B,
    vocab: Vocabulary,
    order: ChannelOrder,
}

impl<B: InferenceBackend> Classifier<B> {
    /// Fails if the model output width disagrees with the vocabulary.
    pub fn new(backend: B, vocab: Vocabulary) -> Result<Self, StartupError> {
        let classes = backend.num_classes();
        if classes != vocab.len() {
            return Err(StartupError::VocabularyLoad(format!(
                "model has {classes} outputs, vocabulary has {} labels",
                vocab.len()
            )));
        }
        let (w, h) = backend.input_size();
        info!("Classifier ready: {w}x{h} input, {classes} classes");
        Ok(Self {
            backend,
            vocab,
            order: ChannelOrder::default(),
        })
    }

    /// Feed the model `order` instead of RGB.
    pub fn with_channel_order(mut self, order: ChannelOrder) -> Self {
        self.order = order;
        self
    }

    pub fn classify(&mut self, frame: &Frame) -> Result<ClassificationResult, InferenceError> {
        let (w, h) = self.backend.input_size();
        let input = preprocess(frame, w, h, self.order);
        let scores = self.backend.forward(&input)?;
        if scores.len() != self.vocab.len() {
            return Err(InferenceError::OutputMismatch {
                expected: self.vocab.len(),
                actual: scores.len(),
            });
        }
        let (index, confidence) = argmax(&scores).ok_or_else(|| {
            InferenceError::Runtime(String::from("model produced no finite scores"))
        })?;
        let label = self.vocab.get(index).unwrap_or_default();
        debug!("Classifier: {label} ({:.1}%)", confidence * 100.0);
        Ok(ClassificationResult::new(label, confidence))
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }
}

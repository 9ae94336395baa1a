//! Vision subsystem: frame acquisition, single-frame classification and
//! burst verification.
//!
//! ```text
//!  FrameGrabber ──▶ FramePipeline ──▶ Classifier ──▶ VerificationEngine ──▶ Decision
//!   (camera)        peek/discard/      resize,         flush, sample,
//!                   sample             normalise,      filter, tally,
//!                                      argmax          quorum
//! ```

pub mod classifier;
pub mod pipeline;
pub mod verification;

/// A decoded colour frame, RGB channel order.
pub type Frame = image::RgbImage;

pub use classifier::{ChannelOrder, ClassificationResult, Classifier, InferenceBackend, Vocabulary};
pub use pipeline::{FrameGrabber, FramePipeline};
pub use verification::{BurstReport, Decision, VerificationEngine, VotePolicy};

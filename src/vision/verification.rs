//! Burst verification: majority vote over fresh samples.
//!
//! One burst flushes the capture backlog, draws `sample_count` frames,
//! classifies each, and keeps only votes that clear the confidence
//! threshold and are not the background class.  The most-voted label is
//! accepted when it reaches the quorum.
//!
//! Ties on the top count go to the label seen first in sample order.

use heapless::Vec as HVec;
use log::{debug, info, warn};

use super::classifier::ClassificationResult;
use crate::app::ports::{ClassifierPort, FramePort};
use crate::config::{MAX_SAMPLES, SystemConfig};

/// Outcome of one burst.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Accepted(String),
    Uncertain,
}

impl Decision {
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Accepted(label) => Some(label.as_str()),
            Self::Uncertain => None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Which samples count as votes, and how many are needed.
#[derive(Debug, Clone, PartialEq)]
pub struct VotePolicy {
    pub threshold: f32,
    pub quorum: u8,
    /// Label that never counts (the model's "nothing here" class).
    pub excluded: String,
}

impl VotePolicy {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            threshold: config.confidence_threshold,
            quorum: config.quorum,
            excluded: config.background_label.clone(),
        }
    }

    pub fn admits(&self, result: &ClassificationResult) -> bool {
        result.label != self.excluded && result.confidence >= self.threshold
    }
}

/// Vote counts in first-seen order.
pub type Tally<'a> = HVec<(&'a str, u8), MAX_SAMPLES>;

/// Count admitted votes per label.
///
/// A burst holds at most [`MAX_SAMPLES`] results; only the first
/// `MAX_SAMPLES` of a longer slice are counted, so every distinct label
/// among them fits in the tally.
pub fn tally<'a>(results: &'a [ClassificationResult], policy: &VotePolicy) -> Tally<'a> {
    let counted = &results[..results.len().min(MAX_SAMPLES)];
    if counted.len() < results.len() {
        warn!(
            "Verify: {} results exceed burst capacity, counting first {MAX_SAMPLES}",
            results.len()
        );
    }
    let mut counts = Tally::new();
    for r in counted.iter().filter(|r| policy.admits(r)) {
        if let Some(entry) = counts.iter_mut().find(|(l, _)| *l == r.label.as_str()) {
            entry.1 = entry.1.saturating_add(1);
        } else {
            // At most MAX_SAMPLES distinct labels, never full.
            let _ = counts.push((r.label.as_str(), 1));
        }
    }
    counts
}

/// Top label and its count.  Earlier entries win ties.
pub fn leader<'a>(counts: &Tally<'a>) -> Option<(&'a str, u8)> {
    counts.iter().fold(None, |best, &(label, n)| match best {
        Some((_, top)) if n <= top => best,
        _ => Some((label, n)),
    })
}

/// Apply the quorum rule to a set of sample results.  Same capacity rule
/// as [`tally`].
pub fn decide(results: &[ClassificationResult], policy: &VotePolicy) -> Decision {
    let counts = tally(results, policy);
    match leader(&counts) {
        None => {
            info!("Verify: no admissible votes");
            Decision::Uncertain
        }
        Some((label, n)) if n >= policy.quorum => {
            info!("Verify: winner {} ({n}/{})", label.to_uppercase(), results.len());
            Decision::Accepted(label.to_owned())
        }
        Some((label, n)) => {
            info!(
                "Verify: {} rejected, only {n} votes (quorum {})",
                label.to_uppercase(),
                policy.quorum
            );
            Decision::Uncertain
        }
    }
}

/// Everything one burst produced.
#[derive(Debug, Clone, PartialEq)]
pub struct BurstReport {
    pub decision: Decision,
    /// Results of samples that were captured and classified.
    pub samples: HVec<ClassificationResult, MAX_SAMPLES>,
    /// Samples lost to capture or inference failures.
    pub dropped: u8,
    /// Buffered frames skipped before sampling.
    pub flushed: usize,
}

/// Runs verification bursts against a camera and classifier.
#[derive(Debug, Clone)]
pub struct VerificationEngine {
    policy: VotePolicy,
    sample_count: u8,
    flush_frames: u8,
}

impl VerificationEngine {
    pub fn new(policy: VotePolicy, sample_count: u8, flush_frames: u8) -> Self {
        Self {
            policy,
            sample_count: sample_count.min(MAX_SAMPLES as u8),
            flush_frames,
        }
    }

    pub fn from_config(config: &SystemConfig) -> Self {
        Self::new(
            VotePolicy::from_config(config),
            config.sample_count,
            config.flush_frames,
        )
    }

    /// Run one blocking burst.  Never retries; failed samples are dropped.
    pub fn verify(&self, hw: &mut (impl FramePort + ClassifierPort)) -> BurstReport {
        info!("Verify: starting burst of {} samples", self.sample_count);
        let flushed = hw.discard(self.flush_frames as usize);

        let mut samples: HVec<ClassificationResult, MAX_SAMPLES> = HVec::new();
        let mut dropped = 0u8;
        for i in 1..=self.sample_count {
            let Some(frame) = hw.sample() else {
                debug!("  Sample {i}: no frame");
                dropped += 1;
                continue;
            };
            match hw.classify(&frame) {
                Ok(r) => {
                    debug!(
                        "  Sample {i}: {} ({:.1}%)",
                        r.label.to_uppercase(),
                        r.confidence * 100.0
                    );
                    if samples.push(r).is_err() {
                        dropped += 1;
                    }
                }
                Err(e) => {
                    warn!("  Sample {i}: inference failed: {e}");
                    dropped += 1;
                }
            }
        }

        let decision = decide(&samples, &self.policy);
        BurstReport {
            decision,
            samples,
            dropped,
            flushed,
        }
    }

    pub fn policy(&self) -> &VotePolicy {
        &self.policy
    }
}

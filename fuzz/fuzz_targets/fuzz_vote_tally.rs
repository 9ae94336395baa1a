//! Fuzz target: burst voting (`tally` / `decide`)
//!
//! Each input byte pair becomes one sample: the first picks a label from
//! a small pool, the second a confidence in `[0, 1]`.  The first byte of
//! the input sets the quorum.
//!
//! Invariants checked:
//! - No panics, including past the burst capacity
//! - An accepted label has the top vote count and meets the quorum
//! - The excluded label is never accepted
//!
//! cargo fuzz run fuzz_vote_tally

#![no_main]

use libfuzzer_sys::fuzz_target;
use smartbin::vision::verification::{VotePolicy, decide, tally};
use smartbin::vision::{ClassificationResult, Decision};

const POOL: [&str; 6] = ["background", "glass", "paper", "aluminium", "plastic", "cardboard"];

fuzz_target!(|data: &[u8]| {
    let Some((&q, rest)) = data.split_first() else {
        return;
    };
    let policy = VotePolicy {
        threshold: 0.9,
        quorum: q % 8 + 1,
        excluded: String::from("background"),
    };
    let results: Vec<ClassificationResult> = rest
        .chunks_exact(2)
        .map(|pair| {
            ClassificationResult::new(
                POOL[pair[0] as usize % POOL.len()],
                f32::from(pair[1]) / 255.0,
            )
        })
        .collect();

    let counts = tally(&results, &policy);
    let top = counts.iter().map(|&(_, n)| n).max().unwrap_or(0);
    match decide(&results, &policy) {
        Decision::Accepted(label) => {
            assert_ne!(label, "background");
            let n = counts
                .iter()
                .find(|(l, _)| *l == label)
                .map_or(0, |&(_, n)| n);
            assert!(n >= policy.quorum);
            assert_eq!(n, top);
        }
        Decision::Uncertain => assert!(top < policy.quorum),
    }
});

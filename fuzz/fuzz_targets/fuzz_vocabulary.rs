//! Fuzz target: `Vocabulary::parse`
//!
//! Feeds arbitrary label files to the parser.
//!
//! Invariants checked:
//! - No panics under any byte sequence that is valid UTF-8
//! - A parsed vocabulary is never empty and holds no empty labels
//! - Lookups past the end return `None`
//!
//! cargo fuzz run fuzz_vocabulary

#![no_main]

use libfuzzer_sys::fuzz_target;
use smartbin::vision::Vocabulary;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(vocab) = Vocabulary::parse(text) else {
        return;
    };
    assert!(!vocab.is_empty());
    assert!(vocab.iter().all(|label| !label.is_empty()));
    assert_eq!(vocab.get(vocab.len()), None);
    for label in vocab.iter() {
        assert!(vocab.contains(label));
    }
});

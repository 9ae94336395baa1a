//! Fuzz target: config file decoding + validation
//!
//! Arbitrary JSON goes through the same steps as the config file adapter:
//! decode into `SystemConfig` (missing fields take defaults), then
//! `validate`.
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - A config that validates keeps its detection window and quorum sane
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use libfuzzer_sys::fuzz_target;
use smartbin::config::{MAX_SAMPLES, SystemConfig};

fuzz_target!(|data: &[u8]| {
    let Ok(config) = serde_json::from_slice::<SystemConfig>(data) else {
        return;
    };
    if config.validate().is_ok() {
        assert!(config.full_threshold_cm > config.min_range_cm);
        assert!(config.quorum >= 1 && config.quorum <= config.sample_count);
        assert!(config.sample_count as usize <= MAX_SAMPLES);
        assert!(config.confidence_threshold > 0.0 && config.confidence_threshold <= 1.0);
    }
});

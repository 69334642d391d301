//! Pluginfuzz - hour-long randomized fuzzing of audio processors
//!
//! This library re-exports the fuzz engine from `pluginfuzz-core` and adds
//! the command-line front end ([`cli`]) used by the `pluginfuzz` binary.

pub mod cli;

pub use pluginfuzz_core::{audio, config, fuzz, processor};

pub use pluginfuzz_core::{
    AudioBuffer, AudioProcessor, CollectingReporter, FuzzConfig, FuzzError, FuzzOptions, Reporter,
    SessionRunner, SessionState, SessionSummary, StrictnessPolicy, ViolationReport,
};
pub use pluginfuzz_core::{
    AMPLITUDE_THRESHOLD, BUILD_DATE, DEFAULT_BLOCK_SIZE, SESSION_SECONDS, VERSION,
};

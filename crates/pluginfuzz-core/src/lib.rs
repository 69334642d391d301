//! Pluginfuzz Core - Randomized long-session stress testing for audio processors
//!
//! This library drives an audio processor through a simulated hour of
//! processing per sample rate, with randomly sized sub-blocks, random
//! parameter automation and random noise input, and checks every processed
//! sub-block for NaN, Inf, over-threshold and subnormal samples.

pub mod audio;
pub mod config;
pub mod fuzz;
pub mod processor;

pub use audio::buffer::{AudioBuffer, SubBlock, SubBlockMut};
pub use audio::invariants::{check_block, ViolationReport, AMPLITUDE_THRESHOLD};
pub use config::{FuzzConfig, FuzzOptions};
pub use fuzz::report::{Assertion, CollectingReporter, Reporter, SessionSummary};
pub use fuzz::session::{FuzzError, SessionRunner, SessionState};
pub use fuzz::strictness::StrictnessPolicy;
pub use processor::{AudioProcessor, EventBuffer, ParameterId, ParameterInfo};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Date this crate was built, set by `build.rs`
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Nominal block size used when none is configured
pub const DEFAULT_BLOCK_SIZE: usize = 512;

/// Simulated session length per sample rate (one hour)
pub const SESSION_SECONDS: f64 = 3600.0;

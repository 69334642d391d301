//! Randomized long-session fuzzing
//!
//! - Sub-block size scheduling and session length ([`scheduler`])
//! - Random parameter automation ([`automation`])
//! - Subnormal strictness policy ([`strictness`])
//! - Assertion and log outcomes toward the test framework ([`report`])
//! - The per-sample-rate session state machine ([`session`])

pub mod automation;
pub mod report;
pub mod scheduler;
pub mod session;
pub mod strictness;

//! Outcomes reported to the enclosing test framework
//!
//! A session never aborts on bad output. Each sub-block's checks become
//! named expect-equals assertions (expected count 0) plus free-text log
//! lines, delivered through a [`Reporter`]. Per-sample-rate totals are
//! returned as [`SessionSummary`] values.

use crate::audio::invariants::ViolationReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Assertion name for NaN samples
pub const NAN_ASSERTION: &str = "NaNs found in buffer";

/// Assertion name for infinite samples
pub const INF_ASSERTION: &str = "Infs found in buffer";

/// Assertion name for samples louder than the amplitude threshold
pub const LOUD_ASSERTION: &str = "samples over 20 dB found in buffer";

/// Assertion name for subnormal samples when they count as errors
pub const SUBNORMAL_ASSERTION: &str = "Subnormals found in buffer";

/// Maximum number of failure details kept by [`CollectingReporter`]
pub const MAX_RECORDED_FAILURES: usize = 1000;

/// Maximum number of log lines kept by [`CollectingReporter`]
pub const MAX_RECORDED_MESSAGES: usize = 1000;

/// Sink for assertion outcomes and log lines
pub trait Reporter {
    /// Record that `actual` was expected to equal `expected`
    ///
    /// Returns whether the assertion passed.
    fn expect_equals(&mut self, name: &str, expected: u64, actual: u64) -> bool;

    /// Record a free-text log line
    fn log_message(&mut self, message: &str);
}

/// One failed assertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assertion {
    pub name: String,
    pub expected: u64,
    pub actual: u64,
}

/// Reporter that keeps counters and a bounded record of what happened
///
/// Only the first [`MAX_RECORDED_FAILURES`] failures and
/// [`MAX_RECORDED_MESSAGES`] messages are kept; counters always cover
/// everything.
#[derive(Debug, Default, Clone)]
pub struct CollectingReporter {
    passed: u64,
    failed: u64,
    failures: Vec<Assertion>,
    messages: Vec<String>,
    dropped_messages: u64,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of passing assertions
    pub fn passed(&self) -> u64 {
        self.passed
    }

    /// Number of failing assertions
    pub fn failed(&self) -> u64 {
        self.failed
    }

    /// Recorded failure details (oldest first)
    pub fn failures(&self) -> &[Assertion] {
        &self.failures
    }

    /// Recorded log lines (oldest first)
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Log lines that did not fit in the record
    pub fn dropped_messages(&self) -> u64 {
        self.dropped_messages
    }

    /// Failure count for one assertion name, among recorded failures
    pub fn failures_named(&self, name: &str) -> usize {
        self.failures.iter().filter(|a| a.name == name).count()
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

impl Reporter for CollectingReporter {
    fn expect_equals(&mut self, name: &str, expected: u64, actual: u64) -> bool {
        if actual == expected {
            self.passed += 1;
            return true;
        }

        self.failed += 1;
        if self.failures.len() < MAX_RECORDED_FAILURES {
            self.failures.push(Assertion {
                name: name.to_string(),
                expected,
                actual,
            });
        }
        false
    }

    fn log_message(&mut self, message: &str) {
        if self.messages.len() < MAX_RECORDED_MESSAGES {
            self.messages.push(message.to_string());
        } else {
            self.dropped_messages += 1;
        }
    }
}

/// Totals for one completed session at one sample rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Sample rate the session ran at (Hz)
    pub sample_rate: f64,
    /// Block size the processor was prepared with
    pub nominal_block_size: usize,
    /// Samples the session had to reach
    pub target_samples: u64,
    /// Samples actually processed (may overshoot the target by less than one block)
    pub samples_processed: u64,
    /// Number of `process_block` calls
    pub sub_blocks: u64,
    /// Violation counts summed over every sub-block
    pub totals: ViolationReport,
    /// Failed assertions during this session
    pub failures: u64,
    /// Subnormal warnings logged during this session
    pub warnings: u64,
    /// When the session started
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration in milliseconds
    pub elapsed_ms: u64,
}

impl SessionSummary {
    /// True when the session recorded no failures
    pub fn passed(&self) -> bool {
        self.failures == 0
    }

    /// Simulated audio duration per second of wall-clock time
    pub fn realtime_factor(&self) -> f64 {
        if self.elapsed_ms == 0 || self.sample_rate <= 0.0 {
            return f64::INFINITY;
        }
        let simulated_secs = self.samples_processed as f64 / self.sample_rate;
        simulated_secs / (self.elapsed_ms as f64 / 1000.0)
    }
}

//! Numeric invariant checks for processed audio
//!
//! Every processed sub-block is scanned once and each sample is put into at
//! most one category:
//! - NaN
//! - positive or negative infinity
//! - finite but louder than the amplitude threshold
//! - nonzero but smaller in magnitude than the smallest normal value
//!
//! NaN and Inf samples never count as over-threshold or subnormal.

use crate::audio::buffer::SubBlock;
use serde::{Deserialize, Serialize};

/// Linear amplitude limit (+20 dBFS)
pub const AMPLITUDE_THRESHOLD: f32 = 10.0;

/// Floating-point sample types the checker understands
pub trait Sample: Copy {
    /// Smallest positive normal value of the representation
    const MIN_NORMAL: Self;

    fn is_nan(self) -> bool;
    fn is_infinite(self) -> bool;
    fn magnitude(self) -> Self;
    fn is_zero(self) -> bool;
    fn less_than(self, other: Self) -> bool;
}

impl Sample for f32 {
    const MIN_NORMAL: Self = f32::MIN_POSITIVE;

    #[inline]
    fn is_nan(self) -> bool {
        f32::is_nan(self)
    }
    #[inline]
    fn is_infinite(self) -> bool {
        f32::is_infinite(self)
    }
    #[inline]
    fn magnitude(self) -> Self {
        self.abs()
    }
    #[inline]
    fn is_zero(self) -> bool {
        self == 0.0
    }
    #[inline]
    fn less_than(self, other: Self) -> bool {
        self < other
    }
}

impl Sample for f64 {
    const MIN_NORMAL: Self = f64::MIN_POSITIVE;

    #[inline]
    fn is_nan(self) -> bool {
        f64::is_nan(self)
    }
    #[inline]
    fn is_infinite(self) -> bool {
        f64::is_infinite(self)
    }
    #[inline]
    fn magnitude(self) -> Self {
        self.abs()
    }
    #[inline]
    fn is_zero(self) -> bool {
        self == 0.0
    }
    #[inline]
    fn less_than(self, other: Self) -> bool {
        self < other
    }
}

/// Per-category violation counts for one scanned region
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationReport {
    /// Samples that are NaN
    pub nan_count: u64,
    /// Samples that are +Inf or -Inf
    pub inf_count: u64,
    /// Finite samples with `|s| > threshold`
    pub over_threshold_count: u64,
    /// Nonzero samples below the smallest normal magnitude
    pub subnormal_count: u64,
}

impl ViolationReport {
    /// True when no category has any hits
    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }

    /// Sum of all categories
    pub fn total(&self) -> u64 {
        self.nan_count + self.inf_count + self.over_threshold_count + self.subnormal_count
    }

    /// Number of hits that fail regardless of strictness
    pub fn hard_violations(&self) -> u64 {
        self.nan_count + self.inf_count + self.over_threshold_count
    }

    /// Add another report's counts into this one
    pub fn merge(&mut self, other: &ViolationReport) {
        self.nan_count += other.nan_count;
        self.inf_count += other.inf_count;
        self.over_threshold_count += other.over_threshold_count;
        self.subnormal_count += other.subnormal_count;
    }
}

/// Scan a slice of samples against `threshold`
///
/// # Example
/// ```
/// use pluginfuzz_core::audio::invariants::scan_samples;
///
/// let report = scan_samples(&[0.5f32, f32::NAN, 20.0, 1.0e-40], 10.0);
/// assert_eq!(report.nan_count, 1);
/// assert_eq!(report.over_threshold_count, 1);
/// assert_eq!(report.subnormal_count, 1);
/// ```
pub fn scan_samples<S: Sample>(samples: &[S], threshold: S) -> ViolationReport {
    let mut report = ViolationReport::default();

    for &s in samples {
        if s.is_nan() {
            report.nan_count += 1;
        } else if s.is_infinite() {
            report.inf_count += 1;
        } else {
            let m = s.magnitude();
            // m is finite here
            report.over_threshold_count += u64::from(threshold.less_than(m));
            report.subnormal_count += u64::from(!s.is_zero() && m.less_than(S::MIN_NORMAL));
        }
    }

    report
}

/// Scan every channel of a processed sub-block
pub fn check_block(block: &SubBlock<'_>, threshold: f32) -> ViolationReport {
    let mut report = ViolationReport::default();
    for channel in block.channels() {
        report.merge(&scan_samples(channel, threshold));
    }
    report
}

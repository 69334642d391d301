//! Strictness policy for subnormal detections
//!
//! NaN, Inf and over-threshold samples always fail. Subnormals only fail
//! above [`SUBNORMAL_ERROR_LEVEL`]; at or below it they are logged as
//! warnings.

use serde::{Deserialize, Serialize};

/// Highest strictness level at which subnormals are only a warning
pub const SUBNORMAL_ERROR_LEVEL: i32 = 5;

/// Decision derived from the configured strictness level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrictnessPolicy {
    level: i32,
}

impl StrictnessPolicy {
    pub fn from_level(level: i32) -> Self {
        Self { level }
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    /// Whether subnormal samples count as validation failures
    pub fn subnormals_are_errors(&self) -> bool {
        self.level > SUBNORMAL_ERROR_LEVEL
    }
}

impl Default for StrictnessPolicy {
    fn default() -> Self {
        Self::from_level(SUBNORMAL_ERROR_LEVEL)
    }
}

//! Audio buffer handling
//!
//! This module contains the sample-level building blocks of a fuzz session:
//! - Owned multi-channel storage and sub-block windows ([`buffer`])
//! - Bounded random input generation ([`noise`])
//! - Numeric invariant scanning of processed output ([`invariants`])

pub mod buffer;
pub mod invariants;
pub mod noise;

//! Sub-block size scheduling
//!
//! Processors must cope with any block size up to the size they were
//! prepared with, including zero. Each iteration of a session draws a fresh
//! size uniformly from `[0, nominal]`.

use rand::Rng;

/// Chooses sub-block sizes and session lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StimulusScheduler {
    nominal_block_size: usize,
}

impl StimulusScheduler {
    pub fn new(nominal_block_size: usize) -> Self {
        Self { nominal_block_size }
    }

    /// Block size processors are prepared with
    pub fn nominal_block_size(&self) -> usize {
        self.nominal_block_size
    }

    /// Draw the next sub-block size, uniform over `[0, nominal_block_size]`
    ///
    /// # Example
    /// ```
    /// use pluginfuzz_core::fuzz::scheduler::StimulusScheduler;
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let scheduler = StimulusScheduler::new(512);
    /// let mut rng = StdRng::seed_from_u64(0);
    /// assert!(scheduler.next_sub_block_size(&mut rng) <= 512);
    /// ```
    pub fn next_sub_block_size<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        rng.gen_range(0..=self.nominal_block_size)
    }

    /// Number of samples making up a session of `seconds` at `sample_rate`
    ///
    /// # Example
    /// ```
    /// use pluginfuzz_core::fuzz::scheduler::StimulusScheduler;
    ///
    /// assert_eq!(StimulusScheduler::target_sample_count(44100.0, 3600.0), 158_760_000);
    /// ```
    pub fn target_sample_count(sample_rate: f64, seconds: f64) -> u64 {
        let target = (sample_rate * seconds).round();
        if target.is_finite() && target > 0.0 {
            target as u64
        } else {
            0
        }
    }
}

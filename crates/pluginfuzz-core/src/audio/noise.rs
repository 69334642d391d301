//! Bounded white noise input generation
//!
//! Fills sub-blocks with uniform noise in [`NOISE_MIN`, `NOISE_MAX`]. The range
//! sits well inside the amplitude threshold, so the stimulus alone can never
//! trip an invariant check.

use crate::audio::buffer::SubBlockMut;
use rand::Rng;

/// Lower bound of generated noise
pub const NOISE_MIN: f32 = -1.0;

/// Upper bound of generated noise
pub const NOISE_MAX: f32 = 1.0;

/// Fill every sample of `block` with uniform noise
///
/// Channels are filled in order, each from frame 0 upward, so a seeded
/// `rng` always produces the same buffer contents.
///
/// # Example
/// ```
/// use pluginfuzz_core::audio::{buffer::AudioBuffer, noise::fill_noise};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut rng = StdRng::seed_from_u64(1);
/// let mut buffer = AudioBuffer::new(2, 64);
/// fill_noise(&mut buffer.sub_block_mut(64), &mut rng);
/// assert!(buffer.channel(0).iter().all(|s| s.abs() <= 1.0));
/// ```
pub fn fill_noise<R: Rng + ?Sized>(block: &mut SubBlockMut<'_>, rng: &mut R) {
    for channel in block.channels_mut() {
        fill_noise_slice(channel, rng);
    }
}

/// Fill a single slice with uniform noise
pub fn fill_noise_slice<R: Rng + ?Sized>(samples: &mut [f32], rng: &mut R) {
    for sample in samples.iter_mut() {
        *sample = rng.gen_range(NOISE_MIN..=NOISE_MAX);
    }
}

//! Multi-channel sample storage and sub-block windows
//!
//! A session allocates one [`AudioBuffer`] sized to the nominal block size and
//! reuses it for every iteration. Each iteration processes a
//! [`SubBlockMut`] window over the first `s` frames of every channel, so no
//! allocation happens inside the fuzz loop.

/// Owned multi-channel audio storage (channels × frames of `f32`)
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// One vector per channel, all `frames` long
    channels: Vec<Vec<f32>>,
    /// Number of frames per channel
    frames: usize,
}

impl AudioBuffer {
    /// Create a zeroed buffer
    ///
    /// # Example
    /// ```
    /// use pluginfuzz_core::audio::buffer::AudioBuffer;
    ///
    /// let buffer = AudioBuffer::new(2, 512);
    /// assert_eq!(buffer.num_channels(), 2);
    /// assert_eq!(buffer.num_frames(), 512);
    /// ```
    pub fn new(num_channels: usize, num_frames: usize) -> Self {
        Self {
            channels: vec![vec![0.0; num_frames]; num_channels],
            frames: num_frames,
        }
    }

    /// Build a buffer from existing channel data
    ///
    /// # Panics
    /// Panics if the channels differ in length
    pub fn from_channels(channels: Vec<Vec<f32>>) -> Self {
        let frames = channels.first().map_or(0, Vec::len);
        assert!(
            channels.iter().all(|c| c.len() == frames),
            "All channels must have the same length"
        );
        Self { channels, frames }
    }

    /// Number of channels
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Number of frames per channel
    pub fn num_frames(&self) -> usize {
        self.frames
    }

    /// Read access to one full channel
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    /// Write access to one full channel
    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        &mut self.channels[index]
    }

    /// Read-only window over the first `frames` frames of every channel
    ///
    /// `frames` is clamped to the buffer length.
    pub fn sub_block(&self, frames: usize) -> SubBlock<'_> {
        SubBlock {
            channels: &self.channels,
            frames: frames.min(self.frames),
        }
    }

    /// Mutable window over the first `frames` frames of every channel
    ///
    /// `frames` is clamped to the buffer length.
    pub fn sub_block_mut(&mut self, frames: usize) -> SubBlockMut<'_> {
        let frames = frames.min(self.frames);
        SubBlockMut {
            channels: &mut self.channels,
            frames,
        }
    }
}

/// Non-owning read-only view over a prefix of an [`AudioBuffer`]
#[derive(Debug, Clone, Copy)]
pub struct SubBlock<'a> {
    channels: &'a [Vec<f32>],
    frames: usize,
}

impl<'a> SubBlock<'a> {
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn num_frames(&self) -> usize {
        self.frames
    }

    pub fn channel(&self, index: usize) -> &'a [f32] {
        &self.channels[index][..self.frames]
    }

    /// Iterate over every channel's window
    pub fn channels(&self) -> impl Iterator<Item = &'a [f32]> + 'a {
        let (channels, frames) = (self.channels, self.frames);
        channels.iter().map(move |c| &c[..frames])
    }
}

/// Non-owning mutable view over a prefix of an [`AudioBuffer`]
///
/// This is what processors receive in
/// [`AudioProcessor::process_block`](crate::processor::AudioProcessor::process_block).
#[derive(Debug)]
pub struct SubBlockMut<'a> {
    channels: &'a mut [Vec<f32>],
    frames: usize,
}

impl<'a> SubBlockMut<'a> {
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn num_frames(&self) -> usize {
        self.frames
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index][..self.frames]
    }

    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        &mut self.channels[index][..self.frames]
    }

    /// Iterate mutably over every channel's window
    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut [f32]> + '_ {
        let frames = self.frames;
        self.channels.iter_mut().map(move |c| &mut c[..frames])
    }

    /// Reborrow as a read-only view of the same window
    pub fn as_sub_block(&self) -> SubBlock<'_> {
        SubBlock {
            channels: &*self.channels,
            frames: self.frames,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_silent() {
        let buffer = AudioBuffer::new(3, 64);
        for ch in 0..3 {
            assert!(buffer.channel(ch).iter().all(|&s| s == 0.0));
        }
    }

    #[test]
    fn test_sub_block_is_prefix_window() {
        let mut buffer = AudioBuffer::new(2, 16);
        {
            let mut block = buffer.sub_block_mut(4);
            assert_eq!(block.num_frames(), 4);
            for channel in block.channels_mut() {
                channel.fill(0.5);
            }
        }

        for ch in 0..2 {
            assert!(buffer.channel(ch)[..4].iter().all(|&s| s == 0.5));
            assert!(buffer.channel(ch)[4..].iter().all(|&s| s == 0.0));
        }
    }

    #[test]
    fn test_sub_block_clamped_to_buffer() {
        let buffer = AudioBuffer::new(1, 8);
        assert_eq!(buffer.sub_block(100).num_frames(), 8);
    }

    #[test]
    fn test_zero_frame_sub_block() {
        let mut buffer = AudioBuffer::new(2, 8);
        let mut block = buffer.sub_block_mut(0);
        assert_eq!(block.num_channels(), 2);
        assert!(block.channel_mut(1).is_empty());
        assert_eq!(block.as_sub_block().channels().count(), 2);
    }

    #[test]
    fn test_from_channels() {
        let buffer = AudioBuffer::from_channels(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(buffer.num_frames(), 2);
        assert_eq!(buffer.sub_block(1).channel(1), &[3.0]);
    }

    #[test]
    #[should_panic]
    fn test_from_channels_mismatched_lengths() {
        AudioBuffer::from_channels(vec![vec![1.0, 2.0], vec![3.0]]);
    }
}

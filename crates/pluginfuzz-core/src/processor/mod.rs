//! Processor-under-test contract
//!
//! The fuzz engine never loads or instantiates processors itself. Anything
//! that implements [`AudioProcessor`] can be driven by a
//! [`SessionRunner`](crate::fuzz::session::SessionRunner):
//! - a plugin-format adapter
//! - one of the [`reference`] processors shipped with this crate
//! - a test double
//!
//! Lifecycle calls go through a [`control::ControlPath`] so adapters for
//! formats with threading rules can move them off the processing thread.

pub mod control;
pub mod reference;

use crate::audio::buffer::SubBlockMut;
use serde::{Deserialize, Serialize};

/// Opaque parameter identifier, stable for a processor's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParameterId(pub u32);

/// Description of one processor parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterInfo {
    pub id: ParameterId,
    /// Human-readable name
    pub name: String,
    /// Whether a host may automate this parameter
    pub is_automatable: bool,
    /// Whether this is the processor's bypass control
    pub is_bypass: bool,
    /// Current normalized value in [0, 1]
    pub value: f32,
}

impl ParameterInfo {
    pub fn new(id: u32, name: impl Into<String>, value: f32) -> Self {
        Self {
            id: ParameterId(id),
            name: name.into(),
            is_automatable: true,
            is_bypass: false,
            value,
        }
    }

    /// Mark this parameter as the bypass control
    pub fn bypass(mut self) -> Self {
        self.is_bypass = true;
        self
    }

    /// Mark this parameter as not automatable
    pub fn fixed(mut self) -> Self {
        self.is_automatable = false;
        self
    }

    /// Whether the fuzzer may change this parameter
    pub fn is_fuzzable(&self) -> bool {
        self.is_automatable && !self.is_bypass
    }
}

/// A timestamped short message delivered alongside a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    /// Frame offset within the sub-block
    pub frame_offset: usize,
    /// Raw message bytes (status, data1, data2)
    pub data: [u8; 3],
}

/// Auxiliary event stream passed with every `process_block` call
///
/// The fuzzer always hands processors an empty buffer and clears it after
/// each call, in case a processor writes output events into it.
#[derive(Debug, Clone, Default)]
pub struct EventBuffer {
    events: Vec<Event>,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

/// Capability set the fuzz engine needs from a processor
pub trait AudioProcessor {
    /// Number of input channels the processor consumes
    fn total_input_channels(&self) -> usize;

    /// Number of output channels the processor produces
    fn total_output_channels(&self) -> usize;

    /// Allocate resources for `sample_rate` and blocks up to `max_block_size` frames
    ///
    /// May be called repeatedly with different sample rates.
    fn prepare(&mut self, sample_rate: f64, max_block_size: usize);

    /// Free resources allocated by [`prepare`](Self::prepare)
    fn release(&mut self);

    /// Process `buffer` in place
    ///
    /// `buffer.num_frames()` may be anything from 0 to the prepared maximum.
    fn process_block(&mut self, buffer: &mut SubBlockMut<'_>, events: &mut EventBuffer);

    /// All parameters the processor exposes, in a stable order
    fn parameters(&self) -> Vec<ParameterInfo>;

    /// Set a parameter to a normalized value in [0, 1]
    fn set_parameter_value(&mut self, id: ParameterId, value: f32);

    /// Automatable, non-bypass parameters
    fn automatable_parameters(&self) -> Vec<ParameterInfo> {
        self.parameters()
            .into_iter()
            .filter(ParameterInfo::is_fuzzable)
            .collect()
    }

    /// Channel count a buffer must carry to drive this processor
    fn required_channels(&self) -> usize {
        self.total_input_channels().max(self.total_output_channels())
    }
}

impl<P: AudioProcessor + ?Sized> AudioProcessor for Box<P> {
    fn total_input_channels(&self) -> usize {
        (**self).total_input_channels()
    }

    fn total_output_channels(&self) -> usize {
        (**self).total_output_channels()
    }

    fn prepare(&mut self, sample_rate: f64, max_block_size: usize) {
        (**self).prepare(sample_rate, max_block_size)
    }

    fn release(&mut self) {
        (**self).release()
    }

    fn process_block(&mut self, buffer: &mut SubBlockMut<'_>, events: &mut EventBuffer) {
        (**self).process_block(buffer, events)
    }

    fn parameters(&self) -> Vec<ParameterInfo> {
        (**self).parameters()
    }

    fn set_parameter_value(&mut self, id: ParameterId, value: f32) {
        (**self).set_parameter_value(id, value)
    }

    fn automatable_parameters(&self) -> Vec<ParameterInfo> {
        (**self).automatable_parameters()
    }

    fn required_channels(&self) -> usize {
        (**self).required_channels()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_flags() {
        let p = ParameterInfo::new(0, "Gain", 0.5);
        assert!(p.is_fuzzable());
        assert!(!ParameterInfo::new(1, "Bypass", 0.0).bypass().is_fuzzable());
        assert!(!ParameterInfo::new(2, "Mode", 0.0).fixed().is_fuzzable());
    }

    #[test]
    fn test_event_buffer_clear() {
        let mut events = EventBuffer::new();
        events.push(Event {
            frame_offset: 0,
            data: [0x90, 60, 100],
        });
        assert_eq!(events.len(), 1);
        events.clear();
        assert!(events.is_empty());
    }
}

//! Reference processors
//!
//! Small well-behaved processors used as fuzz targets by the CLI and the
//! test suite. None of them should ever produce an invariant violation for
//! input in [-1, 1], whatever their parameter values.

use crate::audio::buffer::SubBlockMut;
use crate::processor::{AudioProcessor, EventBuffer, ParameterId, ParameterInfo};

/// Identity transform
#[derive(Debug, Clone)]
pub struct PassThrough {
    channels: usize,
    prepared: Option<(f64, usize)>,
}

impl PassThrough {
    pub fn new(channels: usize) -> Self {
        Self {
            channels,
            prepared: None,
        }
    }

    /// Sample rate and block size from the last `prepare`, cleared on `release`
    pub fn prepared(&self) -> Option<(f64, usize)> {
        self.prepared
    }
}

impl AudioProcessor for PassThrough {
    fn total_input_channels(&self) -> usize {
        self.channels
    }

    fn total_output_channels(&self) -> usize {
        self.channels
    }

    fn prepare(&mut self, sample_rate: f64, max_block_size: usize) {
        self.prepared = Some((sample_rate, max_block_size));
    }

    fn release(&mut self) {
        self.prepared = None;
    }

    fn process_block(&mut self, _buffer: &mut SubBlockMut<'_>, _events: &mut EventBuffer) {}

    fn parameters(&self) -> Vec<ParameterInfo> {
        Vec::new()
    }

    fn set_parameter_value(&mut self, _id: ParameterId, _value: f32) {}
}

const GAIN_PARAM: ParameterId = ParameterId(0);
const GAIN_BYPASS_PARAM: ParameterId = ParameterId(1);

/// Maximum linear gain (≈ +6 dB)
const MAX_GAIN: f32 = 2.0;

/// Linear gain stage with a bypass switch
///
/// The gain parameter maps [0, 1] linearly onto [0, `MAX_GAIN`].
#[derive(Debug, Clone)]
pub struct Gain {
    channels: usize,
    gain: f32,
    bypassed: bool,
}

impl Gain {
    pub fn new(channels: usize) -> Self {
        Self {
            channels,
            gain: 0.5,
            bypassed: false,
        }
    }

    /// Current linear gain factor
    pub fn linear_gain(&self) -> f32 {
        self.gain * MAX_GAIN
    }
}

impl AudioProcessor for Gain {
    fn total_input_channels(&self) -> usize {
        self.channels
    }

    fn total_output_channels(&self) -> usize {
        self.channels
    }

    fn prepare(&mut self, _sample_rate: f64, _max_block_size: usize) {}

    fn release(&mut self) {}

    fn process_block(&mut self, buffer: &mut SubBlockMut<'_>, _events: &mut EventBuffer) {
        if self.bypassed {
            return;
        }
        let g = self.linear_gain();
        for channel in buffer.channels_mut() {
            for sample in channel.iter_mut() {
                *sample *= g;
            }
        }
    }

    fn parameters(&self) -> Vec<ParameterInfo> {
        vec![
            ParameterInfo::new(GAIN_PARAM.0, "Gain", self.gain),
            ParameterInfo::new(
                GAIN_BYPASS_PARAM.0,
                "Bypass",
                f32::from(u8::from(self.bypassed)),
            )
            .bypass(),
        ]
    }

    fn set_parameter_value(&mut self, id: ParameterId, value: f32) {
        let value = value.clamp(0.0, 1.0);
        match id {
            GAIN_PARAM => self.gain = value,
            GAIN_BYPASS_PARAM => self.bypassed = value >= 0.5,
            _ => tracing::warn!(id = id.0, "Unknown gain parameter"),
        }
    }
}

const CUTOFF_PARAM: ParameterId = ParameterId(0);
const MIX_PARAM: ParameterId = ParameterId(1);
const LOWPASS_BYPASS_PARAM: ParameterId = ParameterId(2);

/// Cutoff range covered by the normalized cutoff parameter
const MIN_CUTOFF_HZ: f64 = 20.0;
const MAX_CUTOFF_HZ: f64 = 20_000.0;

/// Stateful one-pole lowpass with dry/wet mix
///
/// Recomputes its coefficient whenever the cutoff or sample rate changes,
/// so parameter automation mid-session exercises the filter's state.
#[derive(Debug, Clone)]
pub struct OnePoleLowpass {
    channels: usize,
    sample_rate: f64,
    cutoff: f32,
    mix: f32,
    bypassed: bool,
    coefficient: f32,
    state: Vec<f32>,
}

impl OnePoleLowpass {
    pub fn new(channels: usize) -> Self {
        let mut filter = Self {
            channels,
            sample_rate: 44100.0,
            cutoff: 0.5,
            mix: 1.0,
            bypassed: false,
            coefficient: 0.0,
            state: vec![0.0; channels],
        };
        filter.update_coefficient();
        filter
    }

    /// Cutoff frequency in Hz for the current normalized cutoff
    pub fn cutoff_hz(&self) -> f64 {
        // Exponential sweep so the parameter feels even across octaves
        MIN_CUTOFF_HZ * (MAX_CUTOFF_HZ / MIN_CUTOFF_HZ).powf(f64::from(self.cutoff))
    }

    fn update_coefficient(&mut self) {
        let nyquist_safe = self.cutoff_hz().min(self.sample_rate * 0.49);
        let x = (-2.0 * std::f64::consts::PI * nyquist_safe / self.sample_rate).exp();
        self.coefficient = (1.0 - x) as f32;
    }
}

impl AudioProcessor for OnePoleLowpass {
    fn total_input_channels(&self) -> usize {
        self.channels
    }

    fn total_output_channels(&self) -> usize {
        self.channels
    }

    fn prepare(&mut self, sample_rate: f64, _max_block_size: usize) {
        self.sample_rate = sample_rate;
        self.state = vec![0.0; self.channels];
        self.update_coefficient();
    }

    fn release(&mut self) {
        self.state.fill(0.0);
    }

    fn process_block(&mut self, buffer: &mut SubBlockMut<'_>, _events: &mut EventBuffer) {
        if self.bypassed {
            return;
        }
        let (a, wet) = (self.coefficient, self.mix);
        for (channel, z) in buffer.channels_mut().zip(self.state.iter_mut()) {
            for sample in channel.iter_mut() {
                *z += a * (*sample - *z);
                *sample += wet * (*z - *sample);
            }
        }
    }

    fn parameters(&self) -> Vec<ParameterInfo> {
        vec![
            ParameterInfo::new(CUTOFF_PARAM.0, "Cutoff", self.cutoff),
            ParameterInfo::new(MIX_PARAM.0, "Mix", self.mix),
            ParameterInfo::new(
                LOWPASS_BYPASS_PARAM.0,
                "Bypass",
                f32::from(u8::from(self.bypassed)),
            )
            .bypass(),
        ]
    }

    fn set_parameter_value(&mut self, id: ParameterId, value: f32) {
        let value = value.clamp(0.0, 1.0);
        match id {
            CUTOFF_PARAM => {
                self.cutoff = value;
                self.update_coefficient();
            }
            MIX_PARAM => self.mix = value,
            LOWPASS_BYPASS_PARAM => self.bypassed = value >= 0.5,
            _ => tracing::warn!(id = id.0, "Unknown lowpass parameter"),
        }
    }
}

//! Random parameter automation
//!
//! Each iteration of a session picks `k` in `[0, n)` where `n` is the number
//! of automatable parameters, then makes `k` draws with replacement. Each
//! draw sets one parameter to a uniform value in [0, 1). Because `k < n`, a
//! single iteration never performs `n` draws; repeated iterations still
//! reach every parameter over a session.

use crate::processor::{AudioProcessor, ParameterId};
use rand::Rng;

/// Mutates a fixed snapshot of a processor's automatable parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterAutomator {
    parameters: Vec<ParameterId>,
}

impl ParameterAutomator {
    /// Take the automatable, non-bypass parameter snapshot for a session
    ///
    /// The snapshot is not refreshed afterwards, even if the processor
    /// changes its parameter list.
    pub fn snapshot<P: AudioProcessor + ?Sized>(processor: &P) -> Self {
        Self::from_ids(
            processor
                .automatable_parameters()
                .into_iter()
                .map(|p| p.id)
                .collect(),
        )
    }

    /// Automator over an explicit parameter list
    pub fn from_ids(parameters: Vec<ParameterId>) -> Self {
        Self { parameters }
    }

    /// Parameters in the snapshot, in processor order
    pub fn parameters(&self) -> &[ParameterId] {
        &self.parameters
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Apply one iteration's worth of random parameter changes
    ///
    /// An empty snapshot changes nothing and draws no random numbers.
    pub fn mutate<P, R>(&self, processor: &mut P, rng: &mut R)
    where
        P: AudioProcessor + ?Sized,
        R: Rng + ?Sized,
    {
        let n = self.parameters.len();
        if n == 0 {
            return;
        }

        let changes = rng.gen_range(0..n);
        for _ in 0..changes {
            let id = self.parameters[rng.gen_range(0..n)];
            let value: f32 = rng.gen();
            tracing::trace!(id = id.0, value, "Setting parameter");
            processor.set_parameter_value(id, value);
        }
    }
}

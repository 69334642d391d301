//! Long-session fuzz runner
//!
//! For each configured sample rate the runner walks through
//! `Idle → Preparing → Looping → Draining → Done`:
//! - **Preparing**: release/prepare through the control path, snapshot the
//!   automatable parameters, allocate one buffer of the nominal block size
//! - **Looping**: draw a sub-block size, mutate parameters, fill noise,
//!   process, check the output, report. Repeats until the processed sample
//!   count reaches one simulated session (an hour by default)
//! - **Draining**: log the per-sample-rate summary
//!
//! Randomness is consumed in a fixed order per iteration (size, parameters,
//! noise), so a seeded runner reproduces a run exactly. Bad output never
//! stops a session early.

use crate::audio::buffer::AudioBuffer;
use crate::audio::invariants::{check_block, ViolationReport, AMPLITUDE_THRESHOLD};
use crate::audio::noise::fill_noise;
use crate::config::FuzzOptions;
use crate::fuzz::automation::ParameterAutomator;
use crate::fuzz::report::{
    Reporter, SessionSummary, INF_ASSERTION, LOUD_ASSERTION, NAN_ASSERTION, SUBNORMAL_ASSERTION,
};
use crate::fuzz::scheduler::StimulusScheduler;
use crate::processor::control::{ControlError, ControlPath, InlineControl};
use crate::processor::{AudioProcessor, EventBuffer};
use chrono::Utc;
use rand::Rng;
use std::time::Instant;
use thiserror::Error;

/// Errors that stop a run
///
/// Precondition errors are raised before any processor call. A control
/// error is raised when a lifecycle call could not be issued, and ends the
/// run at that sample rate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FuzzError {
    #[error("No sample rates configured")]
    NoSampleRates,

    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(f64),

    #[error("Nominal block size must be at least 1 frame")]
    InvalidBlockSize,

    #[error("Processor exposes no input or output channels")]
    NoChannels,

    #[error("Lifecycle call failed at sample rate {sample_rate}: {source}")]
    Control {
        sample_rate: f64,
        source: ControlError,
    },
}

/// Where the runner is in its per-sample-rate cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session started yet
    Idle,
    /// Issuing lifecycle calls and taking the parameter snapshot
    Preparing,
    /// Processing sub-blocks
    Looping,
    /// Target reached, summarizing
    Draining,
    /// Session finished
    Done,
}

/// Drives a processor through one fuzz session per sample rate
///
/// The runner owns its random source for its whole lifetime. To fuzz
/// several processors in parallel, give each thread its own runner.
#[derive(Debug)]
pub struct SessionRunner<R, C = InlineControl> {
    options: FuzzOptions,
    rng: R,
    control: C,
    state: SessionState,
}

impl<R: Rng> SessionRunner<R, InlineControl> {
    /// Runner issuing lifecycle calls inline
    ///
    /// # Example
    /// ```
    /// use pluginfuzz_core::{CollectingReporter, FuzzOptions, SessionRunner};
    /// use pluginfuzz_core::processor::reference::PassThrough;
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let options = FuzzOptions::default()
    ///     .with_sample_rates(vec![8000.0])
    ///     .with_session_seconds(0.1);
    /// let mut runner = SessionRunner::new(options, StdRng::seed_from_u64(1));
    /// let mut reporter = CollectingReporter::new();
    ///
    /// let summaries = runner.run(&mut PassThrough::new(2), &mut reporter).unwrap();
    /// assert!(summaries[0].samples_processed >= 800);
    /// assert!(reporter.all_passed());
    /// ```
    pub fn new(options: FuzzOptions, rng: R) -> Self {
        Self::with_control(options, rng, InlineControl)
    }
}

impl<R: Rng, C> SessionRunner<R, C> {
    /// Runner issuing lifecycle calls through `control`
    pub fn with_control(options: FuzzOptions, rng: R, control: C) -> Self {
        Self {
            options,
            rng,
            control,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn options(&self) -> &FuzzOptions {
        &self.options
    }

    pub fn control(&self) -> &C {
        &self.control
    }

    /// Check every precondition of a run against `processor`
    ///
    /// Returns the channel count sessions will use.
    pub fn validate<P: AudioProcessor + ?Sized>(&self, processor: &P) -> Result<usize, FuzzError> {
        if self.options.sample_rates.is_empty() {
            return Err(FuzzError::NoSampleRates);
        }
        if let Some(&bad) = self
            .options
            .sample_rates
            .iter()
            .find(|sr| !sr.is_finite() || **sr <= 0.0)
        {
            return Err(FuzzError::InvalidSampleRate(bad));
        }
        if self.options.block_size == 0 {
            return Err(FuzzError::InvalidBlockSize);
        }

        let channels = processor.required_channels();
        if channels == 0 {
            return Err(FuzzError::NoChannels);
        }
        Ok(channels)
    }

    /// Run one session per configured sample rate, in order
    ///
    /// Fails on precondition violations before touching the processor, or
    /// when the control path cannot issue a lifecycle call. Everything the
    /// processor outputs is reported through `reporter`.
    pub fn run<P, Rep>(
        &mut self,
        processor: &mut P,
        reporter: &mut Rep,
    ) -> Result<Vec<SessionSummary>, FuzzError>
    where
        P: AudioProcessor + ?Sized,
        C: ControlPath<P>,
        Rep: Reporter + ?Sized,
    {
        let channels = self.validate(&*processor).inspect_err(|e| {
            tracing::error!(error = %e, "Fuzz run precondition failed");
        })?;

        let sample_rates = self.options.sample_rates.clone();
        let mut summaries = Vec::with_capacity(sample_rates.len());
        for sample_rate in sample_rates {
            summaries.push(self.run_session(processor, sample_rate, channels, reporter)?);
        }
        Ok(summaries)
    }

    fn run_session<P, Rep>(
        &mut self,
        processor: &mut P,
        sample_rate: f64,
        channels: usize,
        reporter: &mut Rep,
    ) -> Result<SessionSummary, FuzzError>
    where
        P: AudioProcessor + ?Sized,
        C: ControlPath<P>,
        Rep: Reporter + ?Sized,
    {
        let block_size = self.options.block_size;
        let subnormals_are_errors = self.options.strictness.subnormals_are_errors();
        let started_at = Utc::now();
        let clock = Instant::now();

        self.transition(SessionState::Preparing);
        let message = format!("Testing with sample rate [{:.0}]", sample_rate);
        tracing::info!("{}", message);
        reporter.log_message(&message);

        self.control
            .release(processor)
            .and_then(|()| self.control.prepare(processor, sample_rate, block_size))
            .map_err(|source| {
                tracing::error!(sample_rate, error = %source, "Lifecycle call failed");
                FuzzError::Control {
                    sample_rate,
                    source,
                }
            })?;

        let automator = ParameterAutomator::snapshot(&*processor);
        let scheduler = StimulusScheduler::new(block_size);
        let target_samples =
            StimulusScheduler::target_sample_count(sample_rate, self.options.session_seconds);
        let mut buffer = AudioBuffer::new(channels, block_size);
        let mut events = EventBuffer::new();

        tracing::debug!(
            sample_rate,
            target_samples,
            channels,
            parameters = automator.len(),
            "Session prepared"
        );

        let mut samples_processed: u64 = 0;
        let mut sub_blocks: u64 = 0;
        let mut totals = ViolationReport::default();
        let mut failures: u64 = 0;
        let mut warnings: u64 = 0;

        self.transition(SessionState::Looping);
        loop {
            let size = scheduler.next_sub_block_size(&mut self.rng);
            automator.mutate(processor, &mut self.rng);

            let mut block = buffer.sub_block_mut(size);
            fill_noise(&mut block, &mut self.rng);
            processor.process_block(&mut block, &mut events);
            samples_processed += size as u64;
            sub_blocks += 1;
            events.clear();

            let report = check_block(&block.as_sub_block(), AMPLITUDE_THRESHOLD);
            totals.merge(&report);
            let outcome = record_report(&report, subnormals_are_errors, reporter);
            failures += outcome.failures;
            warnings += outcome.warnings;

            if samples_processed >= target_samples {
                break;
            }
        }

        self.transition(SessionState::Draining);
        let summary = SessionSummary {
            sample_rate,
            nominal_block_size: block_size,
            target_samples,
            samples_processed,
            sub_blocks,
            totals,
            failures,
            warnings,
            started_at,
            elapsed_ms: u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX),
        };

        let message = format!(
            "Finished sample rate [{:.0}]: {} samples in {} sub-blocks, {} failures, {} warnings",
            sample_rate, samples_processed, sub_blocks, failures, warnings
        );
        if failures == 0 {
            tracing::info!(elapsed_ms = summary.elapsed_ms, "{}", message);
        } else {
            tracing::warn!(elapsed_ms = summary.elapsed_ms, totals = ?totals, "{}", message);
        }
        reporter.log_message(&message);

        self.transition(SessionState::Done);
        Ok(summary)
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!(from = ?self.state, to = ?next, "Session state change");
        self.state = next;
    }
}

/// Failures and warnings produced by one sub-block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOutcome {
    pub failures: u64,
    pub warnings: u64,
}

/// Turn one sub-block's report into assertions and log lines
///
/// NaN, Inf and over-threshold counts are always asserted to be zero.
/// Subnormals are asserted when `subnormals_are_errors`, otherwise a
/// nonzero count only produces a warning line.
pub fn record_report<Rep: Reporter + ?Sized>(
    report: &ViolationReport,
    subnormals_are_errors: bool,
    reporter: &mut Rep,
) -> ReportOutcome {
    let mut outcome = ReportOutcome::default();

    outcome.failures += expect_zero(reporter, NAN_ASSERTION, report.nan_count);
    outcome.failures += expect_zero(reporter, INF_ASSERTION, report.inf_count);
    outcome.failures += expect_zero(reporter, LOUD_ASSERTION, report.over_threshold_count);

    if subnormals_are_errors {
        outcome.failures += expect_zero(reporter, SUBNORMAL_ASSERTION, report.subnormal_count);
    } else if report.subnormal_count > 0 {
        let message = format!(
            "!!! WARNING: {} subnormals found in buffer",
            report.subnormal_count
        );
        tracing::warn!("{}", message);
        reporter.log_message(&message);
        outcome.warnings += 1;
    }

    outcome
}

/// 1 if the assertion failed, 0 otherwise
fn expect_zero<Rep: Reporter + ?Sized>(reporter: &mut Rep, name: &str, actual: u64) -> u64 {
    u64::from(!reporter.expect_equals(name, 0, actual))
}

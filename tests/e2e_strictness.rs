//! E2E tests for strictness-dependent subnormal handling
//!
//! Up to level 5 subnormal output is a warning line; above it, a failed
//! assertion.

use pluginfuzz::audio::buffer::SubBlockMut;
use pluginfuzz::fuzz::report::SUBNORMAL_ASSERTION;
use pluginfuzz::processor::{EventBuffer, ParameterId, ParameterInfo};
use pluginfuzz::{AudioProcessor, CollectingReporter, FuzzOptions, SessionRunner, SessionSummary};
use rand::{rngs::StdRng, SeedableRng};

/// Scales its output down into the subnormal range
struct Denormalizer {
    channels: usize,
}

impl AudioProcessor for Denormalizer {
    fn total_input_channels(&self) -> usize {
        self.channels
    }

    fn total_output_channels(&self) -> usize {
        self.channels
    }

    fn prepare(&mut self, _sample_rate: f64, _max_block_size: usize) {}

    fn release(&mut self) {}

    fn process_block(&mut self, buffer: &mut SubBlockMut<'_>, _events: &mut EventBuffer) {
        for channel in buffer.channels_mut() {
            for sample in channel.iter_mut() {
                *sample = sample.signum() * (f32::MIN_POSITIVE / 2.0);
            }
        }
    }

    fn parameters(&self) -> Vec<ParameterInfo> {
        Vec::new()
    }

    fn set_parameter_value(&mut self, _id: ParameterId, _value: f32) {}
}

/// Silences its output entirely
struct Silencer;

impl AudioProcessor for Silencer {
    fn total_input_channels(&self) -> usize {
        1
    }

    fn total_output_channels(&self) -> usize {
        1
    }

    fn prepare(&mut self, _sample_rate: f64, _max_block_size: usize) {}

    fn release(&mut self) {}

    fn process_block(&mut self, buffer: &mut SubBlockMut<'_>, _events: &mut EventBuffer) {
        for channel in buffer.channels_mut() {
            channel.fill(0.0);
        }
    }

    fn parameters(&self) -> Vec<ParameterInfo> {
        Vec::new()
    }

    fn set_parameter_value(&mut self, _id: ParameterId, _value: f32) {}
}

fn run_at_level(
    level: i32,
    processor: &mut impl AudioProcessor,
) -> (SessionSummary, CollectingReporter) {
    let options = FuzzOptions::default()
        .with_sample_rates(vec![16000.0])
        .with_block_size(32)
        .with_session_seconds(0.05)
        .with_strictness_level(level);
    let mut runner = SessionRunner::new(options, StdRng::seed_from_u64(5));
    let mut reporter = CollectingReporter::new();
    let mut summaries = runner.run(processor, &mut reporter).unwrap();
    (summaries.remove(0), reporter)
}

#[test]
fn test_lenient_levels_only_warn() {
    for level in [-3, 0, 3, 5] {
        let (summary, reporter) = run_at_level(level, &mut Denormalizer { channels: 2 });

        assert!(summary.totals.subnormal_count > 0);
        assert!(summary.warnings > 0);
        assert_eq!(summary.failures, 0);
        assert!(summary.passed());
        assert!(reporter.all_passed(), "Level {} must not fail", level);
        let warned = reporter
            .messages()
            .iter()
            .any(|m| m.starts_with("!!! WARNING: ") && m.ends_with(" subnormals found in buffer"));
        assert!(warned);
    }
}

#[test]
fn test_warning_counts_whole_block() {
    let (summary, reporter) = run_at_level(5, &mut Denormalizer { channels: 2 });

    // One warning per non-empty sub-block, naming 2 channels x frames
    let warnings: Vec<&String> = reporter
        .messages()
        .iter()
        .filter(|m| m.starts_with("!!! WARNING"))
        .collect();
    assert_eq!(warnings.len() as u64, summary.warnings);
    for line in warnings {
        let count: u64 = line
            .trim_start_matches("!!! WARNING: ")
            .split(' ')
            .next()
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(count % 2, 0);
    }
}

#[test]
fn test_strict_levels_fail() {
    for level in [6, 7, 10, 100] {
        let (summary, reporter) = run_at_level(level, &mut Denormalizer { channels: 1 });

        assert_eq!(summary.warnings, 0);
        assert!(summary.failures > 0);
        assert_eq!(
            summary.failures,
            summary.sub_blocks - empty_blocks(&reporter)
        );
        assert!(!reporter.all_passed(), "Level {} must fail", level);
        assert!(reporter.failures_named(SUBNORMAL_ASSERTION) > 0);
        assert!(!reporter.messages().iter().any(|m| m.contains("WARNING")));
    }
}

/// Number of subnormal assertions that passed, i.e. empty sub-blocks
fn empty_blocks(reporter: &CollectingReporter) -> u64 {
    // Three hard categories always pass for this processor
    let sub_blocks_total = (reporter.passed() + reporter.failed()) / 4;
    reporter.passed() - sub_blocks_total * 3
}

#[test]
fn test_zero_output_is_not_subnormal() {
    for level in [5, 10] {
        let (summary, reporter) = run_at_level(level, &mut Silencer);
        assert!(summary.totals.is_clean());
        assert_eq!(summary.warnings, 0);
        assert!(reporter.all_passed());
    }
}

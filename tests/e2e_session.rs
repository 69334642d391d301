//! E2E tests for full-length fuzz sessions
//!
//! Runs the real one-hour-per-sample-rate session and checks the
//! accounting the runner reports against what the processor actually saw.

use pluginfuzz::audio::buffer::SubBlockMut;
use pluginfuzz::processor::{EventBuffer, ParameterId, ParameterInfo};
use pluginfuzz::{AudioProcessor, CollectingReporter, FuzzOptions, SessionRunner};
use rand::{rngs::StdRng, SeedableRng};

/// Mono identity processor that keeps its own books
#[derive(Default)]
struct Probe {
    inputs: usize,
    outputs: usize,
    lifecycle: Vec<String>,
    prepared_block_size: usize,
    frames_seen: u64,
    blocks_seen: u64,
    empty_blocks: u64,
    largest_block: usize,
    channels_seen: usize,
    processed_before_prepare: bool,
}

impl Probe {
    fn new(inputs: usize, outputs: usize) -> Self {
        Self {
            inputs,
            outputs,
            ..Default::default()
        }
    }
}

impl AudioProcessor for Probe {
    fn total_input_channels(&self) -> usize {
        self.inputs
    }

    fn total_output_channels(&self) -> usize {
        self.outputs
    }

    fn prepare(&mut self, sample_rate: f64, max_block_size: usize) {
        self.lifecycle
            .push(format!("prepare({:.0}, {})", sample_rate, max_block_size));
        self.prepared_block_size = max_block_size;
    }

    fn release(&mut self) {
        self.lifecycle.push("release".to_string());
        self.prepared_block_size = 0;
    }

    fn process_block(&mut self, buffer: &mut SubBlockMut<'_>, _events: &mut EventBuffer) {
        if self.prepared_block_size == 0 {
            self.processed_before_prepare = true;
        }
        let frames = buffer.num_frames();
        self.frames_seen += frames as u64;
        self.blocks_seen += 1;
        self.largest_block = self.largest_block.max(frames);
        self.channels_seen = buffer.num_channels();
        if frames == 0 {
            self.empty_blocks += 1;
        }
    }

    fn parameters(&self) -> Vec<ParameterInfo> {
        Vec::new()
    }

    fn set_parameter_value(&mut self, _id: ParameterId, _value: f32) {}
}

#[test]
fn test_one_hour_session_per_sample_rate() {
    let options = FuzzOptions::default()
        .with_sample_rates(vec![44100.0, 48000.0])
        .with_block_size(512);
    let mut runner = SessionRunner::new(options, StdRng::seed_from_u64(0x5EED));
    let mut reporter = CollectingReporter::new();
    let mut probe = Probe::new(1, 1);

    let summaries = runner.run(&mut probe, &mut reporter).unwrap();
    assert_eq!(summaries.len(), 2);

    for (summary, rate) in summaries.iter().zip([44100u64, 48000]) {
        let hour = rate * 3600;
        assert_eq!(summary.target_samples, hour);
        assert!(
            summary.samples_processed >= hour,
            "At {}Hz only {} of {} samples processed",
            rate,
            summary.samples_processed,
            hour
        );
        assert!(summary.samples_processed < hour + 512);
        assert!(summary.passed());
        assert!(summary.totals.is_clean());

        // Sizes are uniform over [0, 512], mean 256
        let mean = summary.samples_processed as f64 / summary.sub_blocks as f64;
        assert!(
            (mean - 256.0).abs() < 2.0,
            "Mean sub-block size {} at {}Hz",
            mean,
            rate
        );
    }

    let total: u64 = summaries.iter().map(|s| s.samples_processed).sum();
    let blocks: u64 = summaries.iter().map(|s| s.sub_blocks).sum();
    assert_eq!(probe.frames_seen, total);
    assert_eq!(probe.blocks_seen, blocks);
    assert!(probe.largest_block <= 512);
    assert_eq!(probe.largest_block, 512);
    assert!(probe.empty_blocks > 0, "Zero-length sub-blocks must occur");
    assert!(!probe.processed_before_prepare);

    assert!(reporter.all_passed());
    assert_eq!(reporter.passed(), blocks * 3);
}

#[test]
fn test_lifecycle_order_per_sample_rate() {
    let options = FuzzOptions::default()
        .with_sample_rates(vec![44100.0, 96000.0, 22050.0])
        .with_block_size(128)
        .with_session_seconds(0.01);
    let mut runner = SessionRunner::new(options, StdRng::seed_from_u64(1));
    let mut reporter = CollectingReporter::new();
    let mut probe = Probe::new(2, 2);

    runner.run(&mut probe, &mut reporter).unwrap();

    assert_eq!(
        probe.lifecycle,
        vec![
            "release",
            "prepare(44100, 128)",
            "release",
            "prepare(96000, 128)",
            "release",
            "prepare(22050, 128)",
        ]
    );
}

#[test]
fn test_buffer_width_is_max_of_inputs_and_outputs() {
    for (inputs, outputs) in [(1, 3), (4, 2), (0, 2), (2, 0)] {
        let options = FuzzOptions::default()
            .with_sample_rates(vec![8000.0])
            .with_block_size(32)
            .with_session_seconds(0.01);
        let mut runner = SessionRunner::new(options, StdRng::seed_from_u64(3));
        let mut reporter = CollectingReporter::new();
        let mut probe = Probe::new(inputs, outputs);

        runner.run(&mut probe, &mut reporter).unwrap();
        assert_eq!(probe.channels_seen, inputs.max(outputs));
    }
}

#[test]
fn test_failed_preconditions_never_touch_processor() {
    let options = FuzzOptions::default().with_sample_rates(vec![]);
    let mut runner = SessionRunner::new(options, StdRng::seed_from_u64(0));
    let mut reporter = CollectingReporter::new();
    let mut probe = Probe::new(2, 2);

    assert!(runner.run(&mut probe, &mut reporter).is_err());
    assert!(probe.lifecycle.is_empty());
    assert_eq!(probe.blocks_seen, 0);
    assert!(reporter.messages().is_empty());
}

#[test]
fn test_tiny_nominal_block_size() {
    let options = FuzzOptions::default()
        .with_sample_rates(vec![1000.0])
        .with_block_size(1)
        .with_session_seconds(1.0);
    let mut runner = SessionRunner::new(options, StdRng::seed_from_u64(8));
    let mut reporter = CollectingReporter::new();
    let mut probe = Probe::new(1, 1);

    let summaries = runner.run(&mut probe, &mut reporter).unwrap();
    // Sizes are 0 or 1, so the target is hit exactly
    assert_eq!(summaries[0].samples_processed, 1000);
    assert!(probe.empty_blocks > 0);
    assert_eq!(probe.largest_block, 1);
}

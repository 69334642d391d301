//! Control-plane call path for processor lifecycle calls
//!
//! Some plugin formats only accept `release`/`prepare` on a designated
//! control thread, never on the thread that calls `process_block`. The
//! session runner routes every lifecycle call through a [`ControlPath`] and
//! never calls them inline with processing.

use crate::processor::AudioProcessor;
use thiserror::Error;

/// Name given to threads spawned by [`DedicatedThreadControl`]
pub const CONTROL_THREAD_NAME: &str = "pluginfuzz-control";

/// A lifecycle call that could not be issued
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ControlError {
    #[error("Failed to spawn control thread: {message}")]
    Spawn {
        kind: std::io::ErrorKind,
        message: String,
    },
}

impl From<std::io::Error> for ControlError {
    fn from(e: std::io::Error) -> Self {
        ControlError::Spawn {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

/// Path through which lifecycle calls reach a processor
///
/// An `Err` means the call never reached the processor.
pub trait ControlPath<P: AudioProcessor + ?Sized> {
    /// Issue `release()` on the control execution context
    fn release(&mut self, processor: &mut P) -> Result<(), ControlError>;

    /// Issue `prepare(sample_rate, max_block_size)` on the control execution context
    fn prepare(
        &mut self,
        processor: &mut P,
        sample_rate: f64,
        max_block_size: usize,
    ) -> Result<(), ControlError>;
}

/// Calls lifecycle methods directly on the calling thread
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineControl;

impl<P: AudioProcessor + ?Sized> ControlPath<P> for InlineControl {
    fn release(&mut self, processor: &mut P) -> Result<(), ControlError> {
        processor.release();
        Ok(())
    }

    fn prepare(
        &mut self,
        processor: &mut P,
        sample_rate: f64,
        max_block_size: usize,
    ) -> Result<(), ControlError> {
        processor.prepare(sample_rate, max_block_size);
        Ok(())
    }
}

/// Issues each lifecycle call on its own short-lived control thread
///
/// Every call gets a fresh thread named [`CONTROL_THREAD_NAME`], so
/// consecutive calls do not share a thread id. What this guarantees is
/// that lifecycle calls never run on the thread that calls
/// `process_block`. Formats that pin lifecycle calls to one long-lived
/// thread need their own [`ControlPath`].
///
/// The calling thread blocks until the call returns, so ordering relative
/// to processing is unchanged. A panic inside the lifecycle call is
/// re-raised on the calling thread. If the thread cannot be spawned the
/// call is not made and [`ControlError::Spawn`] is returned.
#[derive(Debug, Default)]
pub struct DedicatedThreadControl {
    dispatched: u64,
    stack_size: Option<usize>,
}

impl DedicatedThreadControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stack size in bytes for each control thread
    pub fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    /// Number of lifecycle calls that ran on a control thread
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    fn dispatch<P, F>(&mut self, processor: &mut P, call: F) -> Result<(), ControlError>
    where
        P: ?Sized + Send,
        F: FnOnce(&mut P) + Send,
    {
        let mut builder = std::thread::Builder::new().name(CONTROL_THREAD_NAME.to_string());
        if let Some(bytes) = self.stack_size {
            builder = builder.stack_size(bytes);
        }

        std::thread::scope(|scope| {
            let handle = builder
                .spawn_scoped(scope, move || call(processor))
                .inspect_err(|e| {
                    tracing::error!(error = %e, "Failed to spawn control thread");
                })?;

            if let Err(payload) = handle.join() {
                tracing::error!("Lifecycle call panicked on control thread");
                std::panic::resume_unwind(payload);
            }
            Ok::<(), std::io::Error>(())
        })?;

        self.dispatched += 1;
        Ok(())
    }
}

impl<P: AudioProcessor + Send + ?Sized> ControlPath<P> for DedicatedThreadControl {
    fn release(&mut self, processor: &mut P) -> Result<(), ControlError> {
        tracing::debug!("Dispatching release() to control thread");
        self.dispatch(processor, |p| p.release())
    }

    fn prepare(
        &mut self,
        processor: &mut P,
        sample_rate: f64,
        max_block_size: usize,
    ) -> Result<(), ControlError> {
        tracing::debug!(
            sample_rate,
            max_block_size,
            "Dispatching prepare() to control thread"
        );
        self.dispatch(processor, move |p| p.prepare(sample_rate, max_block_size))
    }
}

//! Audio Processor Trait
//!
//! Defines the interface a host adapter drives: a non-real-time `prepare()`
//! followed by any number of real-time `process()` calls.

use crate::error::DspError;

/// Context passed to processors containing stream metadata
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessContext {
    pub sample_rate: f64,
    pub channels: usize,
    pub max_block_size: usize,
}

impl ProcessContext {
    pub fn new(sample_rate: f64, channels: usize, max_block_size: usize) -> Self {
        Self {
            sample_rate,
            channels,
            max_block_size,
        }
    }
}

/// Trait for planar in-place audio processors
///
/// # Real-time Safety Contract
///
/// Implementors MUST follow these rules in `process()`:
/// - NO heap allocations (no Vec::push, no Box::new, no String)
/// - NO syscalls (no file I/O, no network, no mutex locks)
/// - NO unbounded loops
/// - Constant or O(n) time complexity where n = buffer size
///
/// `prepare()` is exempt and happens-before any `process()` call.
pub trait AudioProcessor: Send {
    /// Allocate buffers and reset all state for a new stream configuration
    fn prepare(&mut self, context: &ProcessContext) -> Result<(), DspError>;

    /// Process planar channel buffers in place
    fn process(&mut self, channels: &mut [&mut [f32]]);

    /// Reset internal state (delay lines, ramps, etc.)
    fn reset(&mut self);

    /// Human-readable name for debugging/UI
    fn name(&self) -> &'static str;

    /// Processing latency in samples
    fn latency_samples(&self) -> usize {
        0
    }

    /// How long the processor keeps producing output after input stops
    fn tail_seconds(&self) -> f64 {
        0.0
    }
}

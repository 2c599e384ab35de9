//! Host-facing Processor
//!
//! Wraps the DSP engine with the parameter store, the layout capability
//! check and state persistence. This is what a plugin wrapper or the
//! standalone stream drives.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};
use crate::layout::{self, ChannelLayout};
use crate::params::IsolatorParams;
use isolator_dsp::{AudioProcessor, IsolatorEngine, ProcessContext};

/// Largest channel count the processor accepts
pub const MAX_CHANNELS: usize = 2;

pub struct IsolatorProcessor {
    params: Arc<IsolatorParams>,
    engine: IsolatorEngine,
    /// Planar scratch for interleaved callers, one buffer per channel
    planar: [Vec<f32>; MAX_CHANNELS],
    channels: usize,
    max_block_size: usize,
}

impl IsolatorProcessor {
    pub fn new(params: Arc<IsolatorParams>) -> Self {
        Self {
            params,
            engine: IsolatorEngine::new(),
            planar: [Vec::new(), Vec::new()],
            channels: 0,
            max_block_size: 0,
        }
    }

    pub fn params(&self) -> &Arc<IsolatorParams> {
        &self.params
    }

    /// Mono to mono or stereo to stereo only
    pub fn supports_layout(input: ChannelLayout, output: ChannelLayout) -> bool {
        layout::supports_layout(input, output)
    }

    /// Prepare for a stream. Allocates; call before the first block.
    pub fn prepare(&mut self, sample_rate: f64, max_block_size: usize, channels: usize) -> EngineResult<()> {
        layout::check_layout(channels, channels)?;

        let max_block_size = max_block_size.max(1);
        self.engine.set_targets(self.params.snapshot());
        self.engine
            .prepare(&ProcessContext::new(sample_rate, channels, max_block_size))?;

        // Only commit once the engine accepted the configuration, so a failed
        // re-prepare leaves the previous one fully intact.
        for buffer in &mut self.planar {
            buffer.clear();
            buffer.resize(max_block_size, 0.0);
        }
        self.channels = channels;
        self.max_block_size = max_block_size;
        info!(sample_rate, channels, max_block_size, "Processor prepared");
        Ok(())
    }

    /// Process planar buffers in place.
    ///
    /// `num_inputs` is the number of channels that carry input; any further
    /// output channels are cleared. Parameters are read once per call.
    pub fn process_block(&mut self, channels: &mut [&mut [f32]], num_inputs: usize) {
        let num_inputs = num_inputs.min(channels.len());
        for channel in channels[num_inputs..].iter_mut() {
            channel.fill(0.0);
        }

        self.engine.set_targets(self.params.snapshot());
        self.engine.process(&mut channels[..num_inputs]);
    }

    /// Process an interleaved buffer in place using the prepared channel count.
    ///
    /// # Real-time Safety
    /// Uses the planar scratch allocated in `prepare()`; never allocates.
    pub fn process_interleaved(&mut self, data: &mut [f32]) {
        self.engine.set_targets(self.params.snapshot());
        if self.channels == 0 {
            return;
        }

        let channels = self.channels;
        let frames = data.len() / channels;
        let [left, right] = &mut self.planar;

        let mut start = 0;
        while start < frames {
            let len = (frames - start).min(self.max_block_size).min(left.len());
            let block = &mut data[start * channels..(start + len) * channels];

            if channels == 1 {
                left[..len].copy_from_slice(block);
                self.engine.process(&mut [&mut left[..len]]);
                block.copy_from_slice(&left[..len]);
            } else {
                for (i, frame) in block.chunks_exact(2).enumerate() {
                    left[i] = frame[0];
                    right[i] = frame[1];
                }
                self.engine
                    .process(&mut [&mut left[..len], &mut right[..len]]);
                for (i, frame) in block.chunks_exact_mut(2).enumerate() {
                    frame[0] = left[i];
                    frame[1] = right[i];
                }
            }
            start += len;
        }
    }

    /// Serialize the current parameters
    pub fn get_state(&self) -> EngineResult<Vec<u8>> {
        serde_json::to_vec(&self.params.get_state())
            .map_err(|e| EngineError::InvalidState(e.to_string()))
    }

    /// Restore parameters from a serialized document.
    ///
    /// Never fails: a corrupt document is logged and leaves every parameter
    /// unchanged. Returns the number of parameters applied.
    pub fn set_state(&self, data: &[u8]) -> usize {
        let result = std::str::from_utf8(data)
            .map_err(|e| EngineError::InvalidState(e.to_string()))
            .and_then(|json| self.params.set_state_json(json));

        match result {
            Ok(applied) => {
                debug!(applied, "State restored");
                applied
            }
            Err(e) => {
                warn!("Ignoring state: {}", e);
                0
            }
        }
    }

    /// Stream stopped. Parameters are kept; filter state is cleared.
    pub fn release(&mut self) {
        self.engine.reset();
        debug!("Processor released");
    }

    pub fn set_fast_path_enabled(&mut self, enabled: bool) {
        self.engine.set_fast_path_enabled(enabled);
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn latency_samples(&self) -> usize {
        self.engine.latency_samples()
    }

    pub fn tail_seconds(&self) -> f64 {
        self.engine.tail_seconds()
    }

    pub fn name(&self) -> &'static str {
        self.engine.name()
    }
}

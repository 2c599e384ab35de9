//! Stream and Engine Configuration

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::processor::MAX_CHANNELS;
use isolator_dsp::ProcessContext;

/// Audio stream configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Sample rate in Hz (e.g., 44100, 48000, 96000)
    pub sample_rate: u32,

    /// Number of audio channels (1 = mono, 2 = stereo)
    pub channels: u16,

    /// Buffer size in frames (lower = less latency, higher = more stability)
    pub buffer_size: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            channels: 2,
            buffer_size: 512,
        }
    }
}

impl StreamConfig {
    /// Latency of one buffer in milliseconds
    pub fn latency_ms(&self) -> f32 {
        (self.buffer_size as f32 / self.sample_rate as f32) * 1000.0
    }

    /// Reject anything the processor cannot be prepared with
    pub fn validate(&self) -> EngineResult<()> {
        if !(8000..=192000).contains(&self.sample_rate) {
            return Err(EngineError::ConfigError(format!(
                "Invalid sample rate: {}",
                self.sample_rate
            )));
        }
        if self.channels == 0 || self.channels as usize > MAX_CHANNELS {
            return Err(EngineError::ConfigError(format!(
                "Invalid channel count: {}",
                self.channels
            )));
        }
        if !(32..=8192).contains(&self.buffer_size) {
            return Err(EngineError::ConfigError(format!(
                "Invalid buffer size: {}",
                self.buffer_size
            )));
        }
        Ok(())
    }

    pub fn process_context(&self) -> ProcessContext {
        ProcessContext::new(
            self.sample_rate as f64,
            self.channels as usize,
            self.buffer_size as usize,
        )
    }
}

/// Standalone engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub stream: StreamConfig,

    /// Capture-to-output ring buffer capacity in frames
    pub ring_buffer_frames: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_stream(StreamConfig::default())
    }
}

impl EngineConfig {
    /// Four buffers of ring capacity
    pub fn from_stream(stream: StreamConfig) -> Self {
        Self {
            stream,
            ring_buffer_frames: stream.buffer_size as usize * 4,
        }
    }

    /// ~2.7ms buffers at 48kHz
    pub fn low_latency() -> Self {
        Self {
            stream: StreamConfig {
                buffer_size: 128,
                ..StreamConfig::default()
            },
            ring_buffer_frames: 128 * 8,
        }
    }

    /// ~21ms buffers at 48kHz
    pub fn stable() -> Self {
        Self {
            stream: StreamConfig {
                buffer_size: 1024,
                ..StreamConfig::default()
            },
            ring_buffer_frames: 1024 * 4,
        }
    }

    /// Ring capacity in samples
    pub fn ring_buffer_samples(&self) -> usize {
        self.ring_buffer_frames.max(self.stream.buffer_size as usize) * self.stream.channels as usize
    }
}

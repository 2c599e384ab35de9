//! DSP Error Types

use thiserror::Error;

/// Errors that can occur during DSP operations
#[derive(Error, Debug)]
pub enum DspError {
    #[error("Invalid filter coefficients for frequency {frequency}Hz at sample rate {sample_rate}Hz")]
    InvalidCoefficients { frequency: f32, sample_rate: f64 },

    #[error("Sample rate must be positive, got {0}")]
    InvalidSampleRate(f64),

    #[error("Invalid channel index: {channel} (prepared for {channels})")]
    InvalidChannel { channel: usize, channels: usize },
}

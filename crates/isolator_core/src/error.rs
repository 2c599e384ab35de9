//! Engine Error Types

use thiserror::Error;

/// Errors that can occur in the host adapter
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unsupported channel layout: {input} in, {output} out")]
    UnsupportedLayout { input: usize, output: usize },

    #[error("No audio devices found")]
    NoDevicesFound,

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Failed to build audio stream: {0}")]
    StreamBuildError(String),

    #[error("Failed to play audio stream: {0}")]
    StreamPlayError(String),

    #[error("Stream configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid state document: {0}")]
    InvalidState(String),

    #[error("Settings error: {0}")]
    SettingsError(String),

    #[error("DSP error: {0}")]
    DspError(#[from] isolator_dsp::DspError),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

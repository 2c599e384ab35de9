//! Isolator Core - Host Adapter
//!
//! Everything between the pure DSP engine and a host:
//! - Lock-free parameter store shared by control and audio threads
//! - State document save/restore
//! - Channel layout capability check
//! - Settings persistence and stream configuration
//! - A cpal duplex stream for the standalone app
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Control Thread                          │
//! │  console / host ──set()──▶ IsolatorParams (atomics)         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ snapshot() once per block
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Audio Thread                           │
//! │   Capture ──rtrb──▶ IsolatorProcessor ──▶ Output            │
//! │              (Zero allocation in this path)                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ crossbeam-channel
//!                              ▼
//!                       Event (underruns, errors)
//! ```

mod config;
mod device;
mod error;
mod layout;
mod message;
mod params;
mod processor;
mod settings;
mod state;
mod stream;

pub use config::{EngineConfig, StreamConfig};
pub use device::{find_device, AudioDevice, DeviceType};
pub use error::{EngineError, EngineResult};
pub use layout::{check_layout, supports_layout, ChannelLayout};
pub use message::Event;
pub use params::{quantize_gain, IsolatorParams, ParamId, GAIN_STEP_DB};
pub use processor::{IsolatorProcessor, MAX_CHANNELS};
pub use settings::IsolatorSettings;
pub use state::EqState;
pub use stream::{interleaved_peaks, AudioStream, SharedState};

// Re-export DSP types for convenience
pub use isolator_dsp::{Band, BandTargets, GAIN_MAX_DB, GAIN_MIN_DB, NUM_BANDS};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_exports() {
        let _config = EngineConfig::default();
        let params = IsolatorParams::new();
        assert_eq!(params.get_state(), EqState::default());
        assert_eq!(ParamId::ALL.len(), 2 * NUM_BANDS);
    }
}

//! Events sent from the audio callbacks to the control thread

use serde::{Deserialize, Serialize};

use crate::state::EqState;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Event {
    /// Streams built and playing
    Started { sample_rate: u32, channels: u16 },

    Stopped,

    Error { message: String },

    /// Parameter snapshot, sent after a control change
    StateUpdate(EqState),

    /// Output callback found the capture ring short and padded with silence
    BufferUnderrun,

    /// Capture ring was full and input samples were dropped
    BufferOverrun,
}

impl Event {
    /// Create an error event from any error type
    pub fn error<E: std::fmt::Display>(err: E) -> Self {
        Event::Error {
            message: err.to_string(),
        }
    }
}

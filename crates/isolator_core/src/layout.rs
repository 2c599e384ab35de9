//! Channel Layout Capability

use crate::error::{EngineError, EngineResult};

/// Channel layout of one side of the processor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    Mono,
    Stereo,
    Other(usize),
}

impl ChannelLayout {
    pub fn from_count(channels: usize) -> Self {
        match channels {
            1 => ChannelLayout::Mono,
            2 => ChannelLayout::Stereo,
            n => ChannelLayout::Other(n),
        }
    }

    pub fn channel_count(self) -> usize {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
            ChannelLayout::Other(n) => n,
        }
    }
}

/// Mono to mono and stereo to stereo only
pub fn supports_layout(input: ChannelLayout, output: ChannelLayout) -> bool {
    matches!(output, ChannelLayout::Mono | ChannelLayout::Stereo) && input == output
}

pub fn check_layout(input: usize, output: usize) -> EngineResult<()> {
    if supports_layout(ChannelLayout::from_count(input), ChannelLayout::from_count(output)) {
        Ok(())
    } else {
        Err(EngineError::UnsupportedLayout { input, output })
    }
}

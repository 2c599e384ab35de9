//! Band Definitions
//!
//! The isolator always splits into exactly four bands at fixed crossovers.

/// Number of bands. Fixed; bands are never added or removed at runtime.
pub const NUM_BANDS: usize = 4;

/// Crossover frequencies (Hz) between adjacent bands:
/// Low | LowMid at 200 Hz, LowMid | Mid at 750 Hz, Mid | High at 3 kHz
pub const CROSSOVER_FREQUENCIES: [f32; 3] = [200.0, 750.0, 3000.0];

/// Lowest band gain in dB. At this value the band is fully muted.
pub const GAIN_MIN_DB: f32 = -100.0;

/// Highest band gain in dB
pub const GAIN_MAX_DB: f32 = 24.0;

/// One of the four fixed frequency ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    /// 20 Hz - 200 Hz
    Low,
    /// 200 Hz - 750 Hz
    LowMid,
    /// 750 Hz - 3 kHz
    Mid,
    /// 3 kHz - 20 kHz
    High,
}

impl Band {
    /// All bands in mixing order
    pub const ALL: [Band; NUM_BANDS] = [Band::Low, Band::LowMid, Band::Mid, Band::High];

    /// Position of this band in per-band arrays
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Band::Low => 0,
            Band::LowMid => 1,
            Band::Mid => 2,
            Band::High => 3,
        }
    }

    /// Gain ramp time in seconds.
    ///
    /// The low band gets the longest ramp: its narrow low-pass response
    /// has the most transient settling behavior.
    pub const fn gain_ramp_seconds(self) -> f64 {
        match self {
            Band::Low => 0.160,
            Band::LowMid => 0.015,
            Band::Mid => 0.012,
            Band::High => 0.010,
        }
    }

    /// Bypass ramp time in seconds. Bypass clicks are louder at low
    /// frequencies, so lower bands ramp for longer.
    pub const fn bypass_ramp_seconds(self) -> f64 {
        match self {
            Band::Low => 0.080,
            Band::LowMid => 0.050,
            Band::Mid => 0.040,
            Band::High => 0.025,
        }
    }

    /// Human-readable label including the frequency range
    pub const fn label(self) -> &'static str {
        match self {
            Band::Low => "Low (20-200Hz)",
            Band::LowMid => "Low-Mid (200-750Hz)",
            Band::Mid => "Mid (750Hz-3kHz)",
            Band::High => "High (3-20kHz)",
        }
    }
}

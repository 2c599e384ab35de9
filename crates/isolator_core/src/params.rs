//! Host Parameters
//!
//! Eight scalar parameters (gain and bypass per band) shared between the
//! control thread and the audio callback.
//!
//! # Threading contract
//!
//! One writer (control surface, state restore) and one reader (audio
//! callback) per parameter. Values are stored in atomics with relaxed
//! ordering: reads are never torn, but the audio callback may see a value
//! up to one block late. The smoothing ramps absorb that staleness, so no
//! lock or fence is needed.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use isolator_dsp::{Band, BandTargets, GAIN_MAX_DB, GAIN_MIN_DB, NUM_BANDS};

/// Gain parameter resolution in dB
pub const GAIN_STEP_DB: f32 = 0.1;
const GAIN_STEPS_PER_DB: f32 = 10.0;

/// Identifier of one of the eight host parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    LowGain,
    LowMidGain,
    MidGain,
    HighGain,
    LowBypass,
    LowMidBypass,
    MidBypass,
    HighBypass,
}

impl ParamId {
    pub const ALL: [ParamId; 8] = [
        ParamId::LowGain,
        ParamId::LowMidGain,
        ParamId::MidGain,
        ParamId::HighGain,
        ParamId::LowBypass,
        ParamId::LowMidBypass,
        ParamId::MidBypass,
        ParamId::HighBypass,
    ];

    /// Stable key used in state documents. Never change these.
    pub const fn key(self) -> &'static str {
        match self {
            ParamId::LowGain => "low_gain",
            ParamId::LowMidGain => "lowmid_gain",
            ParamId::MidGain => "mid_gain",
            ParamId::HighGain => "high_gain",
            ParamId::LowBypass => "low_bypass",
            ParamId::LowMidBypass => "lowmid_bypass",
            ParamId::MidBypass => "mid_bypass",
            ParamId::HighBypass => "high_bypass",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.key() == key)
    }

    pub const fn band(self) -> Band {
        match self {
            ParamId::LowGain | ParamId::LowBypass => Band::Low,
            ParamId::LowMidGain | ParamId::LowMidBypass => Band::LowMid,
            ParamId::MidGain | ParamId::MidBypass => Band::Mid,
            ParamId::HighGain | ParamId::HighBypass => Band::High,
        }
    }

    pub const fn is_bypass(self) -> bool {
        matches!(
            self,
            ParamId::LowBypass | ParamId::LowMidBypass | ParamId::MidBypass | ParamId::HighBypass
        )
    }

    /// Name shown to the user by hosts and control surfaces
    pub const fn display_name(self) -> &'static str {
        match self {
            ParamId::LowGain => "Low Gain (20-200Hz)",
            ParamId::LowMidGain => "Low-Mid Gain (200-750Hz)",
            ParamId::MidGain => "Mid Gain (750Hz-3kHz)",
            ParamId::HighGain => "High Gain (3-20kHz)",
            ParamId::LowBypass => "Low Band Bypass",
            ParamId::LowMidBypass => "Low-Mid Band Bypass",
            ParamId::MidBypass => "Mid Band Bypass",
            ParamId::HighBypass => "High Band Bypass",
        }
    }

    /// Format a value of this parameter for display
    pub fn format_value(self, value: f32) -> String {
        if self.is_bypass() {
            if value >= 0.5 { "Bypassed" } else { "Active" }.to_string()
        } else {
            format!("{:.1} dB", value)
        }
    }
}

/// Clamp to the gain range and snap to the 0.1 dB grid
pub fn quantize_gain(gain_db: f32) -> f32 {
    if gain_db.is_nan() {
        return 0.0;
    }
    let clamped = gain_db.clamp(GAIN_MIN_DB, GAIN_MAX_DB);
    (clamped * GAIN_STEPS_PER_DB).round() / GAIN_STEPS_PER_DB
}

/// Lock-free parameter store shared by the control thread and audio callback
pub struct IsolatorParams {
    /// Gains in dB, stored as f32 bits
    /// Rust pattern: AtomicF32 doesn't exist, so we use bit-casting
    gains_bits: [AtomicU32; NUM_BANDS],
    bypassed: [AtomicBool; NUM_BANDS],
}

impl IsolatorParams {
    /// All bands at 0 dB and active
    pub fn new() -> Self {
        Self {
            gains_bits: core::array::from_fn(|_| AtomicU32::new(0.0_f32.to_bits())),
            bypassed: core::array::from_fn(|_| AtomicBool::new(false)),
        }
    }

    pub fn gain_db(&self, band: Band) -> f32 {
        f32::from_bits(self.gains_bits[band.index()].load(Ordering::Relaxed))
    }

    /// Store a gain, clamped to [-100, 24] dB on the 0.1 dB grid
    pub fn set_gain_db(&self, band: Band, gain_db: f32) {
        self.gains_bits[band.index()].store(quantize_gain(gain_db).to_bits(), Ordering::Relaxed);
    }

    pub fn is_bypassed(&self, band: Band) -> bool {
        self.bypassed[band.index()].load(Ordering::Relaxed)
    }

    pub fn set_bypassed(&self, band: Band, bypassed: bool) {
        self.bypassed[band.index()].store(bypassed, Ordering::Relaxed);
    }

    /// Read a parameter as a plain number. Bypass reads as 0.0 or 1.0.
    pub fn get(&self, id: ParamId) -> f32 {
        if id.is_bypass() {
            if self.is_bypassed(id.band()) { 1.0 } else { 0.0 }
        } else {
            self.gain_db(id.band())
        }
    }

    /// Write a parameter from a plain number. Bypass is set for values >= 0.5.
    pub fn set(&self, id: ParamId, value: f32) {
        if id.is_bypass() {
            self.set_bypassed(id.band(), value >= 0.5);
        } else {
            self.set_gain_db(id.band(), value);
        }
    }

    /// Read all eight values for one block.
    ///
    /// Each value is read atomically; the set as a whole is not a
    /// transaction, which the one-block staleness contract allows.
    #[inline]
    pub fn snapshot(&self) -> BandTargets {
        BandTargets {
            gains_db: core::array::from_fn(|i| f32::from_bits(self.gains_bits[i].load(Ordering::Relaxed))),
            bypassed: core::array::from_fn(|i| self.bypassed[i].load(Ordering::Relaxed)),
        }
    }
}

impl Default for IsolatorParams {
    fn default() -> Self {
        Self::new()
    }
}

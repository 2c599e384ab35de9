//! Isolator DSP - Digital Signal Processing Module
//!
//! This crate provides the audio processing engine for Isolator, including:
//! - Four-band crossover filter bank built from cascaded BiQuad sections
//! - Per-band gain and bypass with click-free parameter smoothing
//! - DC blocker on the low band
//! - Transparency fast path for bit-exact passthrough at neutral settings
//! - Zero-allocation processing path
//!
//! # Architecture
//!
//! ```text
//!            ┌─▶ LP 200 ─▶ LP 200 ─▶ DC block ─▶ × gain × bypass ─┐
//!            ├─▶ HP 200 ─▶ LP 750 ───────────▶ × gain × bypass ─┤
//!   input ───┤                                                    ├─▶ Σ ─▶ output
//!            ├─▶ HP 750 ─▶ LP 3000 ──────────▶ × gain × bypass ─┤
//!            └─▶ HP 3000 ─▶ HP 3000 ─────────▶ × gain × bypass ─┘
//! ```
//!
//! The DSP chain follows a strict "no allocation in audio callback" rule.
//! All buffers and filter coefficients are set up in `prepare()`; the block
//! path only reads them.

mod band;
mod crossover;
mod curves;
mod dc_blocker;
mod engine;
mod error;
mod mixer;
mod processor;
mod smoother;

pub use band::{Band, CROSSOVER_FREQUENCIES, GAIN_MAX_DB, GAIN_MIN_DB, NUM_BANDS};
pub use crossover::{CoefficientCache, CrossoverBank, FilterChain};
pub use curves::{db_to_gain, smoothstep, ControlCurves};
pub use dc_blocker::{DcBlocker, DC_BLOCKER_CUTOFF_HZ};
pub use engine::{BandTargets, IsolatorEngine};
pub use error::DspError;
pub use mixer::{mix_bands, mix_static};
pub use processor::{AudioProcessor, ProcessContext};
pub use smoother::SmoothedValue;

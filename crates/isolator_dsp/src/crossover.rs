//! Four-Band Crossover Filter Bank
//!
//! Each band is a cascade of two second-order Butterworth sections
//! (RBJ cookbook designs via the `biquad` crate):
//!
//! | Band    | Section 1   | Section 2   |
//! |---------|-------------|-------------|
//! | Low     | LP 200 Hz   | LP 200 Hz   |
//! | Low-Mid | HP 200 Hz   | LP 750 Hz   |
//! | Mid     | HP 750 Hz   | LP 3 kHz    |
//! | High    | HP 3 kHz    | HP 3 kHz    |
//!
//! Coefficients depend only on the sample rate, so they are computed once per
//! rate and shared by every channel. Filter state is per channel.

use biquad::{Biquad, Coefficients, DirectForm2Transposed, ToHertz, Type, Q_BUTTERWORTH_F32};
use tracing::debug;

use crate::band::{Band, CROSSOVER_FREQUENCIES, NUM_BANDS};
use crate::error::DspError;

/// The six section designs needed by the bank, one low-pass and one
/// high-pass per crossover frequency.
#[derive(Debug, Clone, Copy)]
pub struct CrossoverCoefficients {
    low_pass: [Coefficients<f32>; 3],
    high_pass: [Coefficients<f32>; 3],
}

impl CrossoverCoefficients {
    fn design(sample_rate: f64) -> Result<Self, DspError> {
        let mut low_pass = [Self::section(Type::LowPass, sample_rate, CROSSOVER_FREQUENCIES[0])?; 3];
        let mut high_pass = [Self::section(Type::HighPass, sample_rate, CROSSOVER_FREQUENCIES[0])?; 3];

        for i in 1..CROSSOVER_FREQUENCIES.len() {
            low_pass[i] = Self::section(Type::LowPass, sample_rate, CROSSOVER_FREQUENCIES[i])?;
            high_pass[i] = Self::section(Type::HighPass, sample_rate, CROSSOVER_FREQUENCIES[i])?;
        }

        Ok(Self { low_pass, high_pass })
    }

    fn section(filter: Type<f32>, sample_rate: f64, frequency: f32) -> Result<Coefficients<f32>, DspError> {
        Coefficients::<f32>::from_params(filter, (sample_rate as f32).hz(), frequency.hz(), Q_BUTTERWORTH_F32)
            .map_err(|_| DspError::InvalidCoefficients {
                frequency,
                sample_rate,
            })
    }

    /// Both section designs for `band`, in processing order
    pub fn sections(&self, band: Band) -> [Coefficients<f32>; 2] {
        match band {
            Band::Low => [self.low_pass[0], self.low_pass[0]],
            Band::LowMid => [self.high_pass[0], self.low_pass[1]],
            Band::Mid => [self.high_pass[1], self.low_pass[2]],
            Band::High => [self.high_pass[2], self.high_pass[2]],
        }
    }
}

/// Coefficient designs keyed by the last sample rate seen.
///
/// Owned by a single bank; two banks running at different rates never
/// share or invalidate each other's coefficients.
#[derive(Debug, Default)]
pub struct CoefficientCache {
    entry: Option<(f64, CrossoverCoefficients)>,
    computations: usize,
}

impl CoefficientCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure the cached designs match `sample_rate`.
    ///
    /// Returns `true` if the coefficients had to be recomputed.
    pub fn refresh(&mut self, sample_rate: f64) -> Result<bool, DspError> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(DspError::InvalidSampleRate(sample_rate));
        }

        if matches!(self.entry, Some((rate, _)) if rate == sample_rate) {
            return Ok(false);
        }

        let coefficients = CrossoverCoefficients::design(sample_rate)?;
        self.entry = Some((sample_rate, coefficients));
        self.computations += 1;
        Ok(true)
    }

    /// Cached designs, if any rate has been seen yet
    pub fn current(&self) -> Option<&CrossoverCoefficients> {
        self.entry.as_ref().map(|(_, coefficients)| coefficients)
    }

    /// Sample rate the cached designs were computed for
    pub fn sample_rate(&self) -> Option<f64> {
        self.entry.map(|(rate, _)| rate)
    }

    /// How many times designs have been computed (diagnostics)
    pub fn computations(&self) -> usize {
        self.computations
    }
}

/// Two cascaded second-order sections for one band of one channel
pub struct FilterChain {
    // DirectForm2Transposed: better numerical stability than DF1
    sections: [DirectForm2Transposed<f32>; 2],
}

impl FilterChain {
    pub fn new(coefficients: [Coefficients<f32>; 2]) -> Self {
        Self {
            sections: coefficients.map(DirectForm2Transposed::<f32>::new),
        }
    }

    /// Filter `buffer` in place.
    ///
    /// # Real-time Safety
    /// No allocations. O(n) where n = buffer length.
    #[inline]
    pub fn process(&mut self, buffer: &mut [f32]) {
        let [first, second] = &mut self.sections;
        for sample in buffer.iter_mut() {
            *sample = second.run(first.run(*sample));
        }
    }

    /// Clear the delay registers of both sections
    pub fn reset(&mut self) {
        for section in &mut self.sections {
            section.reset_state();
        }
    }
}

/// Per-channel filter chains for all four bands
pub struct CrossoverBank {
    cache: CoefficientCache,
    chains: Vec<[FilterChain; NUM_BANDS]>,
}

impl CrossoverBank {
    pub fn new() -> Self {
        Self {
            cache: CoefficientCache::new(),
            chains: Vec::new(),
        }
    }

    /// Allocate one chain per channel per band and clear all filter state.
    ///
    /// Allocates. Call from the non-real-time prepare phase only.
    pub fn prepare(&mut self, sample_rate: f64, num_channels: usize) -> Result<(), DspError> {
        let recomputed = self.cache.refresh(sample_rate)?;
        let coefficients = *self
            .cache
            .current()
            .ok_or(DspError::InvalidSampleRate(sample_rate))?;

        self.chains = (0..num_channels)
            .map(|_| core::array::from_fn(|i| FilterChain::new(coefficients.sections(Band::ALL[i]))))
            .collect();

        debug!(
            sample_rate,
            num_channels, recomputed, "Crossover bank prepared"
        );
        Ok(())
    }

    /// Filter `buffer` in place through `band`'s cascade for `channel`
    ///
    /// # Real-time Safety
    /// No allocations, no locks.
    #[inline]
    pub fn process(&mut self, band: Band, channel: usize, buffer: &mut [f32]) -> Result<(), DspError> {
        let channels = self.chains.len();
        let chains = self
            .chains
            .get_mut(channel)
            .ok_or(DspError::InvalidChannel { channel, channels })?;
        chains[band.index()].process(buffer);
        Ok(())
    }

    /// Every channel's chains, indexed by channel then band
    #[inline]
    pub fn chains_mut(&mut self) -> &mut [[FilterChain; NUM_BANDS]] {
        &mut self.chains
    }

    /// Clear filter state without touching coefficients
    pub fn reset(&mut self) {
        for chains in &mut self.chains {
            for chain in chains.iter_mut() {
                chain.reset();
            }
        }
    }

    pub fn num_channels(&self) -> usize {
        self.chains.len()
    }

    pub fn cache(&self) -> &CoefficientCache {
        &self.cache
    }
}

impl Default for CrossoverBank {
    fn default() -> Self {
        Self::new()
    }
}

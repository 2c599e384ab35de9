//! Four-Band Isolator Engine
//!
//! Ties the crossover bank, DC blocker, control curves and mixer together.
//!
//! Per block:
//! 1. If every band is at exactly 0 dB and active, return the input untouched.
//! 2. Set the smoother targets from the latest [`BandTargets`].
//! 3. Expand the smoothers into per-sample gain and bypass curves.
//! 4. For each channel, copy the input into four scratch buffers, run each
//!    through its band cascade (plus the DC blocker for the low band), and
//!    mix the weighted bands back into the channel buffer.
//!
//! Blocks longer than the prepared maximum are processed in sub-blocks so the
//! real-time path never has to grow a buffer.

use tracing::{debug, info};

use crate::band::{Band, CROSSOVER_FREQUENCIES, GAIN_MAX_DB, GAIN_MIN_DB, NUM_BANDS};
use crate::crossover::CrossoverBank;
use crate::curves::ControlCurves;
use crate::dc_blocker::DcBlocker;
use crate::error::DspError;
use crate::mixer::mix_bands;
use crate::processor::{AudioProcessor, ProcessContext};
use crate::smoother::SmoothedValue;

/// Raw per-band parameter values, read once per block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandTargets {
    pub gains_db: [f32; NUM_BANDS],
    pub bypassed: [bool; NUM_BANDS],
}

impl Default for BandTargets {
    fn default() -> Self {
        Self {
            gains_db: [0.0; NUM_BANDS],
            bypassed: [false; NUM_BANDS],
        }
    }
}

impl BandTargets {
    pub fn with_gain(mut self, band: Band, gain_db: f32) -> Self {
        self.gains_db[band.index()] = gain_db;
        self
    }

    pub fn with_bypass(mut self, band: Band, bypassed: bool) -> Self {
        self.bypassed[band.index()] = bypassed;
        self
    }

    /// Every band at exactly 0 dB and none bypassed
    pub fn is_neutral(&self) -> bool {
        self.gains_db.iter().all(|&g| g == 0.0) && !self.bypassed.iter().any(|&b| b)
    }

    /// Gains clamped into [-100, 24] dB. NaN is treated as 0 dB.
    pub fn clamped(mut self) -> Self {
        for gain in &mut self.gains_db {
            *gain = if gain.is_nan() {
                0.0
            } else {
                gain.clamp(GAIN_MIN_DB, GAIN_MAX_DB)
            };
        }
        self
    }

    /// Smoother target for the bypass factor: 1 = active, 0 = bypassed
    fn bypass_factor(&self, band: usize) -> f32 {
        if self.bypassed[band] {
            0.0
        } else {
            1.0
        }
    }
}

/// Pure DSP engine. No host dependencies; drive it with `prepare()` and
/// `process()`.
pub struct IsolatorEngine {
    bank: CrossoverBank,
    dc_blocker: DcBlocker,
    curves: ControlCurves,
    /// One mono buffer per band per channel
    scratch: Vec<[Vec<f32>; NUM_BANDS]>,
    gain_smoothers: [SmoothedValue; NUM_BANDS],
    bypass_smoothers: [SmoothedValue; NUM_BANDS],
    /// Seeded with the fixed crossovers at prepare time; not used by the block path
    crossover_smoothers: [SmoothedValue; 3],
    targets: BandTargets,
    fast_path: bool,
    context: Option<ProcessContext>,
}

impl IsolatorEngine {
    pub fn new() -> Self {
        Self {
            bank: CrossoverBank::new(),
            dc_blocker: DcBlocker::new(),
            curves: ControlCurves::default(),
            scratch: Vec::new(),
            gain_smoothers: [SmoothedValue::new(0.0); NUM_BANDS],
            bypass_smoothers: [SmoothedValue::new(1.0); NUM_BANDS],
            crossover_smoothers: CROSSOVER_FREQUENCIES.map(SmoothedValue::new),
            targets: BandTargets::default(),
            fast_path: true,
            context: None,
        }
    }

    /// Allocate all buffers and reset filter, DC blocker and smoother state.
    ///
    /// Smoothers jump straight to the current targets so playback does not
    /// start with a ramp. Allocates; never call from the audio callback.
    pub fn prepare(&mut self, context: &ProcessContext) -> Result<(), DspError> {
        let max_block_size = context.max_block_size.max(1);
        let sample_rate = context.sample_rate;

        self.bank.prepare(sample_rate, context.channels)?;
        self.dc_blocker.prepare(sample_rate, context.channels);
        self.curves = ControlCurves::with_capacity(max_block_size);
        self.scratch = (0..context.channels)
            .map(|_| core::array::from_fn(|_| vec![0.0; max_block_size]))
            .collect();

        let targets = self.targets.clamped();
        for band in Band::ALL {
            let i = band.index();
            self.gain_smoothers[i].reset(sample_rate, band.gain_ramp_seconds());
            self.gain_smoothers[i].set_current_and_target_value(targets.gains_db[i]);
            self.bypass_smoothers[i].reset(sample_rate, band.bypass_ramp_seconds());
            self.bypass_smoothers[i].set_current_and_target_value(targets.bypass_factor(i));
        }
        for (i, smoother) in self.crossover_smoothers.iter_mut().enumerate() {
            smoother.reset(sample_rate, Band::ALL[i].gain_ramp_seconds());
            smoother.set_current_and_target_value(CROSSOVER_FREQUENCIES[i]);
        }

        self.context = Some(ProcessContext {
            max_block_size,
            ..*context
        });
        info!(
            sample_rate,
            channels = context.channels,
            max_block_size,
            "Isolator engine prepared"
        );
        Ok(())
    }

    /// Publish new parameter values. Picked up at the start of the next block.
    #[inline]
    pub fn set_targets(&mut self, targets: BandTargets) {
        self.targets = targets;
    }

    pub fn targets(&self) -> &BandTargets {
        &self.targets
    }

    /// Enable or disable the bit-exact passthrough at neutral settings.
    /// Disabling it is mostly useful for measuring the filter bank itself.
    pub fn set_fast_path_enabled(&mut self, enabled: bool) {
        self.fast_path = enabled;
    }

    pub fn context(&self) -> Option<&ProcessContext> {
        self.context.as_ref()
    }

    /// Current values of the crossover-frequency smoothers
    pub fn crossover_frequencies(&self) -> [f32; 3] {
        self.crossover_smoothers.map(|s| s.current_value())
    }

    /// Process planar channel buffers in place.
    ///
    /// Channels beyond the prepared count are left untouched. Does nothing
    /// before the first `prepare()`.
    ///
    /// # Real-time Safety
    /// No allocations, no locks, no syscalls.
    pub fn process(&mut self, channels: &mut [&mut [f32]]) {
        // Checks raw targets, not ramp completion: returning to neutral
        // mid-ramp skips the rest of the ramp.
        if self.fast_path && self.targets.is_neutral() {
            return;
        }

        let Some(context) = self.context else {
            return;
        };

        let targets = self.targets.clamped();
        for i in 0..NUM_BANDS {
            self.gain_smoothers[i].set_target_value(targets.gains_db[i]);
            self.bypass_smoothers[i].set_target_value(targets.bypass_factor(i));
        }

        let num_channels = channels.len().min(self.scratch.len());
        let num_samples = channels
            .iter()
            .take(num_channels)
            .map(|c| c.len())
            .min()
            .unwrap_or(0);

        let mut offset = 0;
        while offset < num_samples {
            let len = (num_samples - offset).min(context.max_block_size);
            self.process_chunk(&mut channels[..num_channels], offset, len);
            offset += len;
        }
    }

    fn process_chunk(&mut self, channels: &mut [&mut [f32]], offset: usize, len: usize) {
        self.curves
            .generate(&mut self.gain_smoothers, &mut self.bypass_smoothers, len);

        let per_channel = channels
            .iter_mut()
            .zip(self.scratch.iter_mut())
            .zip(self.bank.chains_mut());

        for (ch, ((channel, scratch), chains)) in per_channel.enumerate() {
            let output = &mut channel[offset..offset + len];

            for band in Band::ALL {
                let buffer = &mut scratch[band.index()][..len];
                buffer.copy_from_slice(output);
                chains[band.index()].process(buffer);
            }
            self.dc_blocker
                .process(ch, &mut scratch[Band::Low.index()][..len]);

            mix_bands(output, scratch, &self.curves);
        }
    }

    /// Clear filter and DC blocker state and snap every smoother to its target
    pub fn reset(&mut self) {
        self.bank.reset();
        self.dc_blocker.reset();
        let targets = self.targets.clamped();
        for i in 0..NUM_BANDS {
            self.gain_smoothers[i].set_current_and_target_value(targets.gains_db[i]);
            self.bypass_smoothers[i].set_current_and_target_value(targets.bypass_factor(i));
        }
        debug!("Isolator engine reset");
    }
}

impl Default for IsolatorEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioProcessor for IsolatorEngine {
    fn prepare(&mut self, context: &ProcessContext) -> Result<(), DspError> {
        IsolatorEngine::prepare(self, context)
    }

    fn process(&mut self, channels: &mut [&mut [f32]]) {
        IsolatorEngine::process(self, channels);
    }

    fn reset(&mut self) {
        IsolatorEngine::reset(self);
    }

    fn name(&self) -> &'static str {
        "4-Band Isolator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f64 = 48000.0;

    fn prepared(targets: BandTargets, channels: usize, max_block_size: usize) -> IsolatorEngine {
        let mut engine = IsolatorEngine::new();
        engine.set_targets(targets);
        engine
            .prepare(&ProcessContext::new(SAMPLE_RATE, channels, max_block_size))
            .unwrap();
        engine
    }

    fn sine(freq: f32, amplitude: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| amplitude * (2.0 * std::f32::consts::PI * freq * i as f32 / SAMPLE_RATE as f32).sin())
            .collect()
    }

    fn noise(len: usize) -> Vec<f32> {
        // Deterministic LCG so the test is reproducible
        let mut state = 0x1234_5678_u32;
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                (state >> 8) as f32 / (1u32 << 24) as f32 * 2.0 - 1.0
            })
            .collect()
    }

    fn process_mono(engine: &mut IsolatorEngine, buffer: &mut [f32]) {
        let mut channels: [&mut [f32]; 1] = [buffer];
        engine.process(&mut channels);
    }

    fn rms(buffer: &[f32]) -> f32 {
        (buffer.iter().map(|s| s * s).sum::<f32>() / buffer.len() as f32).sqrt()
    }

    #[test]
    fn test_neutral_is_bit_exact() {
        let mut engine = prepared(BandTargets::default(), 2, 256);
        let left_in = noise(256);
        let right_in: Vec<f32> = left_in.iter().map(|s| s * -0.5).collect();

        let mut left = left_in.clone();
        let mut right = right_in.clone();
        let mut channels: [&mut [f32]; 2] = [&mut left, &mut right];
        engine.process(&mut channels);

        assert_eq!(left.iter().map(|s| s.to_bits()).collect::<Vec<_>>(), left_in.iter().map(|s| s.to_bits()).collect::<Vec<_>>());
        assert_eq!(right, right_in);
    }

    #[test]
    fn test_unprepared_engine_passes_through() {
        let mut engine = IsolatorEngine::new();
        engine.set_targets(BandTargets::default().with_gain(Band::Mid, 6.0));
        let input = noise(64);
        let mut buffer = input.clone();
        process_mono(&mut engine, &mut buffer);
        assert_eq!(buffer, input);
    }

    #[test]
    fn test_neutral_reconstruction_is_bounded() {
        // Minimum-phase bands do not sum back perfectly. The deepest notch
        // sits just above the 750 Hz crossover at about -5.7 dB.
        for freq in [
            20.0, 30.0, 100.0, 200.0, 400.0, 750.0, 769.0, 1500.0, 3000.0, 5000.0, 10000.0, 16000.0, 20000.0,
        ] {
            let mut engine = prepared(BandTargets::default(), 1, 512);
            engine.set_fast_path_enabled(false);

            let input = sine(freq, 0.5, 48000);
            let mut output = input.clone();
            process_mono(&mut engine, &mut output);

            let ratio_db = 20.0 * (rms(&output[24000..]) / rms(&input[24000..])).log10();
            assert!(
                (-7.0..=0.5).contains(&ratio_db),
                "{} Hz reconstructed at {:.2} dB",
                freq,
                ratio_db
            );
        }
    }

    #[test]
    fn test_gain_step_ramps_to_target() {
        let base = BandTargets::default().with_gain(Band::Mid, -3.0);
        let boosted = base.with_gain(Band::High, 10.0);

        let mut reference = prepared(boosted, 1, 512);
        let mut stepped = prepared(base, 1, 512);

        let input: Vec<f32> = sine(1000.0, 0.5, 4096)
            .iter()
            .zip(sine(8000.0, 0.2, 4096))
            .map(|(a, b)| a + b)
            .collect();
        let mut expected = input.clone();
        let mut actual = input.clone();

        for (block, (e, a)) in expected.chunks_mut(512).zip(actual.chunks_mut(512)).enumerate() {
            if block == 1 {
                stepped.set_targets(boosted);
            }
            process_mono(&mut reference, e);
            process_mono(&mut stepped, a);
        }

        // High band ramp is 10 ms = 480 samples, starting at sample 512
        for i in 1024..4096 {
            assert!(
                (expected[i] - actual[i]).abs() <= 1e-6 * expected[i].abs().max(1.0),
                "sample {}: {} vs {}",
                i,
                expected[i],
                actual[i]
            );
        }

        let max_delta = |buffer: &[f32]| {
            buffer
                .windows(2)
                .fold(0.0_f32, |m, w| m.max((w[1] - w[0]).abs()))
        };
        assert!(max_delta(&actual) <= max_delta(&expected) * 1.05 + 1e-3);
    }

    #[test]
    fn test_bypassing_every_band_silences_after_ramp() {
        let mut engine = prepared(BandTargets::default().with_gain(Band::Low, 1.0), 1, 512);
        let mut warmup = sine(440.0, 0.5, 512);
        process_mono(&mut engine, &mut warmup);

        let mut all_bypassed = *engine.targets();
        for band in Band::ALL {
            all_bypassed = all_bypassed.with_bypass(band, true);
        }
        engine.set_targets(all_bypassed);

        let mut buffer = sine(440.0, 0.5, 8192);
        process_mono(&mut engine, &mut buffer);

        // Longest bypass ramp is 80 ms = 3840 samples
        assert!(buffer[..64].iter().any(|&s| s != 0.0));
        assert!(buffer[3840..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_dc_into_low_band_converges() {
        let targets = BandTargets::default()
            .with_bypass(Band::LowMid, true)
            .with_bypass(Band::Mid, true)
            .with_bypass(Band::High, true);
        let mut engine = prepared(targets, 1, 480);

        let mut buffer = vec![1.0_f32; 24000];
        process_mono(&mut engine, &mut buffer);

        // 150 ms at 48 kHz
        assert!(buffer[7200..].iter().all(|s| s.abs() < 0.02));
        assert!(buffer[23999].abs() < 1e-3);
    }

    #[test]
    fn test_long_blocks_match_split_blocks() {
        let targets = BandTargets::default()
            .with_gain(Band::Low, 6.0)
            .with_bypass(Band::Mid, true);
        let input = noise(2048);

        let mut whole = prepared(BandTargets::default(), 1, 512);
        whole.set_targets(targets);
        let mut a = input.clone();
        process_mono(&mut whole, &mut a);

        let mut split = prepared(BandTargets::default(), 1, 512);
        split.set_targets(targets);
        let mut b = input.clone();
        for chunk in b.chunks_mut(512) {
            process_mono(&mut split, chunk);
        }

        assert_eq!(a, b);
    }

    #[test]
    fn test_channels_share_curves() {
        let mut engine = prepared(BandTargets::default().with_gain(Band::LowMid, -12.0), 2, 128);
        let input = noise(128);
        let mut left = input.clone();
        let mut right = input.clone();
        let mut channels: [&mut [f32]; 2] = [&mut left, &mut right];
        engine.process(&mut channels);
        assert_eq!(left, right);
        assert_ne!(left, input);
    }

    #[test]
    fn test_unprepared_channels_untouched() {
        let mut engine = prepared(BandTargets::default().with_gain(Band::High, 3.0), 1, 64);
        let input = noise(64);
        let mut first = input.clone();
        let mut second = input.clone();
        let mut channels: [&mut [f32]; 2] = [&mut first, &mut second];
        engine.process(&mut channels);
        assert_ne!(first, input);
        assert_eq!(second, input);
    }

    #[test]
    fn test_chunked_block_covers_every_prepared_channel() {
        let mut engine = prepared(BandTargets::default().with_gain(Band::Mid, -6.0), 2, 64);
        let input = noise(200);
        let mut left = input.clone();
        let mut right = input.clone();
        let mut extra = input.clone();
        let mut channels: [&mut [f32]; 3] = [&mut left, &mut right, &mut extra];
        engine.process(&mut channels);

        assert_ne!(left, input);
        assert_eq!(left, right);
        assert_eq!(extra, input);
    }

    #[test]
    fn test_reprepare_resets_state() {
        let targets = BandTargets::default().with_gain(Band::Low, 4.0);
        let input = noise(256);

        let mut used = prepared(targets, 1, 256);
        let mut scratch = noise(256);
        process_mono(&mut used, &mut scratch);
        used.prepare(&ProcessContext::new(SAMPLE_RATE, 1, 256)).unwrap();

        let mut fresh = prepared(targets, 1, 256);

        let mut a = input.clone();
        let mut b = input.clone();
        process_mono(&mut used, &mut a);
        process_mono(&mut fresh, &mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_return_to_neutral_reenters_fast_path() {
        let mut engine = prepared(BandTargets::default(), 1, 256);
        engine.set_targets(BandTargets::default().with_gain(Band::Low, 12.0));
        let mut buffer = noise(256);
        process_mono(&mut engine, &mut buffer);

        // Ramp is still in flight, but raw targets are neutral again
        engine.set_targets(BandTargets::default());
        let input = noise(256);
        let mut buffer = input.clone();
        process_mono(&mut engine, &mut buffer);
        assert_eq!(buffer, input);
    }

    #[test]
    fn test_targets_clamped_and_neutral() {
        let targets = BandTargets::default()
            .with_gain(Band::Low, 60.0)
            .with_gain(Band::LowMid, -500.0)
            .with_gain(Band::Mid, f32::NAN)
            .clamped();
        assert_eq!(targets.gains_db, [24.0, -100.0, 0.0, 0.0]);

        assert!(BandTargets::default().is_neutral());
        assert!(!BandTargets::default().with_bypass(Band::High, true).is_neutral());
        assert!(!BandTargets::default().with_gain(Band::High, 0.1).is_neutral());
    }

    #[test]
    fn test_crossover_smoothers_seeded() {
        let engine = prepared(BandTargets::default(), 2, 64);
        assert_eq!(engine.crossover_frequencies(), CROSSOVER_FREQUENCIES);
    }

    #[test]
    fn test_prepare_rejects_bad_rate() {
        let mut engine = IsolatorEngine::new();
        assert!(engine.prepare(&ProcessContext::new(0.0, 2, 64)).is_err());
        assert!(engine.context().is_none());
    }
}

//! Per-Sample Control Curves
//!
//! Once per block, every band's gain and bypass smoothers are expanded into
//! per-sample multiplier arrays. The curves are shared by all channels, so
//! each smoother advances exactly `num_samples` steps per block regardless of
//! channel count.

use crate::band::{GAIN_MIN_DB, NUM_BANDS};
use crate::smoother::SmoothedValue;

/// Convert decibels to linear amplitude.
///
/// Gains at or below -100 dB are treated as silence.
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    if db > GAIN_MIN_DB {
        10.0_f32.powf(db / 20.0)
    } else {
        0.0
    }
}

/// Cubic smoothstep `x²(3 - 2x)` on `x` clamped to [0, 1].
/// Zero slope at both ends.
#[inline]
pub fn smoothstep(x: f32) -> f32 {
    let x = x.clamp(0.0, 1.0);
    x * x * (3.0 - 2.0 * x)
}

/// Gain and bypass multipliers for one block
#[derive(Debug, Default)]
pub struct ControlCurves {
    gain: [Vec<f32>; NUM_BANDS],
    bypass: [Vec<f32>; NUM_BANDS],
}

impl ControlCurves {
    /// Preallocate every curve for blocks up to `max_block_size` samples.
    pub fn with_capacity(max_block_size: usize) -> Self {
        Self {
            gain: core::array::from_fn(|_| Vec::with_capacity(max_block_size)),
            bypass: core::array::from_fn(|_| Vec::with_capacity(max_block_size)),
        }
    }

    /// Step the smoothers `num_samples` times and fill the curves.
    ///
    /// # Real-time Safety
    /// No allocations as long as `num_samples` does not exceed the capacity
    /// given to `with_capacity()`.
    pub fn generate(
        &mut self,
        gain_smoothers: &mut [SmoothedValue; NUM_BANDS],
        bypass_smoothers: &mut [SmoothedValue; NUM_BANDS],
        num_samples: usize,
    ) {
        for band in 0..NUM_BANDS {
            let gain = &mut self.gain[band];
            let smoother = &mut gain_smoothers[band];
            gain.clear();
            gain.extend((0..num_samples).map(|_| db_to_gain(smoother.next_value())));

            let bypass = &mut self.bypass[band];
            let smoother = &mut bypass_smoothers[band];
            bypass.clear();
            bypass.extend((0..num_samples).map(|_| smoothstep(smoother.next_value())));
        }
    }

    /// Linear gain multipliers for band index `band`
    #[inline]
    pub fn gain(&self, band: usize) -> &[f32] {
        &self.gain[band]
    }

    /// Bypass factors (1 = active, 0 = bypassed) for band index `band`
    #[inline]
    pub fn bypass(&self, band: usize) -> &[f32] {
        &self.bypass[band]
    }

    /// Number of samples in the current curves
    pub fn len(&self) -> usize {
        self.gain[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::band::Band;

    fn smoothers(sample_rate: f64, value: f32, ramp: fn(Band) -> f64) -> [SmoothedValue; NUM_BANDS] {
        core::array::from_fn(|i| {
            let mut s = SmoothedValue::new(value);
            s.reset(sample_rate, ramp(Band::ALL[i]));
            s
        })
    }

    #[test]
    fn test_db_to_gain() {
        assert_eq!(db_to_gain(0.0), 1.0);
        assert!((db_to_gain(-6.0) - 0.501).abs() < 0.001);
        assert!((db_to_gain(24.0) - 15.849).abs() < 0.01);
        assert_eq!(db_to_gain(-100.0), 0.0);
        assert_eq!(db_to_gain(-150.0), 0.0);
    }

    #[test]
    fn test_smoothstep_shape() {
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(1.0), 1.0);
        assert_eq!(smoothstep(0.5), 0.5);
        assert_eq!(smoothstep(-2.0), 0.0);
        assert_eq!(smoothstep(3.0), 1.0);
    }

    #[test]
    fn test_settled_curves_are_flat() {
        let mut gains = smoothers(48000.0, 0.0, Band::gain_ramp_seconds);
        let mut bypasses = smoothers(48000.0, 1.0, Band::bypass_ramp_seconds);
        let mut curves = ControlCurves::with_capacity(64);

        curves.generate(&mut gains, &mut bypasses, 64);
        assert_eq!(curves.len(), 64);
        for band in 0..NUM_BANDS {
            assert!(curves.gain(band).iter().all(|&g| g == 1.0));
            assert!(curves.bypass(band).iter().all(|&b| b == 1.0));
        }
    }

    #[test]
    fn test_generate_does_not_reallocate() {
        let mut gains = smoothers(48000.0, 0.0, Band::gain_ramp_seconds);
        let mut bypasses = smoothers(48000.0, 1.0, Band::bypass_ramp_seconds);
        let mut curves = ControlCurves::with_capacity(256);
        let before = curves.gain(0).as_ptr();

        curves.generate(&mut gains, &mut bypasses, 256);
        curves.generate(&mut gains, &mut bypasses, 17);
        assert_eq!(curves.gain(0).as_ptr(), before);
        assert_eq!(curves.len(), 17);
    }

    #[test]
    fn test_gain_ramp_is_bounded_and_lands_on_target() {
        let sample_rate = 48000.0;
        let mut gains = smoothers(sample_rate, 0.0, Band::gain_ramp_seconds);
        let mut bypasses = smoothers(sample_rate, 1.0, Band::bypass_ramp_seconds);
        gains[Band::High.index()].set_target_value(10.0);

        // 10 ms at 48 kHz
        let ramp = 480;
        let mut curves = ControlCurves::with_capacity(1024);
        curves.generate(&mut gains, &mut bypasses, 1024);
        let curve = curves.gain(Band::High.index());

        // Largest linear step of a 10 dB ramp over 480 samples happens at the top
        let max_step = db_to_gain(10.0) - db_to_gain(10.0 - 10.0 / ramp as f32);
        for pair in curve.windows(2) {
            assert!(pair[1] >= pair[0]);
            assert!(pair[1] - pair[0] <= max_step * 1.01);
        }
        assert_eq!(curve[ramp - 1], db_to_gain(10.0));
        assert!(curve[ramp..].iter().all(|&g| g == db_to_gain(10.0)));
    }

    #[test]
    fn test_bypass_curve_has_flat_endpoints() {
        let sample_rate = 48000.0;
        let mut gains = smoothers(sample_rate, 0.0, Band::gain_ramp_seconds);
        let mut bypasses = smoothers(sample_rate, 1.0, Band::bypass_ramp_seconds);
        bypasses[Band::High.index()].set_target_value(0.0);

        // 25 ms at 48 kHz
        let ramp = 1200;
        let mut curves = ControlCurves::with_capacity(2048);
        curves.generate(&mut gains, &mut bypasses, 2048);
        let curve = curves.bypass(Band::High.index());

        let deltas: Vec<f32> = curve.windows(2).map(|w| w[1] - w[0]).collect();
        let max_delta = deltas.iter().fold(0.0_f32, |m, d| m.max(d.abs()));

        // Steepest in the middle, near-zero slope at both ends
        assert!((1.0 - curve[0]).abs() < 1e-5);
        assert!(deltas[0].abs() < max_delta * 0.01);
        assert!(deltas[ramp - 2].abs() < max_delta * 0.01);
        assert!(deltas.iter().all(|&d| d <= 0.0));
        assert_eq!(curve[ramp - 1], 0.0);
        assert!(curve[ramp..].iter().all(|&b| b == 0.0));
    }
}

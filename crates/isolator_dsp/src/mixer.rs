//! Band Mixer
//!
//! Recombines the four filtered bands into one output channel.

use crate::band::NUM_BANDS;
use crate::curves::ControlCurves;

/// `output[i] = Σ band[b][i] * gain[b][i] * bypass[b][i]`
///
/// Summed Low, LowMid, Mid, High so results are reproducible.
/// Every band buffer and curve must hold at least `output.len()` samples.
///
/// # Real-time Safety
/// Stateless, no allocations.
#[inline]
pub fn mix_bands(output: &mut [f32], bands: &[Vec<f32>; NUM_BANDS], curves: &ControlCurves) {
    let n = output.len();
    let [low, low_mid, mid, high] = bands;
    let (low, low_mid, mid, high) = (&low[..n], &low_mid[..n], &mid[..n], &high[..n]);
    let (low_gain, low_bypass) = (&curves.gain(0)[..n], &curves.bypass(0)[..n]);
    let (low_mid_gain, low_mid_bypass) = (&curves.gain(1)[..n], &curves.bypass(1)[..n]);
    let (mid_gain, mid_bypass) = (&curves.gain(2)[..n], &curves.bypass(2)[..n]);
    let (high_gain, high_bypass) = (&curves.gain(3)[..n], &curves.bypass(3)[..n]);

    for i in 0..n {
        output[i] = (low[i] * low_gain[i] * low_bypass[i])
            + (low_mid[i] * low_mid_gain[i] * low_mid_bypass[i])
            + (mid[i] * mid_gain[i] * mid_bypass[i])
            + (high[i] * high_gain[i] * high_bypass[i]);
    }
}

/// Mix with one constant linear gain per band.
///
/// Not used by the block path, which always applies per-sample curves.
/// Useful for offline rendering where parameters are fixed for the whole buffer.
pub fn mix_static(output: &mut [f32], bands: [&[f32]; NUM_BANDS], gains: [f32; NUM_BANDS]) {
    let n = output.len();
    let [low, low_mid, mid, high] = bands;
    let (low, low_mid, mid, high) = (&low[..n], &low_mid[..n], &mid[..n], &high[..n]);
    let [low_gain, low_mid_gain, mid_gain, high_gain] = gains;

    for i in 0..n {
        output[i] = low[i] * low_gain + low_mid[i] * low_mid_gain + mid[i] * mid_gain + high[i] * high_gain;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::band::Band;
    use crate::smoother::SmoothedValue;

    fn flat_curves(len: usize, gains_db: [f32; NUM_BANDS], active: [f32; NUM_BANDS]) -> ControlCurves {
        let mut gains: [SmoothedValue; NUM_BANDS] = core::array::from_fn(|i| SmoothedValue::new(gains_db[i]));
        let mut bypasses: [SmoothedValue; NUM_BANDS] = core::array::from_fn(|i| SmoothedValue::new(active[i]));
        let mut curves = ControlCurves::with_capacity(len);
        curves.generate(&mut gains, &mut bypasses, len);
        curves
    }

    fn bands(len: usize) -> [Vec<f32>; NUM_BANDS] {
        [vec![0.1; len], vec![0.2; len], vec![0.3; len], vec![0.4; len]]
    }

    #[test]
    fn test_unity_sums_bands() {
        let curves = flat_curves(8, [0.0; NUM_BANDS], [1.0; NUM_BANDS]);
        let mut output = vec![0.0_f32; 8];
        mix_bands(&mut output, &bands(8), &curves);
        for sample in &output {
            assert!((sample - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_bypassed_band_removed() {
        let mut active = [1.0; NUM_BANDS];
        active[Band::High.index()] = 0.0;
        let curves = flat_curves(4, [0.0; NUM_BANDS], active);
        let mut output = vec![0.0_f32; 4];
        mix_bands(&mut output, &bands(4), &curves);
        assert!((output[0] - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_muted_band_removed() {
        let mut gains = [0.0; NUM_BANDS];
        gains[Band::Low.index()] = -100.0;
        let curves = flat_curves(4, gains, [1.0; NUM_BANDS]);
        let mut output = vec![0.0_f32; 4];
        mix_bands(&mut output, &bands(4), &curves);
        assert!((output[0] - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_mixes_prefix_of_longer_buffers() {
        let curves = flat_curves(16, [0.0; NUM_BANDS], [1.0; NUM_BANDS]);
        let mut output = vec![0.0_f32; 5];
        mix_bands(&mut output, &bands(16), &curves);
        assert_eq!(output.len(), 5);
    }

    #[test]
    fn test_static_mix_matches_settled_curves() {
        let gains_db = [-6.0, 3.0, 0.0, 12.0];
        let curves = flat_curves(8, gains_db, [1.0; NUM_BANDS]);
        let data = bands(8);

        let mut curved = vec![0.0_f32; 8];
        mix_bands(&mut curved, &data, &curves);

        let mut fixed = vec![0.0_f32; 8];
        let linear = gains_db.map(crate::curves::db_to_gain);
        mix_static(&mut fixed, [&data[0], &data[1], &data[2], &data[3]], linear);

        for (a, b) in curved.iter().zip(&fixed) {
            assert!((a - b).abs() < 1e-6);
        }
    }
}

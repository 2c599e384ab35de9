//! DC Blocker
//!
//! Single-pole high-pass applied to the low band after crossover filtering:
//!
//! ```text
//! y[n] = x[n] - x[n-1] + r * y[n-1],   r = exp(-2π · fc / fs)
//! ```
//!
//! Gain and bypass transitions excite the low band's narrow low-pass response
//! and leave a slowly decaying DC offset; this stage removes it before mixing.

/// Cutoff frequency of the DC blocker (Hz)
pub const DC_BLOCKER_CUTOFF_HZ: f64 = 5.0;

/// Values below this are flushed to zero to keep denormals out of the feedback path
const DENORMAL_THRESHOLD: f32 = 1.0e-30;

/// Per-channel DC blocker state
#[derive(Debug, Default)]
pub struct DcBlocker {
    r: f32,
    prev_x: Vec<f32>,
    prev_y: Vec<f32>,
}

impl DcBlocker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the pole for `sample_rate` and zero every channel's state.
    ///
    /// Allocates. Call from the non-real-time prepare phase only.
    pub fn prepare(&mut self, sample_rate: f64, num_channels: usize) {
        self.r = (-2.0 * std::f64::consts::PI * DC_BLOCKER_CUTOFF_HZ / sample_rate).exp() as f32;
        self.prev_x = vec![0.0; num_channels];
        self.prev_y = vec![0.0; num_channels];
    }

    /// Filter `buffer` in place, carrying state across calls.
    /// Channels outside the prepared range are left untouched.
    ///
    /// # Real-time Safety
    /// No allocations. O(n) where n = buffer length.
    #[inline]
    pub fn process(&mut self, channel: usize, buffer: &mut [f32]) {
        let (Some(prev_x), Some(prev_y)) = (self.prev_x.get_mut(channel), self.prev_y.get_mut(channel)) else {
            return;
        };

        let r = self.r;
        let mut x1 = *prev_x;
        let mut y1 = *prev_y;
        for sample in buffer.iter_mut() {
            let x = *sample;
            let y = x - x1 + r * y1;
            *sample = y;
            x1 = x;
            y1 = y;
        }

        if y1.abs() < DENORMAL_THRESHOLD {
            y1 = 0.0;
        }
        *prev_x = x1;
        *prev_y = y1;
    }

    /// Pole coefficient `r`
    pub fn pole(&self) -> f32 {
        self.r
    }

    pub fn reset(&mut self) {
        self.prev_x.fill(0.0);
        self.prev_y.fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pole_matches_cutoff() {
        let mut blocker = DcBlocker::new();
        blocker.prepare(48000.0, 1);
        let expected = (-2.0 * std::f64::consts::PI * 5.0 / 48000.0).exp() as f32;
        assert_eq!(blocker.pole(), expected);
        assert!(blocker.pole() > 0.999 && blocker.pole() < 1.0);
    }

    #[test]
    fn test_constant_input_decays() {
        let mut blocker = DcBlocker::new();
        blocker.prepare(48000.0, 1);

        // 150 ms is ~4.7 time constants of the 5 Hz pole
        let mut buffer = vec![1.0_f32; 7200];
        blocker.process(0, &mut buffer);
        assert_eq!(buffer[0], 1.0);
        assert!(buffer[7199].abs() < 0.01, "residual {}", buffer[7199]);
    }

    #[test]
    fn test_state_carries_across_blocks() {
        let mut whole = DcBlocker::new();
        whole.prepare(48000.0, 1);
        let mut split = DcBlocker::new();
        split.prepare(48000.0, 1);

        let input: Vec<f32> = (0..512).map(|i| ((i as f32) * 0.05).sin() + 0.3).collect();

        let mut a = input.clone();
        whole.process(0, &mut a);

        let mut b = input.clone();
        let (head, tail) = b.split_at_mut(200);
        split.process(0, head);
        split.process(0, tail);

        assert_eq!(a, b);
    }

    #[test]
    fn test_passes_audio_band() {
        let mut blocker = DcBlocker::new();
        blocker.prepare(48000.0, 1);
        let mut buffer: Vec<f32> = (0..4800)
            .map(|i| (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / 48000.0).sin())
            .collect();
        blocker.process(0, &mut buffer);
        let peak = buffer[2400..].iter().fold(0.0_f32, |p, s| p.max(s.abs()));
        assert!(peak > 0.99 && peak < 1.01);
    }

    #[test]
    fn test_unprepared_channel_untouched() {
        let mut blocker = DcBlocker::new();
        blocker.prepare(48000.0, 1);
        let mut buffer = vec![0.5_f32; 4];
        blocker.process(3, &mut buffer);
        assert_eq!(buffer, vec![0.5; 4]);
    }

    #[test]
    fn test_reset_zeroes_state() {
        let mut blocker = DcBlocker::new();
        blocker.prepare(48000.0, 1);
        let mut buffer = vec![1.0_f32; 100];
        blocker.process(0, &mut buffer);
        blocker.reset();

        let mut again = vec![1.0_f32; 1];
        blocker.process(0, &mut again);
        assert_eq!(again[0], 1.0);
    }
}

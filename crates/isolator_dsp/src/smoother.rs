//! Linear Parameter Smoothing
//!
//! A single scalar that ramps toward a target over a fixed time.
//! Used for every gain and bypass control so that parameter changes
//! never produce an audible step.

/// Linearly interpolated scalar.
///
/// # Real-time Safety
/// All methods are O(1) with no allocations.
#[derive(Debug, Clone, Copy)]
pub struct SmoothedValue {
    current: f32,
    target: f32,
    step: f32,
    countdown: u32,
    steps_to_target: u32,
}

impl SmoothedValue {
    /// Create a settled smoother at `value` with no ramp configured
    pub fn new(value: f32) -> Self {
        Self {
            current: value,
            target: value,
            step: 0.0,
            countdown: 0,
            steps_to_target: 0,
        }
    }

    /// Configure the ramp length and snap to the current target.
    pub fn reset(&mut self, sample_rate: f64, ramp_seconds: f64) {
        self.steps_to_target = (ramp_seconds * sample_rate).floor().max(0.0) as u32;
        self.set_current_and_target_value(self.target);
    }

    /// Jump to `value` immediately, cancelling any ramp in flight
    pub fn set_current_and_target_value(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.countdown = 0;
    }

    /// Start ramping from the current value toward `value`.
    ///
    /// Setting the same target again leaves an in-flight ramp untouched.
    pub fn set_target_value(&mut self, value: f32) {
        if value == self.target {
            return;
        }

        if self.steps_to_target == 0 {
            self.set_current_and_target_value(value);
            return;
        }

        self.target = value;
        self.countdown = self.steps_to_target;
        self.step = (self.target - self.current) / self.countdown as f32;
    }

    /// Advance one sample and return the new current value.
    ///
    /// The last step of a ramp lands exactly on the target.
    #[inline]
    pub fn next_value(&mut self) -> f32 {
        if self.countdown == 0 {
            return self.target;
        }

        self.countdown -= 1;
        if self.countdown > 0 {
            self.current += self.step;
        } else {
            self.current = self.target;
        }
        self.current
    }

    pub fn current_value(&self) -> f32 {
        self.current
    }

    pub fn target_value(&self) -> f32 {
        self.target
    }

    /// Whether a ramp is still in progress
    pub fn is_smoothing(&self) -> bool {
        self.countdown > 0
    }

    /// Ramp length in samples, as configured by the last `reset()`
    pub fn ramp_length(&self) -> u32 {
        self.steps_to_target
    }
}

impl Default for SmoothedValue {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settled_returns_target() {
        let mut value = SmoothedValue::new(3.0);
        value.reset(48000.0, 0.01);
        assert!(!value.is_smoothing());
        assert_eq!(value.next_value(), 3.0);
        assert_eq!(value.next_value(), 3.0);
    }

    #[test]
    fn test_ramp_length_from_sample_rate() {
        let mut value = SmoothedValue::default();
        value.reset(48000.0, 0.010);
        assert_eq!(value.ramp_length(), 480);

        value.reset(44100.0, 0.160);
        assert_eq!(value.ramp_length(), 7056);
    }

    #[test]
    fn test_linear_ramp_reaches_target_exactly() {
        let mut value = SmoothedValue::default();
        value.reset(1000.0, 0.1); // 100 steps
        value.set_target_value(10.0);

        let mut last = 0.0;
        for i in 0..100 {
            let next = value.next_value();
            assert!(next > last, "ramp must be monotonic at step {}", i);
            assert!((next - last - 0.1).abs() < 1e-4);
            last = next;
        }
        assert_eq!(last, 10.0);
        assert!(!value.is_smoothing());
        assert_eq!(value.next_value(), 10.0);
    }

    #[test]
    fn test_each_call_consumes_one_sample() {
        let mut value = SmoothedValue::default();
        value.reset(100.0, 0.1); // 10 steps
        value.set_target_value(1.0);

        for _ in 0..9 {
            value.next_value();
            assert!(value.is_smoothing());
        }
        assert_eq!(value.next_value(), 1.0);
        assert!(!value.is_smoothing());
    }

    #[test]
    fn test_retarget_preserves_current_value() {
        let mut value = SmoothedValue::default();
        value.reset(1000.0, 0.1);
        value.set_target_value(10.0);
        for _ in 0..50 {
            value.next_value();
        }
        let midway = value.current_value();
        assert!((midway - 5.0).abs() < 1e-3);

        value.set_target_value(0.0);
        assert_eq!(value.current_value(), midway);
        let next = value.next_value();
        assert!(next < midway);
    }

    #[test]
    fn test_same_target_does_not_restart_ramp() {
        let mut value = SmoothedValue::default();
        value.reset(1000.0, 0.1);
        value.set_target_value(1.0);
        for _ in 0..60 {
            value.next_value();
        }
        value.set_target_value(1.0);
        for _ in 0..40 {
            value.next_value();
        }
        assert!(!value.is_smoothing());
        assert_eq!(value.current_value(), 1.0);
    }

    #[test]
    fn test_zero_ramp_jumps() {
        let mut value = SmoothedValue::default();
        value.reset(48000.0, 0.0);
        value.set_target_value(-6.0);
        assert_eq!(value.current_value(), -6.0);
        assert!(!value.is_smoothing());
    }

    #[test]
    fn test_set_current_and_target_cancels_ramp() {
        let mut value = SmoothedValue::default();
        value.reset(48000.0, 0.1);
        value.set_target_value(1.0);
        value.next_value();
        value.set_current_and_target_value(0.25);
        assert!(!value.is_smoothing());
        assert_eq!(value.next_value(), 0.25);
    }
}

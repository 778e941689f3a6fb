use crate::MIN_TIME;

/*
Exponential Approach
====================

Both the envelope's attack/decay and the output normalization move a gain
toward a target along the classic one-pole curve:

    value(t) = target + (start - target) * e^(-t / tau)

  tau     The time constant. After one tau the value has covered ~63% of the
          distance to the target, after three ~95%, after five ~99.3%.
          The target itself is never reached exactly.

  start   The value at the moment the approach was scheduled (t = 0).

Because the curve is computed from elapsed time rather than accumulated
sample by sample, rounding does not drift over long sustains and the value at
any instant is known exactly (the envelope uses this to hand its attack value
over to the decay curve).
*/

/// Past this many time constants the remaining distance is below f32
/// resolution for gains in [0, 1].
const SETTLED_TIME_CONSTANTS: f32 = 20.0;

/// Value of an exponential approach from `start` toward `target`, `elapsed`
/// seconds after it began.
#[inline]
pub fn exponential_approach(start: f32, target: f32, elapsed: f32, time_constant: f32) -> f32 {
    if time_constant <= MIN_TIME || elapsed >= time_constant * SETTLED_TIME_CONSTANTS {
        return target;
    }
    target + (start - target) * (-elapsed / time_constant).exp()
}

#[inline]
pub(crate) fn samples_to_seconds(samples: u64, sample_rate: f32) -> f32 {
    (samples as f64 / sample_rate as f64) as f32
}

/// A gain that glides toward its latest target.
///
/// Setting a new target cancels whatever approach was in flight and starts a
/// fresh one from the current value, so targets never stack.
#[derive(Debug, Clone)]
pub struct ExpSmoother {
    value: f32,
    anchor: f32,
    target: f32,
    time_constant: f32,
    elapsed_samples: u64,
}

impl ExpSmoother {
    /// A smoother resting at `initial`.
    pub fn new(initial: f32) -> Self {
        Self {
            value: initial,
            anchor: initial,
            target: initial,
            time_constant: 0.0,
            elapsed_samples: 0,
        }
    }

    /// Begin approaching `target` from the current value.
    pub fn set_target(&mut self, target: f32, time_constant: f32) {
        self.anchor = self.value;
        self.target = target;
        self.time_constant = time_constant;
        self.elapsed_samples = 0;
    }

    /// Jump to `value` with nothing pending.
    pub fn reset(&mut self, value: f32) {
        *self = Self::new(value);
    }

    /// Current value, then advance one sample.
    #[inline]
    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        let elapsed = samples_to_seconds(self.elapsed_samples, sample_rate);
        self.value = exponential_approach(self.anchor, self.target, elapsed, self.time_constant);
        self.elapsed_samples = self.elapsed_samples.saturating_add(1);
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn target(&self) -> f32 {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    #[test]
    fn one_time_constant_covers_about_63_percent() {
        let v = exponential_approach(0.0, 1.0, 0.5, 0.5);
        assert!((v - (1.0 - (-1.0f32).exp())).abs() < 1e-6);
        assert!((v - 0.632).abs() < 1e-3);
    }

    #[test]
    fn zero_time_constant_jumps_to_target() {
        assert_eq!(exponential_approach(0.2, 0.9, 0.0, 0.0), 0.9);
    }

    #[test]
    fn smoother_holds_until_given_a_target() {
        let mut s = ExpSmoother::new(0.8);
        for _ in 0..100 {
            assert_eq!(s.next_sample(SAMPLE_RATE), 0.8);
        }
    }

    #[test]
    fn smoother_approaches_target_without_overshoot() {
        let mut s = ExpSmoother::new(0.8);
        s.set_target(0.4, 0.5);

        let mut prev = s.value();
        for _ in 0..(SAMPLE_RATE as usize * 3) {
            let v = s.next_sample(SAMPLE_RATE);
            assert!(v <= prev && v >= 0.4);
            prev = v;
        }
        assert!((prev - 0.4).abs() < 0.01);
    }

    #[test]
    fn retargeting_starts_from_the_current_value() {
        let mut s = ExpSmoother::new(0.8);
        s.set_target(0.2, 0.5);
        for _ in 0..250 {
            s.next_sample(SAMPLE_RATE);
        }
        let mid = s.value();
        assert!(mid < 0.8 && mid > 0.2);

        s.set_target(0.8, 0.5);
        // The first sample after retargeting is the anchored value, no jump
        let first = s.next_sample(SAMPLE_RATE);
        assert!((first - mid).abs() < 1e-6);
        assert_eq!(s.target(), 0.8);
    }
}

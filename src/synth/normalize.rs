use crate::dsp::ExpSmoother;

/*
Output Normalization
====================

Each voice peaks around 0.5, so a handful of simultaneous notes would sum
well past full scale. The session scales the mix by

    scale(n) = base_master_gain / max(1, n)

where n is the number of held voices. Releasing tails do not count, they are
already fading.

This is a linear-in-1/n heuristic rather than perceptual loudness matching:
n sine voices at random phases add up closer to sqrt(n) than n, so big
chords come out a little quiet. For casual play that trade is fine.

A new scale is never applied instantly, a jump in gain is a click. The gain
glides toward it with a 0.5 s time constant, and each recompute re-anchors
the glide at the current gain so targets cannot pile up.
*/

/// Output scale for `active` held voices.
pub fn normalization_scale(base_master_gain: f32, active: usize) -> f32 {
    base_master_gain / active.max(1) as f32
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    base_master_gain: f32,
    time_constant: f32,
    gain: ExpSmoother,
}

impl Normalizer {
    pub fn new(base_master_gain: f32, time_constant: f32) -> Self {
        Self {
            base_master_gain,
            time_constant,
            gain: ExpSmoother::new(base_master_gain),
        }
    }

    /// Retarget the output gain for the given voice count. Returns the target.
    pub fn recompute(&mut self, active: usize) -> f32 {
        let target = normalization_scale(self.base_master_gain, active);
        self.gain.set_target(target, self.time_constant);
        target
    }

    /// Gain for the next output sample.
    #[inline]
    pub fn next_gain(&mut self, sample_rate: f32) -> f32 {
        self.gain.next_sample(sample_rate)
    }

    /// Back to the single-voice gain, nothing pending.
    pub fn reset(&mut self) {
        self.gain.reset(self.base_master_gain);
    }

    pub fn target(&self) -> f32 {
        self.gain.target()
    }

    pub fn current(&self) -> f32 {
        self.gain.value()
    }

    pub fn base_master_gain(&self) -> f32 {
        self.base_master_gain
    }
}

use crate::{
    dsp::smoother::{exponential_approach, samples_to_seconds},
    MIN_TIME,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Voice Envelope
==============

Every voice multiplies its oscillator by this envelope. The contour is a
mix of exponential and linear segments:

  Level
   0.5 ┤      _.--~~~-._
       │    .'          `-..___________  sustain 0.4
       │   /                           \
       │  /                             \   linear release
   0.0 ┼─'───────────────────────────────\──────→ Time
       t0     t0+0.2                    t1  t1+0.12

Vocabulary
----------

  peak level      Where the attack curve is heading (0.5). It is approached,
                  never reached.

  time constant   Seconds for an exponential segment to cover ~63% of the
                  remaining distance (see `smoother`).

  decay start     The decay segment is scheduled at t0 + attack_time,
                  regardless of where the attack curve got to. With the
                  defaults the attack has only reached ~0.316 by then, so the
                  "decay" actually rises toward the 0.4 sustain level.

  stop margin     After the release ramp hits zero the voice keeps rendering
                  silence for a few more milliseconds before it is disposed,
                  so the oscillator is never cut off mid-ramp.


The State Machine
-----------------

    Idle ──note_on──→ Attack ──t0+attack──→ Decay ──settled──→ Sustain
                        │                     │                   │
                        └──────note_off───────┴──────note_off─────┘
                                              ↓
                                           Release ──t1+release+margin──→ Disposed

Every level is computed from the elapsed sample count, so the value at the
moment of note_off is exact. Release snapshots that instantaneous value and
ramps linearly from there, which is what keeps a release during the attack
free of clicks.
*/

/// Distance from the sustain level below which the decay counts as settled.
const SETTLE_THRESHOLD: f32 = 1.0e-4;

/// Stage of a voice's envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,     // Never triggered, level = 0
    Attack,   // Approaching the peak level
    Decay,    // Approaching the sustain level
    Sustain,  // Holding the sustain level until note_off
    Release,  // Linear ramp from the captured level to 0
    Disposed, // Ramp and stop margin elapsed, voice can be dropped
}

/// Parameters describing the envelope contour.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeShape {
    /// Level the attack approaches.
    pub peak_level: f32,
    /// Attack time constant, and the offset at which decay begins (seconds).
    pub attack_time: f32,
    /// Decay time constant (seconds).
    pub decay_time: f32,
    /// Level held while the key stays down.
    pub sustain_level: f32,
    /// Duration of the linear release ramp (seconds).
    pub release_time: f32,
    /// Silence rendered after the ramp before disposal (seconds).
    pub stop_margin: f32,
}

impl Default for EnvelopeShape {
    fn default() -> Self {
        Self {
            peak_level: 0.5,
            attack_time: 0.2,
            decay_time: 0.3,
            sustain_level: 0.4,
            release_time: 0.12,
            stop_margin: 0.01,
        }
    }
}

impl EnvelopeShape {
    fn sanitized(self) -> Self {
        Self {
            peak_level: self.peak_level.clamp(0.0, 1.0),
            attack_time: self.attack_time.max(MIN_TIME),
            decay_time: self.decay_time.max(MIN_TIME),
            sustain_level: self.sustain_level.clamp(0.0, 1.0),
            release_time: self.release_time.max(MIN_TIME),
            stop_margin: self.stop_margin.max(0.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Envelope {
    shape: EnvelopeShape,

    // Runtime state
    stage: EnvelopeState,
    level: f32,
    elapsed_samples: u64, // since note_on

    // Level the attack curve had reached when decay took over
    decay_start_level: f32,

    // Release bookkeeping, fixed at note_off
    release_start_level: f32,
    release_total_samples: u64,
    release_elapsed_samples: u64,
    dispose_after_samples: u64,
}

impl Envelope {
    pub fn new(shape: EnvelopeShape) -> Self {
        Self {
            shape: shape.sanitized(),
            stage: EnvelopeState::Idle,
            level: 0.0,
            elapsed_samples: 0,
            decay_start_level: 0.0,
            release_start_level: 0.0,
            release_total_samples: 1,
            release_elapsed_samples: 0,
            dispose_after_samples: 1,
        }
    }

    /// Gate high: start from zero and schedule attack then decay.
    pub fn note_on(&mut self) {
        self.level = 0.0;
        self.stage = EnvelopeState::Attack;
        self.elapsed_samples = 0;
        self.decay_start_level = 0.0;
        self.release_elapsed_samples = 0;
    }

    /// Gate low: drop the pending attack/decay, anchor at the current level
    /// and ramp to zero. Returns false if there was nothing to release.
    pub fn note_off(&mut self, sample_rate: f32) -> bool {
        if !matches!(
            self.stage,
            EnvelopeState::Attack | EnvelopeState::Decay | EnvelopeState::Sustain
        ) {
            return false;
        }

        self.release_start_level = self.level;
        self.release_total_samples = (self.shape.release_time * sample_rate).round().max(1.0) as u64;
        self.dispose_after_samples = ((self.shape.release_time + self.shape.stop_margin)
            * sample_rate)
            .round()
            .max(self.release_total_samples as f32) as u64;
        self.release_elapsed_samples = 0;
        self.stage = EnvelopeState::Release;
        true
    }

    /// Silence immediately with no release tail.
    pub fn kill(&mut self) {
        self.level = 0.0;
        self.stage = EnvelopeState::Disposed;
    }

    /// Current level, then advance by one sample.
    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        match self.stage {
            EnvelopeState::Idle | EnvelopeState::Disposed => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                let t = samples_to_seconds(self.elapsed_samples, sample_rate);
                let attack = self.shape.attack_time;
                if t < attack {
                    self.level = exponential_approach(0.0, self.shape.peak_level, t, attack);
                } else {
                    // Hand over to decay at exactly the value the attack reached
                    self.decay_start_level =
                        exponential_approach(0.0, self.shape.peak_level, attack, attack);
                    self.stage = EnvelopeState::Decay;
                    self.level = self.decay_level(t);
                }
                self.elapsed_samples = self.elapsed_samples.saturating_add(1);
            }

            EnvelopeState::Decay => {
                let t = samples_to_seconds(self.elapsed_samples, sample_rate);
                self.level = self.decay_level(t);
                if (self.level - self.shape.sustain_level).abs() < SETTLE_THRESHOLD {
                    self.level = self.shape.sustain_level;
                    self.stage = EnvelopeState::Sustain;
                }
                self.elapsed_samples = self.elapsed_samples.saturating_add(1);
            }

            EnvelopeState::Sustain => {
                self.level = self.shape.sustain_level;
            }

            EnvelopeState::Release => {
                if self.release_elapsed_samples < self.release_total_samples {
                    let progress =
                        self.release_elapsed_samples as f32 / self.release_total_samples as f32;
                    self.level = (self.release_start_level * (1.0 - progress)).max(0.0);
                } else {
                    self.level = 0.0;
                }

                self.release_elapsed_samples = self.release_elapsed_samples.saturating_add(1);
                if self.release_elapsed_samples >= self.dispose_after_samples {
                    self.level = 0.0;
                    self.stage = EnvelopeState::Disposed;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    fn decay_level(&self, t: f32) -> f32 {
        exponential_approach(
            self.decay_start_level,
            self.shape.sustain_level,
            t - self.shape.attack_time,
            self.shape.decay_time,
        )
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32], sample_rate: f32) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(sample_rate);
        }
    }

    /// Gate is high (attack, decay or sustain).
    pub fn is_held(&self) -> bool {
        matches!(
            self.stage,
            EnvelopeState::Attack | EnvelopeState::Decay | EnvelopeState::Sustain
        )
    }

    pub fn is_disposed(&self) -> bool {
        self.stage == EnvelopeState::Disposed
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }

    pub fn shape(&self) -> &EnvelopeShape {
        &self.shape
    }
}

use std::collections::HashMap;

use crate::{
    config::SynthConfig,
    dsp::{EnvelopeShape, Waveform},
    keys::KeyId,
    synth::{
        normalize::Normalizer,
        voice::{Voice, VoiceHandle},
    },
};

/// Room for every key of the table held at once.
const ACTIVE_CAPACITY: usize = 32;
/// Tails held without reallocating: every key re-struck eight times within
/// one release tail (~130 ms). Beyond that the list grows once, inside the
/// callback, and keeps the larger capacity.
const TAIL_CAPACITY: usize = ACTIVE_CAPACITY * 8;

/// Owns every sounding voice of one keyboard.
///
/// The active set maps each held key to its voice and is the only answer to
/// "is this key sounding". A released voice leaves the active set at once and
/// finishes its tail in a separate list, so the same key can start a fresh
/// voice while the old one is still fading.
pub struct SynthSession {
    sample_rate: f32,
    envelope: EnvelopeShape,
    waveform: Waveform,
    active: HashMap<KeyId, Voice>,
    releasing: Vec<Voice>,
    normalizer: Normalizer,
    frame_counter: u64,
}

impl SynthSession {
    pub fn new(sample_rate: f32, config: &SynthConfig) -> Self {
        Self {
            sample_rate,
            envelope: config.envelope,
            waveform: config.waveform,
            active: HashMap::with_capacity(ACTIVE_CAPACITY),
            releasing: Vec::with_capacity(TAIL_CAPACITY),
            normalizer: Normalizer::new(
                config.base_master_gain,
                config.normalization_time_constant,
            ),
            frame_counter: 0,
        }
    }

    /// Start a voice for `key` unless one is already held.
    ///
    /// Returns `None` (and changes nothing) on a retrigger.
    pub fn start_voice(&mut self, key: KeyId, frequency: f32) -> Option<VoiceHandle> {
        if self.active.contains_key(&key) {
            return None;
        }

        let voice = Voice::start(
            key,
            frequency,
            self.waveform,
            self.envelope,
            self.frame_counter,
        );
        let handle = voice.handle();
        self.active.insert(key, voice);
        self.normalizer.recompute(self.active.len());
        Some(handle)
    }

    /// Release the voice held for `key`. Returns false if there was none.
    ///
    /// The voice leaves the active set immediately; its release tail keeps
    /// rendering until it disposes itself.
    pub fn stop_voice(&mut self, key: KeyId) -> bool {
        let Some(mut voice) = self.active.remove(&key) else {
            return false;
        };

        voice.release(self.sample_rate);
        self.releasing.push(voice);
        self.normalizer.recompute(self.active.len());
        true
    }

    /// Waveform for voices started from now on.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    /// Stop every voice, held or releasing, with no tail.
    ///
    /// Returns how many voices were dropped.
    pub fn teardown(&mut self) -> usize {
        let count = self.active.len() + self.releasing.len();
        for voice in self.active.values_mut().chain(self.releasing.iter_mut()) {
            voice.kill();
        }
        self.active.clear();
        self.releasing.clear();
        self.normalizer.reset();
        count
    }

    /// Mix every voice into `out` (overwriting it) and apply the output gain.
    pub fn render_block(&mut self, out: &mut [f32]) {
        out.fill(0.0);

        for voice in self.active.values_mut() {
            voice.render_add(out, self.sample_rate);
        }
        for voice in &mut self.releasing {
            voice.render_add(out, self.sample_rate);
        }
        self.releasing.retain(|v| !v.is_disposed());

        for sample in out.iter_mut() {
            *sample *= self.normalizer.next_gain(self.sample_rate);
        }

        self.frame_counter += out.len() as u64;
    }

    pub fn is_active(&self, key: KeyId) -> bool {
        self.active.contains_key(&key)
    }

    pub fn voice(&self, key: KeyId) -> Option<&Voice> {
        self.active.get(&key)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn active_keys(&self) -> impl Iterator<Item = KeyId> + '_ {
        self.active.keys().copied()
    }

    /// Released voices whose tails are still playing.
    pub fn releasing_count(&self) -> usize {
        self.releasing.len()
    }

    pub fn releasing(&self) -> &[Voice] {
        &self.releasing
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Frames rendered so far.
    pub fn frame(&self) -> u64 {
        self.frame_counter
    }

    /// Session time in seconds.
    pub fn now(&self) -> f64 {
        self.frame_counter as f64 / self.sample_rate as f64
    }
}

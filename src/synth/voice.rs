use crate::{
    dsp::{Envelope, EnvelopeShape, EnvelopeState, OscillatorBlock, Waveform},
    keys::KeyId,
};

/// Identifies one started voice: which key, and when (session frame).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceHandle {
    pub key: KeyId,
    pub started_at: u64,
}

/// One sounding note: an oscillator shaped by its own envelope.
///
/// A voice is started once and disposed once. After release it keeps
/// rendering its tail until the envelope reports `Disposed`, then renders
/// nothing.
#[derive(Debug, Clone)]
pub struct Voice {
    key: KeyId,
    frequency: f32,
    oscillator: OscillatorBlock,
    envelope: Envelope,
    started_at: u64,
}

impl Voice {
    /// Create a voice and open its gate.
    pub fn start(
        key: KeyId,
        frequency: f32,
        waveform: Waveform,
        shape: EnvelopeShape,
        started_at: u64,
    ) -> Self {
        let mut envelope = Envelope::new(shape);
        envelope.note_on();

        Self {
            key,
            frequency,
            oscillator: OscillatorBlock::new(waveform),
            envelope,
            started_at,
        }
    }

    /// Close the gate. Returns false if the voice was already releasing.
    pub fn release(&mut self, sample_rate: f32) -> bool {
        self.envelope.note_off(sample_rate)
    }

    /// Stop without a tail.
    pub fn kill(&mut self) {
        self.envelope.kill();
    }

    /// Mix this voice into `out`.
    pub fn render_add(&mut self, out: &mut [f32], sample_rate: f32) {
        if self.envelope.is_disposed() {
            return;
        }

        for o in out.iter_mut() {
            let gain = self.envelope.next_sample(sample_rate);
            let sample = self.oscillator.next_sample(self.frequency, sample_rate);
            *o += sample * gain;
        }
    }

    pub fn handle(&self) -> VoiceHandle {
        VoiceHandle {
            key: self.key,
            started_at: self.started_at,
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.envelope.is_disposed()
    }

    pub fn key(&self) -> KeyId {
        self.key
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn waveform(&self) -> Waveform {
        self.oscillator.waveform()
    }

    pub fn sustain_level(&self) -> f32 {
        self.envelope.shape().sustain_level
    }

    pub fn started_at(&self) -> u64 {
        self.started_at
    }

    pub fn envelope_level(&self) -> f32 {
        self.envelope.level()
    }

    pub fn state(&self) -> EnvelopeState {
        self.envelope.state()
    }
}

use crate::{
    config::SynthConfig,
    keys::{freq_to_hue, FrequencyTable, KeyId},
    synth::{
        message::{MessageReceiver, SynthMessage},
        observer::VoiceObserver,
        session::SynthSession,
    },
};

/// The audio-thread side of the keyboard: routes input messages to the
/// session and tells the observer what happened.
///
/// Runs inside the audio callback, so nothing here logs or blocks; the UI
/// logs voice activity when it drains the observer's events.
///
/// Messages are applied in arrival order at the start of each block, so for
/// any key a press and its release are never reordered. Everything that can
/// go wrong with input is a silent no-op:
///
/// - a key outside the frequency table
/// - a press while that key's voice is already held (key repeat)
/// - a release or pointer-leave with no voice held
pub struct KeyboardSynth<R, O> {
    session: SynthSession,
    table: FrequencyTable,
    rx: R,
    observer: O,
}

impl<R: MessageReceiver, O: VoiceObserver> KeyboardSynth<R, O> {
    pub fn new(sample_rate: f32, config: &SynthConfig, rx: R, observer: O) -> Self {
        Self {
            session: SynthSession::new(sample_rate, config),
            table: FrequencyTable::standard(),
            rx,
            observer,
        }
    }

    /// Apply one message.
    pub fn handle(&mut self, msg: SynthMessage) {
        match msg {
            SynthMessage::Press(key) => {
                self.press(key);
            }
            SynthMessage::Release(key) | SynthMessage::PointerLeave(key) => {
                self.release(key);
            }
            SynthMessage::SetWaveform(waveform) => self.session.set_waveform(waveform),
            SynthMessage::AllNotesOff => self.all_notes_off(),
        }
    }

    /// Start the key's voice. Returns true if a voice was started.
    pub fn press(&mut self, key: KeyId) -> bool {
        let Some(frequency) = self.table.frequency(key) else {
            return false;
        };
        if self.session.is_active(key) {
            return false;
        }
        if self.session.start_voice(key, frequency).is_none() {
            return false;
        }

        self.observer.on_voice_start(key, freq_to_hue(frequency));
        true
    }

    /// Release the key's voice. Returns true if a voice was released.
    pub fn release(&mut self, key: KeyId) -> bool {
        if !self.session.stop_voice(key) {
            return false;
        }
        self.observer.on_voice_stop(key);
        true
    }

    /// Tear the session down, reporting every held key as stopped.
    pub fn all_notes_off(&mut self) {
        for key in self.session.active_keys() {
            self.observer.on_voice_stop(key);
        }
        self.session.teardown();
    }

    /// Apply pending messages, then render the next block.
    pub fn render_block(&mut self, out: &mut [f32]) {
        while let Some(msg) = self.rx.pop() {
            self.handle(msg);
        }
        self.session.render_block(out);
    }

    pub fn session(&self) -> &SynthSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SynthSession {
        &mut self.session
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }
}

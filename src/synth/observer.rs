#[cfg(feature = "rtrb")]
use rtrb::Producer;

use crate::keys::KeyId;

/// What the visual layer hears about voices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualEvent {
    VoiceStarted { key: KeyId, hue: u16 },
    VoiceStopped { key: KeyId },
}

/// Receives voice lifecycle notifications from the input router.
///
/// Called on the audio thread, so implementations must not block.
pub trait VoiceObserver {
    fn on_voice_start(&mut self, key: KeyId, hue: u16);
    fn on_voice_stop(&mut self, key: KeyId);
}

/// Nobody is watching.
impl VoiceObserver for () {
    fn on_voice_start(&mut self, _key: KeyId, _hue: u16) {}
    fn on_voice_stop(&mut self, _key: KeyId) {}
}

impl VoiceObserver for Vec<VisualEvent> {
    fn on_voice_start(&mut self, key: KeyId, hue: u16) {
        self.push(VisualEvent::VoiceStarted { key, hue });
    }

    fn on_voice_stop(&mut self, key: KeyId) {
        self.push(VisualEvent::VoiceStopped { key });
    }
}

/// Forwards events to the UI thread; drops them if the ring is full.
#[cfg(feature = "rtrb")]
impl VoiceObserver for Producer<VisualEvent> {
    fn on_voice_start(&mut self, key: KeyId, hue: u16) {
        let _ = self.push(VisualEvent::VoiceStarted { key, hue });
    }

    fn on_voice_stop(&mut self, key: KeyId) {
        let _ = self.push(VisualEvent::VoiceStopped { key });
    }
}

#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer};
use std::collections::VecDeque;

use crate::{dsp::Waveform, keys::KeyId};

/// Requests travelling from the input side to the audio thread.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SynthMessage {
    /// A key went down (typed or pointer).
    Press(KeyId),
    /// A key came up.
    Release(KeyId),
    /// The pointer left a drawn key while holding it down.
    PointerLeave(KeyId),
    /// Waveform for voices started from now on.
    SetWaveform(Waveform),
    /// Stop every voice immediately (shutdown).
    AllNotesOff,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

pub trait MessageSender {
    /// Queue a message. Returns false if it was dropped.
    fn push(&mut self, msg: SynthMessage) -> bool;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

#[cfg(feature = "rtrb")]
impl MessageSender for Producer<SynthMessage> {
    fn push(&mut self, msg: SynthMessage) -> bool {
        Producer::push(self, msg).is_ok()
    }
}

impl MessageReceiver for VecDeque<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        self.pop_front()
    }
}

impl MessageSender for VecDeque<SynthMessage> {
    fn push(&mut self, msg: SynthMessage) -> bool {
        self.push_back(msg);
        true
    }
}

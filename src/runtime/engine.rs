//! The audio engine gate.
//!
//! The output stream is built up front but held suspended until the first
//! key press, the same way browsers keep audio contexts suspended until a
//! user gesture. Only a press resumes it; releases and other messages pass
//! straight through. Messages queued while suspended stay in the ring and
//! are applied exactly once, in order, when the callback first runs.

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use cpal::traits::StreamTrait;
use log::{info, warn};

use crate::synth::message::{MessageSender, SynthMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Suspended,
    Running,
}

/// Something that renders audio once resumed.
pub trait AudioEngine {
    fn state(&self) -> EngineState;

    fn resume(&mut self) -> EyreResult<()>;
}

/// A cpal output stream behind the gate.
pub struct CpalEngine {
    stream: cpal::Stream,
    state: EngineState,
}

impl CpalEngine {
    /// Take a freshly built stream and hold it suspended.
    ///
    /// Backends that cannot pause are started right away instead.
    pub fn suspended(stream: cpal::Stream) -> EyreResult<Self> {
        let state = match stream.pause() {
            Ok(()) => EngineState::Suspended,
            Err(err) => {
                warn!("output stream cannot be paused ({err}), starting it now");
                stream.play().wrap_err("failed to start output stream")?;
                EngineState::Running
            }
        };
        Ok(Self { stream, state })
    }
}

impl AudioEngine for CpalEngine {
    fn state(&self) -> EngineState {
        self.state
    }

    fn resume(&mut self) -> EyreResult<()> {
        if self.state == EngineState::Running {
            return Ok(());
        }
        self.stream.play().wrap_err("failed to resume output stream")?;
        self.state = EngineState::Running;
        Ok(())
    }
}

/// Forwards input messages to the audio thread, resuming the engine on the
/// first press.
pub struct InputGate<E, T> {
    engine: E,
    tx: T,
    dropped: usize,
}

impl<E: AudioEngine, T: MessageSender> InputGate<E, T> {
    pub fn new(engine: E, tx: T) -> Self {
        Self {
            engine,
            tx,
            dropped: 0,
        }
    }

    /// Send one message. Returns false if the ring was full and the message
    /// was dropped.
    pub fn send(&mut self, msg: SynthMessage) -> EyreResult<bool> {
        if matches!(msg, SynthMessage::Press(_)) && self.engine.state() == EngineState::Suspended
        {
            info!("first press, resuming audio engine");
            self.engine.resume()?;
        }

        let sent = self.tx.push(msg);
        if !sent {
            self.dropped += 1;
            warn!("message ring full, dropped {msg:?}");
        }
        Ok(sent)
    }

    pub fn engine_state(&self) -> EngineState {
        self.engine.state()
    }

    /// Messages lost to a full ring.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn sender(&self) -> &T {
        &self.tx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyId;
    use color_eyre::eyre::eyre;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct FakeEngine {
        running: bool,
        resumes: usize,
        fail: bool,
    }

    impl AudioEngine for FakeEngine {
        fn state(&self) -> EngineState {
            if self.running {
                EngineState::Running
            } else {
                EngineState::Suspended
            }
        }

        fn resume(&mut self) -> EyreResult<()> {
            if self.fail {
                return Err(eyre!("device gone"));
            }
            self.resumes += 1;
            self.running = true;
            Ok(())
        }
    }

    fn gate() -> InputGate<FakeEngine, VecDeque<SynthMessage>> {
        InputGate::new(FakeEngine::default(), VecDeque::new())
    }

    fn key(code: u16) -> KeyId {
        KeyId::new(code)
    }

    #[test]
    fn first_press_resumes_once() {
        let mut gate = gate();
        assert_eq!(gate.engine_state(), EngineState::Suspended);

        gate.send(SynthMessage::Press(key(90))).unwrap();
        gate.send(SynthMessage::Press(key(83))).unwrap();

        assert_eq!(gate.engine().resumes, 1);
        assert_eq!(gate.engine_state(), EngineState::Running);
    }

    #[test]
    fn release_does_not_resume() {
        let mut gate = gate();
        gate.send(SynthMessage::Release(key(90))).unwrap();
        gate.send(SynthMessage::PointerLeave(key(90))).unwrap();
        assert_eq!(gate.engine().resumes, 0);
        assert_eq!(gate.sender().len(), 2);
    }

    #[test]
    fn messages_keep_their_order() {
        let mut gate = gate();
        let sequence = [
            SynthMessage::Press(key(90)),
            SynthMessage::Release(key(90)),
            SynthMessage::Press(key(90)),
        ];
        for msg in sequence {
            assert!(gate.send(msg).unwrap());
        }
        assert_eq!(gate.sender().iter().copied().collect::<Vec<_>>(), sequence);
    }

    #[test]
    fn failed_resume_does_not_forward_the_press() {
        let mut gate = InputGate::new(
            FakeEngine {
                fail: true,
                ..Default::default()
            },
            VecDeque::new(),
        );
        assert!(gate.send(SynthMessage::Press(key(90))).is_err());
        assert!(gate.sender().is_empty());
    }
}

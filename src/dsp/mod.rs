//! Low-level DSP primitives used by the voice and session layers.
//!
//! These components are allocation-free and realtime-safe, so they can live
//! directly inside voice structs on the audio thread. They stay focused on
//! the signal math; scheduling, ownership and routing live in `synth`.

/// Attack/decay/sustain/release envelope state machine.
pub mod envelope;
/// Periodic waveform generators.
pub mod oscillator;
/// Exponential "approach a target" curves and a smoothed gain.
pub mod smoother;

pub use envelope::{Envelope, EnvelopeShape, EnvelopeState};
pub use oscillator::{OscillatorBlock, Waveform};
pub use smoother::{exponential_approach, ExpSmoother};

//! Live runtime: audio device, engine gate and terminal UI.
//!
//! This module provides the `KeyGlow` builder that opens the default output
//! device and runs the keyboard until the user quits.
//!
//! # Example
//!
//! ```ignore
//! use keyglow::{dsp::Waveform, runtime::KeyGlow};
//!
//! fn main() -> color_eyre::Result<()> {
//!     KeyGlow::new().waveform(Waveform::Triangle).run()
//! }
//! ```

mod app;
pub mod engine;
pub mod input;
mod ui;

pub use app::KeyGlow;
pub use engine::{AudioEngine, CpalEngine, EngineState, InputGate};
pub use ui::{KeyboardView, MemoryOverlay, SpectrumAnalyzer};

pub mod config; // Tunables shared by the synth, monitor and UI
pub mod dsp;
pub mod keys; // Key identifiers, frequency table and note hues
pub mod monitor; // Output peak tracking
pub mod synth; // Voice management, normalization and input routing

#[cfg(feature = "rtrb")]
pub mod runtime; // Audio device, engine gate and terminal UI

pub use config::SynthConfig;

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;

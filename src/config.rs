//! Tunables for the keyboard synth.
//!
//! Everything the voice engine, normalization, amplitude monitor and UI
//! treat as a constant lives here so a caller can adjust it in one place.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::dsp::{EnvelopeShape, Waveform};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct SynthConfig {
    /// Per-voice envelope contour.
    pub envelope: EnvelopeShape,
    /// Waveform for voices started before the selector is touched.
    pub waveform: Waveform,
    /// Output gain with a single voice sounding (and the ceiling overall).
    pub base_master_gain: f32,
    /// How quickly the output gain follows the voice count (seconds).
    pub normalization_time_constant: f32,
    /// Peak above which the amplitude monitor warns.
    pub near_clip_threshold: f32,
    /// Samples the amplitude monitor and analyser look at per frame.
    pub analyser_window: usize,
    /// How long a key's color memory takes to fade after release.
    pub memory_fade: Duration,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            envelope: EnvelopeShape::default(),
            waveform: Waveform::Sine,
            base_master_gain: 0.8,
            normalization_time_constant: 0.5,
            near_clip_threshold: 0.95,
            analyser_window: 2048,
            memory_fade: Duration::from_secs(1),
        }
    }
}

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::{f32::consts::TAU, fmt, str::FromStr};

/*
Oscillator
==========

Each voice owns one oscillator: a phase accumulator that walks from 0.0 to
1.0 once per period and a waveform function that turns the phase into a
sample in [-1.0, +1.0].

    phase_increment = frequency / sample_rate

At 261.63 Hz and 48 kHz the phase advances by ~0.00545 per sample, so one
period of middle C lasts ~183 samples.

Shapes (all start at phase 0.0 with the same polarity as a sine):

  Sine      pure fundamental, no harmonics
  Square    odd harmonics falling off as 1/n, hollow and loud
  Sawtooth  all harmonics falling off as 1/n, bright and buzzy
  Triangle  odd harmonics falling off as 1/n², soft

The waveforms are computed naively (no band-limiting). At the two octaves
the keyboard covers, aliasing of the square and sawtooth is audible only as
a slight grit on the top notes.

The waveform is fixed when the oscillator is created. Changing the
keyboard's waveform selection only affects voices started afterwards.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl Waveform {
    /// Selector order.
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Sawtooth,
        Waveform::Triangle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Triangle => "triangle",
        }
    }

    /// The next waveform in selector order, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&w| w == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Waveform value at `phase` (expected in [0.0, 1.0)).
    #[inline]
    pub fn sample(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => {
                if phase < 0.5 {
                    2.0 * phase
                } else {
                    2.0 * phase - 2.0
                }
            }
            Waveform::Triangle => {
                if phase < 0.25 {
                    4.0 * phase
                } else if phase < 0.75 {
                    2.0 - 4.0 * phase
                } else {
                    4.0 * phase - 4.0
                }
            }
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a waveform name is not one of `sine`, `square`, `sawtooth`
/// or `triangle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWaveformError(String);

impl fmt::Display for ParseWaveformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown waveform '{}'", self.0)
    }
}

impl std::error::Error for ParseWaveformError {}

impl FromStr for Waveform {
    type Err = ParseWaveformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sine" => Ok(Waveform::Sine),
            "square" => Ok(Waveform::Square),
            "sawtooth" | "saw" => Ok(Waveform::Sawtooth),
            "triangle" => Ok(Waveform::Triangle),
            _ => Err(ParseWaveformError(s.to_string())),
        }
    }
}

/// Phase-accumulating oscillator with a fixed waveform.
#[derive(Debug, Clone)]
pub struct OscillatorBlock {
    waveform: Waveform,
    phase: f32,
}

impl OscillatorBlock {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
        }
    }

    pub fn sine() -> Self {
        Self::new(Waveform::Sine)
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Produce one sample and advance the phase.
    #[inline]
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let out = self.waveform.sample(self.phase);
        self.phase += frequency / sample_rate;
        self.phase -= self.phase.floor();
        out
    }

    /// Fill `out` with consecutive samples.
    pub fn render(&mut self, out: &mut [f32], frequency: f32, sample_rate: f32) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(frequency, sample_rate);
        }
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_sine() {
        let sample_rate = 48_000.0;
        let frequency = 440.0;
        let mut osc = OscillatorBlock::sine();

        let mut buffer = vec![0.0f32; 128];
        osc.render(&mut buffer, frequency, sample_rate);

        // sample n should be sin(2pi f n / sr)
        let sample_index = 12;
        let expected = (TAU * frequency * sample_index as f32 / sample_rate).sin();
        let actual = buffer[sample_index];
        assert!(
            (actual - expected).abs() < 1e-5,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn every_waveform_stays_in_range() {
        for waveform in Waveform::ALL {
            let mut osc = OscillatorBlock::new(waveform);
            let mut buffer = vec![0.0f32; 4096];
            osc.render(&mut buffer, 987.77, 44_100.0);
            assert!(
                buffer.iter().all(|s| (-1.0..=1.0).contains(s)),
                "{waveform} left [-1, 1]"
            );
        }
    }

    #[test]
    fn square_flips_at_half_period() {
        // 100 Hz at 1 kHz: ten samples per period
        let mut osc = OscillatorBlock::new(Waveform::Square);
        let mut buffer = [0.0f32; 10];
        osc.render(&mut buffer, 100.0, 1_000.0);
        assert_eq!(&buffer[..5], &[1.0; 5]);
        assert_eq!(&buffer[5..], &[-1.0; 5]);
    }

    #[test]
    fn triangle_peaks_at_quarter_period() {
        assert_eq!(Waveform::Triangle.sample(0.0), 0.0);
        assert!((Waveform::Triangle.sample(0.25) - 1.0).abs() < 1e-6);
        assert!((Waveform::Triangle.sample(0.75) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn parses_selector_names() {
        assert_eq!("sine".parse::<Waveform>(), Ok(Waveform::Sine));
        assert_eq!("Square".parse::<Waveform>(), Ok(Waveform::Square));
        assert_eq!("saw".parse::<Waveform>(), Ok(Waveform::Sawtooth));
        assert_eq!("triangle".parse::<Waveform>(), Ok(Waveform::Triangle));
        assert!("organ".parse::<Waveform>().is_err());
    }

    #[test]
    fn next_cycles_through_all_shapes() {
        let mut w = Waveform::Sine;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(w);
            w = w.next();
        }
        assert_eq!(seen, Waveform::ALL);
        assert_eq!(w, Waveform::Sine);
    }
}

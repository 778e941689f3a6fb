//! Spectrum analyzer widget
//!
//! FFT over the analyser window with log-spaced bins across the playable
//! range and a couple of octaves of harmonics above it.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Number of frequency bins to display
const SPECTRUM_BINS: usize = 64;
/// Lowest displayed frequency, an octave and a bit under C4
const MIN_FREQ: f32 = 100.0;
/// Highest displayed frequency, enough for the square and saw harmonics
const MAX_FREQ: f32 = 8_000.0;
/// Floor for silent bins
const FLOOR_DB: f64 = -120.0;

pub struct SpectrumAnalyzer {
    /// Hann window coefficients
    window: Vec<f32>,
    /// Frequency values for each bin (Hz)
    freq_bins: Vec<f64>,
    /// FFT bin index behind each displayed bin
    bin_indices: Vec<usize>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// Current spectrum data: (frequency_hz, magnitude_db)
    spectrum: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    /// `window_len` is the FFT size and must match the buffers passed to
    /// `update`.
    pub fn new(window_len: usize, sample_rate: f32) -> Self {
        let window_len = window_len.max(2);
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(window_len);

        let denom = (window_len - 1) as f32;
        let window: Vec<f32> = (0..window_len)
            .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / denom).cos()))
            .collect();

        let max_freq = (sample_rate / 2.0).min(MAX_FREQ).max(MIN_FREQ * 2.0) as f64;
        let min_freq = MIN_FREQ as f64;
        let ratio = max_freq / min_freq;
        let half = window_len / 2;

        let mut freq_bins = Vec::with_capacity(SPECTRUM_BINS);
        let mut bin_indices = Vec::with_capacity(SPECTRUM_BINS);
        for i in 0..SPECTRUM_BINS {
            let t = i as f64 / (SPECTRUM_BINS - 1) as f64;
            let freq = min_freq * ratio.powf(t);
            let index = (freq * window_len as f64 / sample_rate as f64).round() as usize;
            freq_bins.push(freq);
            bin_indices.push(index.min(half - 1));
        }

        let spectrum = freq_bins.iter().map(|&f| (f, FLOOR_DB)).collect();

        Self {
            window,
            freq_bins,
            bin_indices,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); window_len],
            spectrum,
        }
    }

    /// Recompute from the latest window of output. Buffers of the wrong
    /// length are ignored.
    pub fn update(&mut self, buffer: &[f32]) {
        if buffer.len() != self.window.len() {
            return;
        }

        for ((slot, &sample), &w) in self.scratch.iter_mut().zip(buffer).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        for ((point, &idx), &freq) in self
            .spectrum
            .iter_mut()
            .zip(&self.bin_indices)
            .zip(&self.freq_bins)
        {
            let bin = self.scratch[idx];
            let power = (bin.re * bin.re + bin.im * bin.im).max(1e-12);
            *point = (freq, (10.0 * (power as f64).log10()).max(FLOOR_DB));
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.spectrum
    }

    /// Displayed bin closest to `frequency`.
    pub fn nearest_bin(&self, frequency: f64) -> usize {
        self.freq_bins
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                (*a - frequency)
                    .abs()
                    .total_cmp(&(*b - frequency).abs())
            })
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}

pub fn render_spectrum(frame: &mut Frame, area: Rect, spectrum: &[(f64, f64)]) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);

    // Plot against log frequency so octaves are evenly spaced
    let data: Vec<(f64, f64)> = spectrum.iter().map(|&(f, db)| (f.log2(), db)).collect();
    let (min_x, max_x) = data
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), &(x, _)| (lo.min(x), hi.max(x)));
    let (min_x, max_x) = if min_x < max_x { (min_x, max_x) } else { (0.0, 1.0) };

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([min_x, max_x])
                .labels(vec![
                    format!("{:.0}", min_x.exp2()),
                    format!("{:.0}", max_x.exp2()),
                ])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-100.0, 40.0])
                .labels(vec!["-100", "-30", "40"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}

//! KeyGlow - application builder and runner

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait};
use log::{error, info};
use rtrb::RingBuffer;

use super::{
    engine::{CpalEngine, InputGate},
    input::{disable_terminal_input, enable_terminal_input},
    ui::UiApp,
};
use crate::{
    config::SynthConfig,
    dsp::Waveform,
    synth::{KeyboardSynth, SynthMessage, VisualEvent},
    MAX_BLOCK_SIZE,
};

/// Room for a burst of input between two audio callbacks
const MESSAGE_RING: usize = 256;
/// Voice start/stop notifications are two per note at most
const VISUAL_RING: usize = 256;
/// Output samples buffered for the UI, in analyser windows
const AUDIO_RING_WINDOWS: usize = 16;

/// Main application builder
pub struct KeyGlow {
    config: SynthConfig,
}

impl KeyGlow {
    pub fn new() -> Self {
        Self {
            config: SynthConfig::default(),
        }
    }

    /// Waveform for the first notes played.
    pub fn waveform(mut self, waveform: Waveform) -> Self {
        self.config.waveform = waveform;
        self
    }

    /// Replace every tunable at once.
    pub fn config(mut self, config: SynthConfig) -> Self {
        self.config = config;
        self
    }

    /// Open the default output device and run the UI until the user quits.
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let supported = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = supported.sample_rate().0 as f32;
        let channels = supported.channels() as usize;
        info!(
            "output: {} @ {sample_rate} Hz, {channels} channel(s)",
            device.name().unwrap_or_else(|_| "unknown device".into())
        );

        let (msg_tx, msg_rx) = RingBuffer::<SynthMessage>::new(MESSAGE_RING);
        let (visual_tx, visual_rx) = RingBuffer::<VisualEvent>::new(VISUAL_RING);
        let (mut audio_tx, audio_rx) =
            RingBuffer::<f32>::new(self.config.analyser_window * AUDIO_RING_WINDOWS);

        // The synth moves into the callback; nothing else touches it
        let mut synth = KeyboardSynth::new(sample_rate, &self.config, msg_rx, visual_tx);
        let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device
            .build_output_stream(
                &supported.into(),
                move |data: &mut [f32], _| {
                    let total_frames = data.len() / channels;
                    let mut frames_written = 0;

                    while frames_written < total_frames {
                        let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                        let block = &mut render_buf[..frames];
                        synth.render_block(block);

                        // Mono to all channels
                        let out_off = frames_written * channels;
                        for (i, &s) in block.iter().enumerate() {
                            let frame = out_off + i * channels;
                            data[frame..frame + channels].fill(s);
                            // Scope and monitor are best effort
                            let _ = audio_tx.push(s);
                        }

                        frames_written += frames;
                    }
                },
                |err| error!("audio stream error: {err}"),
                None,
            )
            .wrap_err("failed to build output stream")?;

        let engine = CpalEngine::suspended(stream)?;
        let gate = InputGate::new(engine, msg_tx);

        let mut terminal = ratatui::init();
        let terminal_input = match enable_terminal_input() {
            Ok(input) => input,
            Err(err) => {
                ratatui::restore();
                return Err(err).wrap_err("failed to configure terminal input");
            }
        };

        let mut app = UiApp::new(
            gate,
            audio_rx,
            visual_rx,
            &self.config,
            sample_rate,
            terminal_input,
        );
        let result = app.run(&mut terminal);

        disable_terminal_input(terminal_input);
        ratatui::restore();

        app.shutdown()?;
        info!("bye");
        result
    }
}

impl Default for KeyGlow {
    fn default() -> Self {
        Self::new()
    }
}

//! Terminal UI for keyglow
//!
//! Draws the keyboard, output scope and spectrum, and turns terminal input
//! into synth messages. Runs on the main thread; everything it learns about
//! voices arrives as `VisualEvent`s from the audio thread.

mod keyboard;
mod spectrum;
mod status;
mod waveform;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent};
use log::{debug, info};
use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};
use std::time::{Duration, Instant};

use crate::{
    config::SynthConfig,
    dsp::Waveform,
    keys::FrequencyTable,
    monitor::{AmplitudeMonitor, PeakReport},
    runtime::{
        engine::{AudioEngine, EngineState, InputGate},
        input::{key_message, HoldTracker, PointerTracker, TerminalInput, FALLBACK_HOLD},
    },
    synth::{SynthMessage, VisualEvent},
};

pub use keyboard::{KeyboardView, MemoryOverlay};
pub use spectrum::SpectrumAnalyzer;

use spectrum::render_spectrum;
use status::{render_status, StatusLine};
use waveform::render_waveform;

/// Frame period, ~60fps
const FRAME: Duration = Duration::from_millis(16);
/// Time for the audio thread to pick up the final all-notes-off
const SHUTDOWN_GRACE: Duration = Duration::from_millis(50);

pub struct UiApp<E> {
    gate: InputGate<E, Producer<SynthMessage>>,
    /// Output samples from the audio thread
    audio_rx: Consumer<f32>,
    /// Voice lifecycle events from the audio thread
    visual_rx: Consumer<VisualEvent>,
    table: FrequencyTable,
    keyboard: KeyboardView,
    analyzer: SpectrumAnalyzer,
    monitor: AmplitudeMonitor,
    report: PeakReport,
    /// Last `window` output samples
    audio_buffer: Vec<f32>,
    window: usize,
    sample_rate: f32,
    waveform: Waveform,
    terminal_input: TerminalInput,
    holds: HoldTracker,
    pointer: PointerTracker,
    should_quit: bool,
}

impl<E: AudioEngine> UiApp<E> {
    pub fn new(
        gate: InputGate<E, Producer<SynthMessage>>,
        audio_rx: Consumer<f32>,
        visual_rx: Consumer<VisualEvent>,
        config: &SynthConfig,
        sample_rate: f32,
        terminal_input: TerminalInput,
    ) -> Self {
        let table = FrequencyTable::standard();
        let window = config.analyser_window.max(2);
        Self {
            gate,
            audio_rx,
            visual_rx,
            table,
            keyboard: KeyboardView::new(table, config.memory_fade),
            analyzer: SpectrumAnalyzer::new(window, sample_rate),
            monitor: AmplitudeMonitor::new(config.near_clip_threshold),
            report: PeakReport {
                peak: 0.0,
                record: 0.0,
                new_record: false,
                near_clip: false,
            },
            audio_buffer: vec![0.0; window],
            window,
            sample_rate,
            waveform: config.waveform,
            terminal_input,
            holds: HoldTracker::new(FALLBACK_HOLD),
            pointer: PointerTracker::default(),
            should_quit: false,
        }
    }

    /// Run the UI event loop until Esc or Ctrl+C.
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            let now = Instant::now();
            self.poll_audio();
            self.poll_visual(now);
            self.expire_holds(now)?;

            self.report = self.monitor.sample(&self.audio_buffer);
            self.analyzer.update(&self.audio_buffer);
            self.keyboard.prune(now);

            terminal.draw(|frame| self.render(frame, now))?;

            if event::poll(FRAME)? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key)?,
                    Event::Mouse(mouse) => self.handle_mouse(mouse)?,
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Silence everything and give the audio thread a moment to apply it.
    pub fn shutdown(&mut self) -> EyreResult<()> {
        info!("all notes off");
        self.gate.send(SynthMessage::AllNotesOff)?;
        if self.gate.engine_state() == EngineState::Running {
            std::thread::sleep(SHUTDOWN_GRACE);
        }
        Ok(())
    }

    /// Keep the last `window` samples.
    fn poll_audio(&mut self) {
        while let Ok(sample) = self.audio_rx.pop() {
            self.audio_buffer.push(sample);
        }
        if self.audio_buffer.len() > self.window {
            let excess = self.audio_buffer.len() - self.window;
            self.audio_buffer.drain(0..excess);
        }
    }

    fn poll_visual(&mut self, now: Instant) {
        while let Ok(event) = self.visual_rx.pop() {
            match event {
                VisualEvent::VoiceStarted { key, hue } => debug!("voice on: {key} hue {hue}"),
                VisualEvent::VoiceStopped { key } => debug!("voice off: {key}"),
            }
            self.keyboard.apply(event, now);
        }
    }

    /// Synthesized releases when the terminal cannot report them.
    fn expire_holds(&mut self, now: Instant) -> EyreResult<()> {
        if self.terminal_input.key_releases {
            return Ok(());
        }
        for key in self.holds.expired(now) {
            self.gate.send(SynthMessage::Release(key))?;
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> EyreResult<()> {
        // Before note lookup: 'c' is a note key. Releases always reach the
        // synth, whatever modifier went down while the note was held.
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.kind != KeyEventKind::Release {
            if key.code == KeyCode::Char('c') {
                self.should_quit = true;
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Esc if key.kind == KeyEventKind::Press => self.should_quit = true,
            KeyCode::Tab if key.kind == KeyEventKind::Press => {
                self.select_waveform(self.waveform.next())?;
            }
            KeyCode::F(n @ 1..=4) if key.kind == KeyEventKind::Press => {
                self.select_waveform(Waveform::ALL[n as usize - 1])?;
            }
            _ => {
                if let Some(msg) = key_message(&key, &self.table) {
                    if let SynthMessage::Press(id) = msg {
                        if !self.terminal_input.key_releases {
                            self.holds.touch(id, Instant::now());
                        }
                    }
                    self.gate.send(msg)?;
                }
            }
        }
        Ok(())
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> EyreResult<()> {
        let keyboard = &self.keyboard;
        for msg in self.pointer.handle(&mouse, |x, y| keyboard.key_at(x, y)) {
            self.gate.send(msg)?;
        }
        Ok(())
    }

    fn select_waveform(&mut self, waveform: Waveform) -> EyreResult<()> {
        info!("waveform: {waveform}");
        self.waveform = waveform;
        self.gate.send(SynthMessage::SetWaveform(waveform))?;
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame, now: Instant) {
        let [status_area, keys_area, scope_area, help_area] = Layout::vertical([
            Constraint::Length(3),  // Status bar
            Constraint::Min(8),     // Keyboard
            Constraint::Length(10), // Scope and spectrum
            Constraint::Length(1),  // Help bar
        ])
        .areas(frame.area());

        let status = StatusLine {
            waveform: self.waveform,
            sounding: self.keyboard.active_count(),
            engine: self.gate.engine_state(),
            sample_rate: self.sample_rate,
            report: self.report,
            key_releases: self.terminal_input.key_releases,
        };
        render_status(frame, status_area, &status);

        self.keyboard.render(frame, keys_area, now);

        let [wave_area, spectrum_area] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(scope_area);
        render_waveform(frame, wave_area, &self.audio_buffer, self.report.near_clip);
        render_spectrum(frame, spectrum_area, self.analyzer.data());

        let help = Paragraph::new(
            " Play: Z-M (C4-B4) Q-U (C5-B5) or click  [Tab] Next waveform  [F1-F4] Waveform  [Esc] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, help_area);
    }
}

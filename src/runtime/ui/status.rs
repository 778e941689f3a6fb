//! Status bar widget - waveform, voice count, engine state and output levels

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::{dsp::Waveform, monitor::PeakReport, runtime::engine::EngineState};

/// Everything the status bar shows.
pub struct StatusLine {
    pub waveform: Waveform,
    pub sounding: usize,
    pub engine: EngineState,
    pub sample_rate: f32,
    pub report: PeakReport,
    pub key_releases: bool,
}

fn waveform_spans(current: Waveform) -> Vec<Span<'static>> {
    Waveform::ALL
        .iter()
        .enumerate()
        .flat_map(|(i, &w)| {
            let style = if w == current {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Cyan)
            };
            [
                Span::styled(format!("F{} {}", i + 1, w.name()), style),
                Span::raw(" "),
            ]
        })
        .collect()
}

pub fn render_status(frame: &mut Frame, area: Rect, status: &StatusLine) {
    let block = Block::default().title(" keyglow ").borders(Borders::ALL);

    let (engine_label, engine_color) = match status.engine {
        EngineState::Suspended => ("⏸ press a key", Color::Yellow),
        EngineState::Running => ("▶ running", Color::Green),
    };
    let level_color = if status.report.near_clip {
        Color::Red
    } else {
        Color::Magenta
    };

    let mut spans = vec![Span::raw(" ")];
    spans.extend(waveform_spans(status.waveform));
    spans.extend([
        Span::raw(" "),
        Span::styled(
            format!("voices: {:<2}  ", status.sounding),
            Style::default().fg(Color::White),
        ),
        Span::styled(format!("{engine_label}  "), Style::default().fg(engine_color)),
        Span::styled(
            format!("{:.1}kHz  ", status.sample_rate / 1000.0),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!(
                "Peak: {:.2}  Max: {:.2}",
                status.report.peak, status.report.record
            ),
            Style::default().fg(level_color),
        ),
    ]);
    if !status.key_releases {
        spans.push(Span::styled(
            "  (no key-up events, notes time out)",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

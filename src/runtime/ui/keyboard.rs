//! On-screen keyboard with per-key color memory.
//!
//! A key lights up in its note hue while held. On release the color does not
//! vanish, it fades back to the base color over the memory window, so a
//! quick run leaves a short trail behind it.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use crate::{
    keys::{hsl_to_rgb, FrequencyTable, KeyEntry, KeyId},
    synth::VisualEvent,
};

const KEYS_PER_ROW: usize = 12;
const BASE_COLOR: (u8, u8, u8) = (38, 38, 46);
const SATURATION: f32 = 0.7;
const LIGHTNESS: f32 = 0.5;

/// Color memory of one key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryOverlay {
    pub hue: u16,
    pub held: bool,
    /// When the key was released, if it was.
    pub fading_since: Option<Instant>,
}

impl MemoryOverlay {
    /// 1 while held, then linearly down to 0 over `fade`.
    pub fn opacity(&self, now: Instant, fade: Duration) -> f32 {
        if self.held {
            return 1.0;
        }
        let Some(since) = self.fading_since else {
            return 0.0;
        };
        if fade.is_zero() {
            return 0.0;
        }
        let elapsed = now.saturating_duration_since(since).as_secs_f32();
        (1.0 - elapsed / fade.as_secs_f32()).clamp(0.0, 1.0)
    }
}

fn blend(base: (u8, u8, u8), over: (u8, u8, u8), alpha: f32) -> Color {
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * alpha).round() as u8;
    Color::Rgb(
        mix(base.0, over.0),
        mix(base.1, over.1),
        mix(base.2, over.2),
    )
}

pub struct KeyboardView {
    table: FrequencyTable,
    fade: Duration,
    overlays: HashMap<KeyId, MemoryOverlay>,
    /// Screen area of each key from the last draw.
    hit_areas: Vec<(Rect, KeyId)>,
}

impl KeyboardView {
    pub fn new(table: FrequencyTable, fade: Duration) -> Self {
        Self {
            table,
            fade,
            overlays: HashMap::new(),
            hit_areas: Vec::with_capacity(table.len()),
        }
    }

    pub fn apply(&mut self, event: VisualEvent, now: Instant) {
        match event {
            VisualEvent::VoiceStarted { key, hue } => {
                self.overlays.insert(
                    key,
                    MemoryOverlay {
                        hue,
                        held: true,
                        fading_since: None,
                    },
                );
            }
            VisualEvent::VoiceStopped { key } => {
                if let Some(overlay) = self.overlays.get_mut(&key) {
                    overlay.held = false;
                    overlay.fading_since = Some(now);
                }
            }
        }
    }

    /// Drop overlays that have fully faded.
    pub fn prune(&mut self, now: Instant) {
        let fade = self.fade;
        self.overlays.retain(|_, o| o.opacity(now, fade) > 0.0);
    }

    pub fn overlay(&self, key: KeyId) -> Option<&MemoryOverlay> {
        self.overlays.get(&key)
    }

    /// Keys currently lit as held.
    pub fn active_count(&self) -> usize {
        self.overlays.values().filter(|o| o.held).count()
    }

    /// Key drawn at a terminal cell, from the last draw.
    pub fn key_at(&self, column: u16, row: u16) -> Option<KeyId> {
        let pos = Position::new(column, row);
        self.hit_areas
            .iter()
            .find(|(area, _)| area.contains(pos))
            .map(|&(_, key)| key)
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, now: Instant) {
        self.hit_areas.clear();
        let entries = self.table.entries();
        let (lower, upper) = entries.split_at(entries.len().min(KEYS_PER_ROW));

        let [top, bottom] =
            Layout::vertical([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)]).areas(area);

        // Upper octave on the top row, like the letters on a QWERTY board
        for (row_area, row) in [(top, upper), (bottom, lower)] {
            let cells =
                Layout::horizontal([Constraint::Ratio(1, KEYS_PER_ROW as u32); KEYS_PER_ROW])
                    .split(row_area);
            for (cell, entry) in cells.iter().zip(row) {
                self.render_key(frame, *cell, entry, now);
                self.hit_areas.push((*cell, entry.key));
            }
        }
    }

    fn render_key(&self, frame: &mut Frame, area: Rect, entry: &KeyEntry, now: Instant) {
        let overlay = self.overlays.get(&entry.key);
        let opacity = overlay.map_or(0.0, |o| o.opacity(now, self.fade));
        let held = overlay.is_some_and(|o| o.held);

        let background = match overlay {
            Some(o) => blend(BASE_COLOR, hsl_to_rgb(o.hue, SATURATION, LIGHTNESS), opacity),
            None => Color::Rgb(BASE_COLOR.0, BASE_COLOR.1, BASE_COLOR.2),
        };
        let text = if opacity > 0.5 { Color::Black } else { Color::Gray };

        let mut border = Style::default().fg(Color::DarkGray);
        if held {
            border = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
        }

        let typed = entry.key.as_char().map(String::from).unwrap_or_default();
        let paragraph = Paragraph::new(vec![
            Line::from(entry.label),
            Line::from(typed).style(Style::default().add_modifier(Modifier::DIM)),
        ])
        .alignment(Alignment::Center)
        .style(Style::default().bg(background).fg(text))
        .block(Block::default().borders(Borders::ALL).border_style(border));

        frame.render_widget(paragraph, area);
    }
}

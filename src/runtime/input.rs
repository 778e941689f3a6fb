//! Terminal input translation.
//!
//! Turns crossterm key and mouse events into `SynthMessage`s. Typed keys and
//! pointer hits on drawn keys both resolve to a `KeyId`, so the synth never
//! knows which source a press came from.

use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyEventKind,
        KeyboardEnhancementFlags, MouseButton, MouseEvent, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::supports_keyboard_enhancement,
};
use log::{info, warn};
use std::{
    collections::HashMap,
    io::stdout,
    time::{Duration, Instant},
};

use crate::{
    keys::{FrequencyTable, KeyId},
    synth::message::SynthMessage,
};

/// How long a key counts as held after its last press or repeat when the
/// terminal cannot report releases. Must outlast the typematic delay.
pub const FALLBACK_HOLD: Duration = Duration::from_millis(650);

/// Terminal input capabilities negotiated at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalInput {
    /// The terminal reports key releases.
    pub key_releases: bool,
}

/// Enable mouse capture and, where supported, key release reporting.
pub fn enable_terminal_input() -> std::io::Result<TerminalInput> {
    let key_releases = supports_keyboard_enhancement().unwrap_or(false);
    if key_releases {
        execute!(
            stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
        info!("terminal reports key releases");
    } else {
        warn!(
            "terminal does not report key releases, notes end {}ms after the last repeat",
            FALLBACK_HOLD.as_millis()
        );
    }
    execute!(stdout(), EnableMouseCapture)?;
    Ok(TerminalInput { key_releases })
}

pub fn disable_terminal_input(input: TerminalInput) {
    if input.key_releases {
        let _ = execute!(stdout(), PopKeyboardEnhancementFlags);
    }
    let _ = execute!(stdout(), DisableMouseCapture);
}

/// Message for a typed key, if it plays a note.
///
/// Repeats map to presses; the synth drops them while the key is held.
pub fn key_message(event: &KeyEvent, table: &FrequencyTable) -> Option<SynthMessage> {
    let KeyCode::Char(c) = event.code else {
        return None;
    };
    let key = KeyId::from_char(c).filter(|k| table.contains(*k))?;

    match event.kind {
        KeyEventKind::Press | KeyEventKind::Repeat => Some(SynthMessage::Press(key)),
        KeyEventKind::Release => Some(SynthMessage::Release(key)),
    }
}

/// Synthesized releases for terminals that only report presses.
#[derive(Debug, Default)]
pub struct HoldTracker {
    hold: Duration,
    last_seen: HashMap<KeyId, Instant>,
}

impl HoldTracker {
    pub fn new(hold: Duration) -> Self {
        Self {
            hold,
            last_seen: HashMap::new(),
        }
    }

    /// A press or repeat for `key` arrived.
    pub fn touch(&mut self, key: KeyId, now: Instant) {
        self.last_seen.insert(key, now);
    }

    /// Keys whose hold window ran out, removed from tracking.
    pub fn expired(&mut self, now: Instant) -> Vec<KeyId> {
        let hold = self.hold;
        let mut done: Vec<KeyId> = self
            .last_seen
            .iter()
            .filter(|(_, seen)| now.saturating_duration_since(**seen) >= hold)
            .map(|(key, _)| *key)
            .collect();
        done.sort();
        for key in &done {
            self.last_seen.remove(key);
        }
        done
    }

    pub fn is_held(&self, key: KeyId) -> bool {
        self.last_seen.contains_key(&key)
    }
}

/// Tracks the drawn key currently held down with the pointer.
#[derive(Debug, Default)]
pub struct PointerTracker {
    pressed: Option<KeyId>,
}

impl PointerTracker {
    /// Translate a mouse event. `hit` resolves a cell to the key drawn there.
    ///
    /// A button-down while a key is still held (its button-up never arrived)
    /// leaves that key before pressing the new one, so no key is orphaned.
    pub fn handle(
        &mut self,
        event: &MouseEvent,
        hit: impl Fn(u16, u16) -> Option<KeyId>,
    ) -> Vec<SynthMessage> {
        let mut messages = Vec::new();
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let key = hit(event.column, event.row);
                if let Some(prev) = self.pressed {
                    if key == Some(prev) {
                        return messages;
                    }
                    self.pressed = None;
                    messages.push(SynthMessage::PointerLeave(prev));
                }
                if let Some(key) = key {
                    self.pressed = Some(key);
                    messages.push(SynthMessage::Press(key));
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(pressed) = self.pressed {
                    if hit(event.column, event.row) != Some(pressed) {
                        self.pressed = None;
                        messages.push(SynthMessage::PointerLeave(pressed));
                    }
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                messages.extend(self.pressed.take().map(SynthMessage::Release));
            }
            _ => {}
        }
        messages
    }

    pub fn pressed(&self) -> Option<KeyId> {
        self.pressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, KeyModifiers};

    fn key_event(c: char, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        }
    }

    fn mouse(kind: MouseEventKind, column: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row: 0,
            modifiers: KeyModifiers::NONE,
        }
    }

    // Two drawn keys: columns 0..4 play Z, 4..8 play S
    fn hit(column: u16, _row: u16) -> Option<KeyId> {
        match column {
            0..=3 => Some(KeyId::new(90)),
            4..=7 => Some(KeyId::new(83)),
            _ => None,
        }
    }

    #[test]
    fn typed_keys_map_to_presses_and_releases() {
        let table = FrequencyTable::standard();
        assert_eq!(
            key_message(&key_event('z', KeyEventKind::Press), &table),
            Some(SynthMessage::Press(KeyId::new(90)))
        );
        assert_eq!(
            key_message(&key_event('z', KeyEventKind::Repeat), &table),
            Some(SynthMessage::Press(KeyId::new(90)))
        );
        assert_eq!(
            key_message(&key_event('Z', KeyEventKind::Release), &table),
            Some(SynthMessage::Release(KeyId::new(90)))
        );
    }

    #[test]
    fn unmapped_keys_produce_nothing() {
        let table = FrequencyTable::standard();
        assert_eq!(key_message(&key_event('a', KeyEventKind::Press), &table), None);
        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(key_message(&esc, &table), None);
    }

    #[test]
    fn hold_tracker_expires_after_the_window() {
        let mut tracker = HoldTracker::new(Duration::from_millis(500));
        let t0 = Instant::now();
        let key = KeyId::new(90);

        tracker.touch(key, t0);
        assert!(tracker.expired(t0 + Duration::from_millis(400)).is_empty());

        // A repeat extends the hold
        tracker.touch(key, t0 + Duration::from_millis(450));
        assert!(tracker.expired(t0 + Duration::from_millis(800)).is_empty());

        assert_eq!(tracker.expired(t0 + Duration::from_millis(950)), vec![key]);
        assert!(!tracker.is_held(key));
        assert!(tracker.expired(t0 + Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn pointer_press_and_release_on_one_key() {
        let mut pointer = PointerTracker::default();
        assert_eq!(
            pointer.handle(&mouse(MouseEventKind::Down(MouseButton::Left), 1), hit),
            vec![SynthMessage::Press(KeyId::new(90))]
        );
        // Dragging within the key does nothing
        assert!(pointer
            .handle(&mouse(MouseEventKind::Drag(MouseButton::Left), 3), hit)
            .is_empty());
        assert_eq!(
            pointer.handle(&mouse(MouseEventKind::Up(MouseButton::Left), 3), hit),
            vec![SynthMessage::Release(KeyId::new(90))]
        );
    }

    #[test]
    fn dragging_off_a_key_leaves_it() {
        let mut pointer = PointerTracker::default();
        pointer.handle(&mouse(MouseEventKind::Down(MouseButton::Left), 1), hit);
        assert_eq!(
            pointer.handle(&mouse(MouseEventKind::Drag(MouseButton::Left), 5), hit),
            vec![SynthMessage::PointerLeave(KeyId::new(90))]
        );
        assert_eq!(pointer.pressed(), None);
        // Button up later has nothing left to release
        assert!(pointer
            .handle(&mouse(MouseEventKind::Up(MouseButton::Left), 5), hit)
            .is_empty());
    }

    #[test]
    fn missed_button_up_does_not_strand_the_first_key() {
        let mut pointer = PointerTracker::default();
        pointer.handle(&mouse(MouseEventKind::Down(MouseButton::Left), 1), hit);

        // Second button-down on another key without an Up in between
        assert_eq!(
            pointer.handle(&mouse(MouseEventKind::Down(MouseButton::Left), 5), hit),
            vec![
                SynthMessage::PointerLeave(KeyId::new(90)),
                SynthMessage::Press(KeyId::new(83)),
            ]
        );
        assert_eq!(
            pointer.handle(&mouse(MouseEventKind::Up(MouseButton::Left), 5), hit),
            vec![SynthMessage::Release(KeyId::new(83))]
        );
    }

    #[test]
    fn missed_button_up_then_click_between_keys_releases() {
        let mut pointer = PointerTracker::default();
        pointer.handle(&mouse(MouseEventKind::Down(MouseButton::Left), 1), hit);
        assert_eq!(
            pointer.handle(&mouse(MouseEventKind::Down(MouseButton::Left), 20), hit),
            vec![SynthMessage::PointerLeave(KeyId::new(90))]
        );
        assert_eq!(pointer.pressed(), None);

        // Down again on the held key keeps it held
        pointer.handle(&mouse(MouseEventKind::Down(MouseButton::Left), 5), hit);
        assert!(pointer
            .handle(&mouse(MouseEventKind::Down(MouseButton::Left), 6), hit)
            .is_empty());
        assert_eq!(pointer.pressed(), Some(KeyId::new(83)));
    }

    #[test]
    fn clicking_between_keys_does_nothing() {
        let mut pointer = PointerTracker::default();
        assert!(pointer
            .handle(&mouse(MouseEventKind::Down(MouseButton::Left), 20), hit)
            .is_empty());
        assert_eq!(pointer.pressed(), None);
    }
}

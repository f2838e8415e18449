//! QWERTY virtual keyboard.
//!
//! Terminals report key presses but not releases, so every press sends a
//! note-on and holds the note for a fixed gate. Pressing the same key again
//! restarts its gate; the note-off goes out from [`VirtualKeyboard::tick`].

use std::time::{Duration, Instant};

use saavy_scope::io::{
    midi::{CC_ALL_NOTES_OFF, MidiEvent, MidiMessage},
    MidiInputHandle,
};

/// Home-row piano layout: `a` is C, `w` is C#, up to `k` for the next C.
const LAYOUT: &str = "awsedftgyhujk";
const VELOCITY: u8 = 100;
const GATE: Duration = Duration::from_millis(400);

pub struct VirtualKeyboard {
    handle: MidiInputHandle,
    base_note: u8,
    /// Sounding notes and when each should be released
    held: Vec<(u8, Instant)>,
}

impl VirtualKeyboard {
    pub fn new(handle: MidiInputHandle) -> Self {
        Self {
            handle,
            base_note: 60,
            held: Vec::new(),
        }
    }

    pub fn base_note(&self) -> u8 {
        self.base_note
    }

    /// Note for `key` in the current octave, if it is a piano key.
    pub fn note_for(&self, key: char) -> Option<u8> {
        let semitone = LAYOUT.find(key.to_ascii_lowercase())? as u8;
        self.base_note.checked_add(semitone).filter(|&n| n < 128)
    }

    /// Handle a key press. Returns true when the key played a note.
    pub fn press(&mut self, key: char) -> bool {
        self.press_at(key, Instant::now())
    }

    fn press_at(&mut self, key: char, now: Instant) -> bool {
        let Some(note) = self.note_for(key) else {
            return false;
        };

        self.handle
            .push_events(&[MidiEvent::note_on(0, note, VELOCITY)], self.handle.sample_rate());

        let release = now + GATE;
        match self.held.iter_mut().find(|(held, _)| *held == note) {
            Some((_, deadline)) => *deadline = release,
            None => self.held.push((note, release)),
        }
        true
    }

    /// Release notes whose gate has run out. Call once per UI frame.
    pub fn tick(&mut self) {
        self.release_due(Instant::now());
    }

    fn release_due(&mut self, now: Instant) {
        let handle = &self.handle;
        self.held.retain(|&(note, deadline)| {
            if deadline > now {
                return true;
            }
            handle.push_events(&[MidiEvent::note_off(0, note)], handle.sample_rate());
            false
        });
    }

    pub fn octave_down(&mut self) {
        self.base_note = self.base_note.saturating_sub(12).max(12);
    }

    pub fn octave_up(&mut self) {
        self.base_note = (self.base_note + 12).min(108);
    }

    pub fn panic(&mut self) {
        self.held.clear();
        self.handle.push_message(MidiMessage::ControlChange {
            channel: 0,
            controller: CC_ALL_NOTES_OFF,
            value: 0,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saavy_scope::io::MidiEventCollector;

    fn note_offs(collector: &mut MidiEventCollector) -> Vec<u8> {
        collector
            .consume_block(512)
            .iter()
            .filter_map(|event| match event.message {
                MidiMessage::NoteOff { key, .. } => Some(key),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn layout_maps_to_chromatic_notes() {
        let (_collector, handle) = MidiEventCollector::new(16, 48_000.0);
        let mut keyboard = VirtualKeyboard::new(handle);

        assert_eq!(keyboard.note_for('a'), Some(60));
        assert_eq!(keyboard.note_for('W'), Some(61));
        assert_eq!(keyboard.note_for('k'), Some(72));
        assert_eq!(keyboard.note_for('q'), None);

        keyboard.octave_up();
        assert_eq!(keyboard.note_for('a'), Some(72));
    }

    #[test]
    fn press_plays_now_and_releases_after_gate() {
        let (mut collector, handle) = MidiEventCollector::new(16, 48_000.0);
        let mut keyboard = VirtualKeyboard::new(handle);
        let start = Instant::now();
        assert!(keyboard.press_at('h', start));

        let first = collector.consume_block(512).to_vec();
        assert_eq!(first.len(), 1);
        assert!(matches!(first[0].message, MidiMessage::NoteOn { key: 69, .. }));

        keyboard.release_due(start + GATE / 2);
        assert!(note_offs(&mut collector).is_empty());
        keyboard.release_due(start + GATE);
        assert_eq!(note_offs(&mut collector), vec![69]);
    }

    #[test]
    fn repeated_press_extends_the_gate() {
        let (mut collector, handle) = MidiEventCollector::new(16, 48_000.0);
        let mut keyboard = VirtualKeyboard::new(handle);
        let start = Instant::now();
        let repeat = start + Duration::from_millis(100);

        keyboard.press_at('a', start);
        keyboard.press_at('a', repeat);
        collector.consume_block(512);

        // The first press's release time passes without cutting the retriggered note
        keyboard.release_due(start + GATE);
        assert!(note_offs(&mut collector).is_empty());

        keyboard.release_due(repeat + GATE);
        assert_eq!(note_offs(&mut collector), vec![60]);
        keyboard.release_due(repeat + GATE * 2);
        assert!(note_offs(&mut collector).is_empty());
    }

    #[test]
    fn panic_forgets_held_notes() {
        let (mut collector, handle) = MidiEventCollector::new(16, 48_000.0);
        let mut keyboard = VirtualKeyboard::new(handle);
        let start = Instant::now();
        keyboard.press_at('s', start);
        keyboard.panic();
        collector.consume_block(512);

        keyboard.release_due(start + GATE);
        assert!(note_offs(&mut collector).is_empty());
    }
}

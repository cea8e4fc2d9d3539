//! Key identifiers, the key-to-pitch table, and shared held-key state.
//!
//! The playable surface is two octaves plus a top C, laid out across a
//! QWERTY keyboard like a piano: the bottom letter row is the lower octave's
//! white keys with its black keys on the home row, the top letter row is the
//! upper octave with its black keys on the digit row.
//!
//! Keys are statically enumerated; a key is an index into [`KEYMAP`] and the
//! held set is a bitmask. That keeps the audio-thread snapshot to a couple
//! of atomic loads and the voice table to a fixed array.

use std::sync::atomic::{AtomicU16, AtomicU32, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of playable keys (and voices).
pub const NUM_KEYS: usize = 25;

/// One playable key: the character that triggers it, the pitch it sounds,
/// and — for digit-row keys — the numpad digit that collides with it.
pub struct KeyDef {
    pub ch: char,
    pub name: &'static str,
    pub frequency: f32,
    pub numpad_digit: Option<u8>,
}

const fn white(ch: char, name: &'static str, frequency: f32) -> KeyDef {
    KeyDef {
        ch,
        name,
        frequency,
        numpad_digit: None,
    }
}

const fn digit(ch: char, name: &'static str, frequency: f32, d: u8) -> KeyDef {
    KeyDef {
        ch,
        name,
        frequency,
        numpad_digit: Some(d),
    }
}

/// Key table in ascending pitch order. Equal temperament, A4 = 440 Hz.
pub static KEYMAP: [KeyDef; NUM_KEYS] = [
    white('z', "C4", 261.63),
    white('s', "C#4", 277.18),
    white('x', "D4", 293.66),
    white('d', "D#4", 311.13),
    white('c', "E4", 329.63),
    white('v', "F4", 349.23),
    white('g', "F#4", 369.99),
    white('b', "G4", 392.00),
    white('h', "G#4", 415.30),
    white('n', "A4", 440.00),
    white('j', "A#4", 466.16),
    white('m', "B4", 493.88),
    white('q', "C5", 523.25),
    digit('2', "C#5", 554.37, 2),
    white('w', "D5", 587.33),
    digit('3', "D#5", 622.25, 3),
    white('e', "E5", 659.25),
    white('r', "F5", 698.46),
    digit('5', "F#5", 739.99, 5),
    white('t', "G5", 783.99),
    digit('6', "G#5", 830.61, 6),
    white('y', "A5", 880.00),
    digit('7', "A#5", 932.33, 7),
    white('u', "B5", 987.77),
    white('i', "C6", 1046.50),
];

/// Index of the key triggered by `ch`, if it is a note key.
pub fn key_for_char(ch: char) -> Option<usize> {
    let lower = ch.to_ascii_lowercase();
    KEYMAP.iter().position(|k| k.ch == lower)
}

/// Policy for the digit-row / numpad collision.
///
/// The five digit-row note keys share characters with numpad digits, and the
/// numpad doubles as the control surface (waveform select, effect toggles).
/// Which source wins is a product rule, not a correctness rule, so it is
/// configurable.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigitRowPolicy {
    /// A held numpad digit suppresses the matching digit-row note, so
    /// toggling an effect never also sounds a note. The default.
    #[default]
    NumpadSuppresses,
    /// Either source sounds the note.
    Merge,
}

/// Point-in-time copy of the input state, taken once per audio block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeySnapshot {
    /// Held note keys, one bit per `KEYMAP` index.
    pub notes: u32,
    /// Held numpad digits, one bit per digit 0-9.
    pub numpad: u16,
}

impl KeySnapshot {
    /// Resolve the snapshot to the effective held-note mask under `policy`.
    pub fn resolve(self, policy: DigitRowPolicy) -> u32 {
        let mut held = self.notes;
        for (idx, key) in KEYMAP.iter().enumerate() {
            if let Some(d) = key.numpad_digit {
                let numpad_down = self.numpad & (1 << d) != 0;
                match policy {
                    DigitRowPolicy::NumpadSuppresses if numpad_down => {
                        held &= !(1 << idx);
                    }
                    DigitRowPolicy::Merge if numpad_down => {
                        held |= 1 << idx;
                    }
                    _ => {}
                }
            }
        }
        held
    }
}

/// Held-key state shared between the input thread and the audio thread.
///
/// The input thread writes on press/release events; the audio thread takes
/// one [`KeySnapshot`] at the start of each block and never re-reads
/// mid-block, so every on/off decision within a block is consistent.
#[derive(Default)]
pub struct KeyboardState {
    notes: AtomicU32,
    numpad: AtomicU16,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press_char(&self, ch: char) {
        if let Some(idx) = key_for_char(ch) {
            self.notes.fetch_or(1 << idx, Ordering::Release);
        }
    }

    pub fn release_char(&self, ch: char) {
        if let Some(idx) = key_for_char(ch) {
            self.notes.fetch_and(!(1 << idx), Ordering::Release);
        }
    }

    pub fn press_numpad(&self, digit: u8) {
        if digit < 10 {
            self.numpad.fetch_or(1 << digit, Ordering::Release);
        }
    }

    pub fn release_numpad(&self, digit: u8) {
        if digit < 10 {
            self.numpad.fetch_and(!(1 << digit), Ordering::Release);
        }
    }

    /// Drop everything held. Used on shutdown and on focus loss, where
    /// release events may never arrive.
    pub fn release_all(&self) {
        self.notes.store(0, Ordering::Release);
        self.numpad.store(0, Ordering::Release);
    }

    pub fn snapshot(&self) -> KeySnapshot {
        KeySnapshot {
            notes: self.notes.load(Ordering::Acquire),
            numpad: self.numpad.load(Ordering::Acquire),
        }
    }
}

/// Names of the keys set in `mask`, in pitch order. For status display.
pub fn note_names(mask: u32) -> impl Iterator<Item = &'static str> {
    KEYMAP
        .iter()
        .enumerate()
        .filter(move |(idx, _)| mask & (1 << idx) != 0)
        .map(|(_, key)| key.name)
}

use crate::keys::KEYMAP;

/// One playable note and its envelope timing.
///
/// Voices are created once at startup, one per key, and never destroyed;
/// only the held flag and the two timestamps mutate, and only the engine
/// mutates them, once per block. Invariant after the first press: `time_off`
/// is `None` exactly while the key is held. A voice that is not held but has
/// a `time_off` is releasing and stays audible until its envelope runs out.
#[derive(Debug, Clone, Copy)]
pub struct Voice {
    key: usize,
    frequency: f32,
    held: bool,
    time_on: f64,
    time_off: Option<f64>,
}

impl Voice {
    pub fn new(key: usize) -> Self {
        Self {
            key,
            frequency: KEYMAP[key].frequency,
            held: false,
            time_on: 0.0,
            time_off: None,
        }
    }

    /// The full statically-enumerated voice table.
    pub fn table() -> Vec<Voice> {
        (0..KEYMAP.len()).map(Voice::new).collect()
    }

    pub fn key(&self) -> usize {
        self.key
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn held(&self) -> bool {
        self.held
    }

    pub fn time_on(&self) -> f64 {
        self.time_on
    }

    pub fn time_off(&self) -> Option<f64> {
        self.time_off
    }

    /// Key went down at `now`: restart the envelope and clear any release.
    pub fn note_on(&mut self, now: f64) {
        self.held = true;
        self.time_on = now;
        self.time_off = None;
    }

    /// Key came up at `now`: start the release ramp.
    pub fn note_off(&mut self, now: f64) {
        self.held = false;
        self.time_off = Some(now);
    }

    /// True if released and still inside the release window's reach. A fresh
    /// voice that was never pressed has no `time_off` and is not releasing.
    pub fn is_releasing(&self) -> bool {
        !self.held && self.time_off.is_some()
    }
}

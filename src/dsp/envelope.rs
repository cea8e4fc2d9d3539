use crate::MIN_TIME;

/*
ADSR Envelope Implementation
============================

This envelope is evaluated as a pure function of time rather than stepped as
a per-sample state machine. Each voice carries two timestamps on a shared
monotonic sample clock:

  time_on     seconds when the key last went down
  time_off    seconds when the key last came up (None while held)

and the envelope answers "what is the gain at time `now`?" for any `now`.

The Shape: Linear Ramps
-----------------------

  Gain
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release
         (A)   (D)      (S)      (R)

Held (time_off unset, or now still before it):

    dt < A            gain = dt / A                  (ramp 0 → 1)
    dt < A + D        gain = 1 - (dt - A)/D * (1-S)  (ramp 1 → S)
    otherwise         gain = S

Released (now ≥ time_off):

    du < R            gain = S * (1 - du / R)        (ramp S → 0)
    otherwise         gain = 0

where dt = now - time_on and du = now - time_off.

Release always ramps from the sustain level, not from wherever the held
branch happened to be. Releasing mid-attack therefore steps down to the
sustain ramp; the keyboard this drives has a fast attack so the step is
inaudible in practice, and the simple formula keeps the function pure.

Why a pure function? The driver detects key transitions once per block, but
the ramp itself must vary continuously per-sample across block boundaries.
Evaluating from timestamps gives that for free: no per-sample mutable state,
nothing to reset, and any (on, off, now) triple can be tested directly.

Degenerate durations are clamped to MIN_TIME at construction so the
divisions above can never blow up.
*/

/// Linear ADSR envelope evaluated from note-on/note-off timestamps.
#[derive(Debug, Clone, Copy)]
pub struct Adsr {
    attack: f64,  // seconds to ramp 0 → 1
    decay: f64,   // seconds to ramp 1 → sustain
    sustain: f64, // level to hold (0.0 - 1.0)
    release: f64, // seconds to ramp sustain → 0
}

impl Adsr {
    /// Build an envelope, clamping durations to a minimum epsilon and the
    /// sustain level to 0..=1. Zero or negative stage times behave as
    /// instantaneous transitions.
    pub fn new(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        Self {
            attack: attack.max(MIN_TIME),
            decay: decay.max(MIN_TIME),
            sustain: sustain.clamp(0.0, 1.0),
            release: release.max(MIN_TIME),
        }
    }

    /// Fast attack, medium sustain: the stock keyboard patch.
    pub fn default_patch() -> Self {
        Self::new(0.05, 0.1, 0.7, 0.2)
    }

    /// Gain at `now` for a note pressed at `time_on` and released at
    /// `time_off` (`None` while the key is still held). Returns 0.0..=1.0.
    pub fn gain(&self, time_on: f64, time_off: Option<f64>, now: f64) -> f32 {
        let dt = now - time_on;
        if dt < 0.0 {
            return 0.0;
        }

        let held = match time_off {
            None => true,
            Some(off) => now < off,
        };

        if held {
            let gain = if dt < self.attack {
                dt / self.attack
            } else if dt < self.attack + self.decay {
                1.0 - (dt - self.attack) / self.decay * (1.0 - self.sustain)
            } else {
                self.sustain
            };
            gain as f32
        } else {
            // time_off is Some and now >= off here
            let du = now - time_off.unwrap_or(now);
            if du < self.release {
                (self.sustain * (1.0 - du / self.release)) as f32
            } else {
                0.0
            }
        }
    }

    /// True if a released note can still be audible at `now`: the release
    /// ramp has not yet run out. Held notes are always audible.
    pub fn is_audible(&self, time_off: Option<f64>, now: f64) -> bool {
        match time_off {
            None => true,
            Some(off) => now < off + self.release,
        }
    }

}

impl Default for Adsr {
    fn default() -> Self {
        Self::default_patch()
    }
}

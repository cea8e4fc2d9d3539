use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Waveform Generation
===================

The generator is a pure function of (waveform, frequency, time). Time is the
engine's resettable phase clock in seconds, continuous across blocks, so a
voice keeps its phase no matter how the backend slices the stream into
callbacks.

Every shape is periodic with period 1 in ft, so the core evaluator takes a
position along the cycle (`at_cycle`) and `sample` is just `at_cycle(f·t)`.
Callers holding a long-running clock must reduce f·t modulo 1 in f64 before
the f32 cast: a large absolute time in f32 no longer resolves individual
samples, and the reduced fraction always does.

The four shapes and their character:

  Sine        sin(2π f t)                              pure, hollow
  Square      sign(sin(2π f t))                        buzzy, odd harmonics
  Triangle    2·|2(ft - floor(ft + ½))| - 1            soft, mellow
  Sawtooth    2·(ft - floor(½ + ft))                   bright, all harmonics

Square is defined through the sign of the sine so its edges land exactly
where the sine crosses zero, with sign(0) = 0 at the crossing itself.
f32::signum would return ±1.0 at zero, so the sign is taken by hand.
*/

/// The active oscillator shape.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

impl Waveform {
    /// Decode a control-surface index. Unknown values fall back to sine;
    /// a garbled control write must never be an error in the audio path.
    pub fn from_index(index: u8) -> Self {
        match index {
            1 => Waveform::Square,
            2 => Waveform::Triangle,
            3 => Waveform::Sawtooth,
            _ => Waveform::Sine,
        }
    }

    /// Index for the control surface (inverse of `from_index`).
    pub fn index(self) -> u8 {
        match self {
            Waveform::Sine => 0,
            Waveform::Square => 1,
            Waveform::Triangle => 2,
            Waveform::Sawtooth => 3,
        }
    }

    /// Display name for status views.
    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "Sine",
            Waveform::Square => "Square",
            Waveform::Triangle => "Triangle",
            Waveform::Sawtooth => "Sawtooth",
        }
    }

    /// Instantaneous sample in [-1, 1] at time `t` seconds for a tone of
    /// `frequency` Hz.
    #[inline]
    pub fn sample(self, frequency: f32, t: f32) -> f32 {
        self.at_cycle(frequency * t)
    }

    /// Instantaneous sample at `cycle` periods into the waveform. Periodic
    /// with period 1, so any real value is accepted; long-running callers
    /// should reduce modulo 1 in wide precision before casting down.
    #[inline]
    pub fn at_cycle(self, cycle: f32) -> f32 {
        match self {
            Waveform::Sine => (TAU * cycle).sin(),
            Waveform::Square => {
                let s = (TAU * cycle).sin();
                if s > 0.0 {
                    1.0
                } else if s < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }
            Waveform::Triangle => 2.0 * (2.0 * (cycle - (cycle + 0.5).floor())).abs() - 1.0,
            Waveform::Sawtooth => 2.0 * (cycle - (0.5 + cycle).floor()),
        }
    }
}

use crate::dsp::ring::Ring;

/*
Reverb
======

Structurally the same loop as the delay, with two differences that give it a
washier character:

    out[i]  = in[i] + amount · buf[cursor]
    buf[cursor] = out[i]            <- post-mix signal, no feedback term
    cursor += 1 (mod capacity)

The write stores the post-mix signal rather than signal + feedback·tap, so
the only recirculation is the implicit one-cycle re-read of the buffer: the
tail decays by `amount` per pass. Combined with the much shorter buffer
(80 ms vs the delay's 120 ms) the repeats smear together into a small-room
wash instead of discrete echoes.

A denser network (parallel combs plus allpasses) would sound bigger, but
this single tap is cheap, stable for any amount < 1, and what the keyboard
calls for.
*/

/// Single-tap feedback reverb.
pub struct Reverb {
    ring: Ring,
    amount: f32,
}

impl Reverb {
    pub fn new(sample_rate: f32, time: f32) -> Self {
        Self {
            ring: Ring::for_duration(sample_rate, time),
            amount: 0.35,
        }
    }

    /// Wet amount (0..1); also the per-cycle decay factor of the tail.
    pub fn set_amount(&mut self, amount: f32) {
        self.amount = amount.clamp(0.0, 0.99);
    }

    /// Tail repeat spacing in samples (the fixed buffer length).
    pub fn period_samples(&self) -> usize {
        self.ring.capacity()
    }

    pub fn process(&mut self, block: &mut [f32]) {
        for sample in block.iter_mut() {
            *sample += self.amount * self.ring.read();
            self.ring.write(*sample);
            self.ring.advance();
        }
    }

    pub fn clear(&mut self) {
        self.ring.clear();
    }

    pub fn is_silent(&self) -> bool {
        self.ring.is_silent()
    }
}

use std::f32::consts::TAU;

use crate::dsp::ring::Ring;

/*
Chorus Effect
=============

Chorus thickens a sound by adding copies of it read from a short circular
buffer at slowly wobbling offsets. Each of N voices gets its own LFO; the
LFOs share a base rate but are detuned from each other by a fixed step so
they never phase-lock into one fat voice.

Per block, for every sample index i and voice v:

    offset(i, v) = depth · sin(2π · (rate + v · DETUNE_STEP) · t_i)   seconds

The offsets are converted to whole samples and read relative to the write
cursor; reads across a block all use the cursor position from the start of
the block. LFO phase is accumulated as rate·t in f64 and reduced modulo one
cycle before the f32 sine, so the sweep stays smooth however long the
engine's phase clock has been running. Voices are averaged, scaled by a fixed mix level, and added to
the signal. Only after the whole block has been read is the post-chorus
signal written back and the cursor advanced, one sample per frame — the
feedforward path of a classic chorus, with the buffer carrying the already
chorused signal of earlier blocks.

The buffer holds 25 ms of audio. Depth defaults to 8 ms, so even the widest
modulation stays well inside it; the euclidean wrap in `Ring` covers the
rest.
*/

const BUFFER_SECONDS: f32 = 0.025;
const MIX: f32 = 0.28;
const DETUNE_STEP: f32 = 0.25; // Hz between adjacent voice LFOs
pub const MAX_VOICES: usize = 8;

/// Multi-voice modulated-delay chorus.
pub struct Chorus {
    ring: Ring,
    sample_rate: f32,
    depth: f32, // modulation depth in seconds
    rate: f32,  // base LFO rate in Hz
    voices: usize,
}

impl Chorus {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            ring: Ring::for_duration(sample_rate, BUFFER_SECONDS),
            sample_rate,
            depth: 0.008,
            rate: 1.1,
            voices: 4,
        }
    }

    /// Modulation depth in seconds.
    pub fn set_depth(&mut self, depth: f32) {
        self.depth = depth.clamp(0.0, BUFFER_SECONDS);
    }

    /// Base LFO rate in Hz.
    pub fn set_rate(&mut self, rate: f32) {
        self.rate = rate.max(0.0);
    }

    pub fn set_voices(&mut self, voices: usize) {
        self.voices = voices.clamp(1, MAX_VOICES);
    }

    /// Process one block in place. `t0` is the time of the block's first
    /// sample on the engine's phase clock, in seconds.
    pub fn process(&mut self, block: &mut [f32], t0: f64) {
        // Read pass: every read is relative to the cursor as it stood at
        // the start of the block.
        for (i, sample) in block.iter_mut().enumerate() {
            let t = t0 + f64::from(i as u32) / f64::from(self.sample_rate);
            let mut acc = 0.0;
            for v in 0..self.voices {
                let rate = f64::from(self.rate + v as f32 * DETUNE_STEP);
                let lfo = (TAU * (rate * t).fract() as f32).sin();
                let offset_samples = (self.depth * lfo * self.sample_rate) as i64;
                acc += self.ring.read_offset(i as i64 - offset_samples);
            }
            *sample += MIX * acc / self.voices as f32;
        }

        // Write pass: store the post-chorus signal and advance.
        for &sample in block.iter() {
            self.ring.write(sample);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_in_silence_out() {
        let mut chorus = Chorus::new(48_000.0);
        let mut block = vec![0.0; 256];
        chorus.process(&mut block, 0.0);
        assert!(block.iter().all(|&s| s == 0.0));
        assert!(chorus.is_silent());
    }

    #[test]
    fn buffered_signal_feeds_later_blocks() {
        let mut chorus = Chorus::new(48_000.0);
        let mut first = vec![0.5; 512];
        chorus.process(&mut first, 0.0);

        // The buffer now carries signal; a silent block picks some of it up.
        let mut second = vec![0.0; 512];
        chorus.process(&mut second, 512.0 / 48_000.0);
        assert!(second.iter().any(|&s| s != 0.0));
    }

    #[test]
    fn output_stays_bounded() {
        let mut chorus = Chorus::new(48_000.0);
        chorus.set_depth(0.02);
        chorus.set_rate(5.0);
        for b in 0..20 {
            let mut block: Vec<f32> =
                (0..256).map(|i| (i as f32 * 0.13).sin()).collect();
            chorus.process(&mut block, b as f64 * 256.0 / 48_000.0);
            for &s in &block {
                assert!(s.abs() < 4.0, "chorus output diverged: {s}");
            }
        }
    }

    #[test]
    fn clear_matches_fresh_state() {
        let mut used = Chorus::new(48_000.0);
        let mut warmup = vec![0.7; 1024];
        used.process(&mut warmup, 0.0);
        used.clear();

        let mut fresh = Chorus::new(48_000.0);
        let input: Vec<f32> = (0..256).map(|i| (i as f32 * 0.05).sin()).collect();
        let mut a = input.clone();
        let mut b = input.clone();
        used.process(&mut a, 0.0);
        fresh.process(&mut b, 0.0);
        assert_eq!(a, b);
    }
}

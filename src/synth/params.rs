//! Parameters shared between the control surface and the audio callback.
//!
//! Ownership discipline: the control thread (UI event handlers) writes, the
//! audio thread reads once per block. Every field is a single atomic scalar,
//! so there is nothing to lock and no read can ever tear — floats travel as
//! their bit patterns in `AtomicU32`. Relaxed ordering is enough: each field
//! is independent, and a write landing one block late is inaudible.
//!
//! Nothing here clears effect buffers. The buffers live inside the engine,
//! and the engine clears them itself when it observes an enable flag rising,
//! so the multi-field reset the clear implies happens entirely on the audio
//! thread.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use crate::dsp::Waveform;

fn load_f32(cell: &AtomicU32) -> f32 {
    f32::from_bits(cell.load(Ordering::Relaxed))
}

fn store_f32(cell: &AtomicU32, value: f32) {
    cell.store(value.to_bits(), Ordering::Relaxed);
}

fn atomic_f32(value: f32) -> AtomicU32 {
    AtomicU32::new(value.to_bits())
}

/// Process-wide synth parameters. Control surface writes, engine reads.
pub struct SynthParams {
    amplitude: AtomicU32,
    waveform: AtomicU8,

    chorus_enabled: AtomicBool,
    chorus_depth: AtomicU32, // seconds
    chorus_rate: AtomicU32,  // Hz
    chorus_voices: AtomicU8,

    delay_enabled: AtomicBool,
    delay_time: AtomicU32, // seconds; buffer length stays fixed regardless
    delay_feedback: AtomicU32,

    reverb_enabled: AtomicBool,
    reverb_amount: AtomicU32,
}

impl SynthParams {
    pub fn new() -> Self {
        Self {
            amplitude: atomic_f32(0.5),
            waveform: AtomicU8::new(Waveform::Sine.index()),

            chorus_enabled: AtomicBool::new(false),
            chorus_depth: atomic_f32(0.008),
            chorus_rate: atomic_f32(1.1),
            chorus_voices: AtomicU8::new(4),

            delay_enabled: AtomicBool::new(false),
            delay_time: atomic_f32(0.12),
            delay_feedback: atomic_f32(0.3),

            reverb_enabled: AtomicBool::new(false),
            reverb_amount: atomic_f32(0.35),
        }
    }

    pub fn amplitude(&self) -> f32 {
        load_f32(&self.amplitude)
    }

    pub fn set_amplitude(&self, amplitude: f32) {
        store_f32(&self.amplitude, amplitude.clamp(0.0, 1.0));
    }

    /// Step the master volume, clamped to 0..=1. Arrow-key control path.
    pub fn adjust_amplitude(&self, delta: f32) {
        self.set_amplitude(self.amplitude() + delta);
    }

    pub fn waveform(&self) -> Waveform {
        Waveform::from_index(self.waveform.load(Ordering::Relaxed))
    }

    pub fn set_waveform(&self, waveform: Waveform) {
        self.waveform.store(waveform.index(), Ordering::Relaxed);
    }

    pub fn chorus_enabled(&self) -> bool {
        self.chorus_enabled.load(Ordering::Relaxed)
    }

    /// Flip the chorus on/off, returning the new state.
    pub fn toggle_chorus(&self) -> bool {
        !self.chorus_enabled.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn chorus_depth(&self) -> f32 {
        load_f32(&self.chorus_depth)
    }

    pub fn set_chorus_depth(&self, seconds: f32) {
        store_f32(&self.chorus_depth, seconds.max(0.0));
    }

    pub fn chorus_rate(&self) -> f32 {
        load_f32(&self.chorus_rate)
    }

    pub fn set_chorus_rate(&self, hz: f32) {
        store_f32(&self.chorus_rate, hz.max(0.0));
    }

    pub fn chorus_voices(&self) -> u8 {
        self.chorus_voices.load(Ordering::Relaxed)
    }

    pub fn set_chorus_voices(&self, voices: u8) {
        self.chorus_voices.store(voices.max(1), Ordering::Relaxed);
    }

    pub fn delay_enabled(&self) -> bool {
        self.delay_enabled.load(Ordering::Relaxed)
    }

    pub fn toggle_delay(&self) -> bool {
        !self.delay_enabled.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn delay_time(&self) -> f32 {
        load_f32(&self.delay_time)
    }

    pub fn set_delay_time(&self, seconds: f32) {
        store_f32(&self.delay_time, seconds.max(0.0));
    }

    pub fn delay_feedback(&self) -> f32 {
        load_f32(&self.delay_feedback)
    }

    pub fn set_delay_feedback(&self, feedback: f32) {
        store_f32(&self.delay_feedback, feedback.clamp(0.0, 0.99));
    }

    pub fn reverb_enabled(&self) -> bool {
        self.reverb_enabled.load(Ordering::Relaxed)
    }

    pub fn toggle_reverb(&self) -> bool {
        !self.reverb_enabled.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn reverb_amount(&self) -> f32 {
        load_f32(&self.reverb_amount)
    }

    pub fn set_reverb_amount(&self, amount: f32) {
        store_f32(&self.reverb_amount, amount.clamp(0.0, 0.99));
    }
}

impl Default for SynthParams {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amplitude_clamps_to_unit_range() {
        let params = SynthParams::new();
        params.set_amplitude(1.7);
        assert_eq!(params.amplitude(), 1.0);
        params.adjust_amplitude(-3.0);
        assert_eq!(params.amplitude(), 0.0);
        params.adjust_amplitude(0.05);
        assert!((params.amplitude() - 0.05).abs() < 1e-6);
    }

    #[test]
    fn waveform_round_trips_through_atomic() {
        let params = SynthParams::new();
        params.set_waveform(Waveform::Triangle);
        assert_eq!(params.waveform(), Waveform::Triangle);
    }

    #[test]
    fn toggles_report_the_new_state() {
        let params = SynthParams::new();
        assert!(params.toggle_reverb());
        assert!(params.reverb_enabled());
        assert!(!params.toggle_reverb());
        assert!(!params.reverb_enabled());
    }

    #[test]
    fn floats_survive_the_bit_cast() {
        let params = SynthParams::new();
        params.set_delay_feedback(0.3);
        assert_eq!(params.delay_feedback(), 0.3);
        params.set_chorus_depth(0.008);
        assert_eq!(params.chorus_depth(), 0.008);
    }
}

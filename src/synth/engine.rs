use std::sync::Arc;

use crate::dsp::chorus::Chorus;
use crate::dsp::delay::Delay;
use crate::dsp::distortion::scale_and_clip;
use crate::dsp::reverb::Reverb;
use crate::dsp::{Adsr, Waveform};
use crate::keys::{DigitRowPolicy, KeyboardState};
use crate::synth::params::SynthParams;
use crate::synth::status::StatusSnapshot;
use crate::synth::voice::Voice;

/*
Realtime Engine
===============

`render_block` runs inside the audio backend's callback and must finish
within one block duration (64 samples at 48 kHz is 1.33 ms). Everything it
touches is preallocated; the only cross-thread traffic is atomic loads of
the shared parameters, two atomic loads for the key snapshot, and one
wait-free push of a status snapshot.

Per block, in order:

  1. snapshot held keys and parameters
  2. apply voice on/off transitions; reset the phase clock if the held-note
     set or the waveform changed (avoids discontinuity clicks)
  3. clear any effect buffer whose enable flag rose since last block
  4. mix voices: waveform(freq, phase-time) * envelope(timestamps, clock-time)
  5. effects in fixed order: chorus -> delay -> reverb
  6. master amplitude + tanh soft clip, recording the peak
  7. publish status

Two clocks
----------

  clock   monotonic sample count since startup, never reset. Envelope
          timestamps (note-on/off) live on this clock, so ramps stay
          continuous across block boundaries no matter what else happens.

  phase   sample count feeding the waveform generator and the chorus LFOs.
          Reset to zero whenever the held-note set or the waveform changes;
          restarting every sounding wave at phase 0 together is click-free,
          while letting them run would splice waveforms mid-cycle.

Both clocks are consumed as f64 seconds. The waveform position f·t is
additionally reduced modulo one cycle in f64 before the f32 cast: past 2^24
samples a bare f32 time stops resolving individual samples, while the
reduced fraction keeps full precision no matter how long a chord is held.
*/

/// Startup configuration. Everything that sizes buffers or fixes policy
/// lives here; runtime-tweakable values live in [`SynthParams`].
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub sample_rate: f32,
    pub adsr: Adsr,
    pub digit_policy: DigitRowPolicy,
    /// Delay-line length in seconds. Fixed for the process lifetime even if
    /// the delay-time parameter is changed later.
    pub delay_time: f32,
    /// Reverb buffer length in seconds.
    pub reverb_time: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            adsr: Adsr::default_patch(),
            digit_policy: DigitRowPolicy::default(),
            delay_time: 0.12,
            reverb_time: 0.08,
        }
    }
}

/// The realtime synthesis engine. Owned by the audio callback.
pub struct Engine {
    sample_rate: f32,
    adsr: Adsr,
    digit_policy: DigitRowPolicy,

    voices: Vec<Voice>,
    params: Arc<SynthParams>,
    keyboard: Arc<KeyboardState>,

    chorus: Chorus,
    delay: Delay,
    reverb: Reverb,
    chorus_was_on: bool,
    delay_was_on: bool,
    reverb_was_on: bool,

    waveform: Waveform,
    phase: u64, // resettable waveform/LFO clock, in samples
    clock: u64, // monotonic envelope clock, in samples
    prev_held: u32,
    sounding: bool,

    status_tx: Option<rtrb::Producer<StatusSnapshot>>,
}

impl Engine {
    pub fn new(
        config: EngineConfig,
        params: Arc<SynthParams>,
        keyboard: Arc<KeyboardState>,
    ) -> Self {
        Self {
            sample_rate: config.sample_rate,
            adsr: config.adsr,
            digit_policy: config.digit_policy,
            voices: Voice::table(),
            params,
            keyboard,
            chorus: Chorus::new(config.sample_rate),
            delay: Delay::new(config.sample_rate, config.delay_time),
            reverb: Reverb::new(config.sample_rate, config.reverb_time),
            chorus_was_on: false,
            delay_was_on: false,
            reverb_was_on: false,
            waveform: Waveform::Sine,
            phase: 0,
            clock: 0,
            prev_held: 0,
            sounding: false,
            status_tx: None,
        }
    }

    /// Attach the rtrb producer the callback publishes status snapshots to.
    pub fn set_status_sink(&mut self, tx: rtrb::Producer<StatusSnapshot>) {
        self.status_tx = Some(tx);
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Render one mono block. Realtime-safe: no allocation, locks, or I/O.
    pub fn render_block(&mut self, out: &mut [f32]) {
        let snapshot = self.keyboard.snapshot();
        let held = snapshot.resolve(self.digit_policy);

        let amplitude = self.params.amplitude();
        let waveform = self.params.waveform();
        let chorus_on = self.params.chorus_enabled();
        let delay_on = self.params.delay_enabled();
        let reverb_on = self.params.reverb_enabled();

        // Phase restarts on any change to the sounding set or the waveform.
        if held != self.prev_held || waveform != self.waveform {
            self.phase = 0;
        }
        self.waveform = waveform;

        let now = self.clock as f64 / self.sample_rate as f64;
        for (idx, voice) in self.voices.iter_mut().enumerate() {
            let down = held & (1 << idx) != 0;
            if down && !voice.held() {
                voice.note_on(now);
            } else if !down && voice.held() {
                voice.note_off(now);
            }
        }
        self.prev_held = held;

        // An effect toggled on starts from a zeroed buffer. The buffers are
        // owned here, so the clear can't race the control thread.
        if chorus_on && !self.chorus_was_on {
            self.chorus.clear();
        }
        if delay_on && !self.delay_was_on {
            self.delay.clear();
        }
        if reverb_on && !self.reverb_was_on {
            self.reverb.clear();
        }
        self.chorus_was_on = chorus_on;
        self.delay_was_on = delay_on;
        self.reverb_was_on = reverb_on;

        self.chorus.set_depth(self.params.chorus_depth());
        self.chorus.set_rate(self.params.chorus_rate());
        self.chorus.set_voices(self.params.chorus_voices() as usize);
        self.delay.set_feedback(self.params.delay_feedback());
        self.delay.set_time(self.params.delay_time());
        self.reverb.set_amount(self.params.reverb_amount());

        let any_voice = held != 0
            || self
                .voices
                .iter()
                .any(|v| v.is_releasing() && self.adsr.is_audible(v.time_off(), now));
        self.sounding = any_voice;

        // Silence fast path: nothing sounding and no enabled effect still
        // carrying signal. Running zeros through all-zero effect buffers is
        // the identity and tanh(0) = 0, so skipping the pipeline cannot
        // change the output.
        let effects_ringing = (chorus_on && !self.chorus.is_silent())
            || (delay_on && !self.delay.is_silent())
            || (reverb_on && !self.reverb.is_silent());
        if !any_voice && !effects_ringing {
            out.fill(0.0);
            self.clock += out.len() as u64;
            self.phase += out.len() as u64;
            self.publish(StatusSnapshot {
                held,
                peak: 0.0,
                amplitude,
                waveform,
                chorus_on,
                delay_on,
                reverb_on,
                sounding: false,
            });
            return;
        }

        // Voice mix. Waveform time comes from the resettable phase clock,
        // envelope time from the monotonic clock.
        out.fill(0.0);
        let inv_rate = 1.0 / self.sample_rate as f64;
        for voice in &self.voices {
            if !voice.held()
                && !(voice.is_releasing() && self.adsr.is_audible(voice.time_off(), now))
            {
                continue;
            }
            let freq = f64::from(voice.frequency());
            let time_on = voice.time_on();
            let time_off = voice.time_off();
            for (i, sample) in out.iter_mut().enumerate() {
                let t_wave = (self.phase + i as u64) as f64 * inv_rate;
                let t_env = now + i as f64 * inv_rate;
                let gain = self.adsr.gain(time_on, time_off, t_env);
                if gain > 0.0 {
                    // Reduce f·t to a cycle fraction before the f32 cast;
                    // a large absolute time quantizes neighboring samples
                    // onto the same f32 value.
                    let cycle = (freq * t_wave).fract() as f32;
                    *sample += waveform.at_cycle(cycle) * gain;
                }
            }
        }

        // Effects run in fixed order; each feeds the next.
        let t0 = self.phase as f64 / self.sample_rate as f64;
        if chorus_on {
            self.chorus.process(out, t0);
        }
        if delay_on {
            self.delay.process(out);
        }
        if reverb_on {
            self.reverb.process(out);
        }

        let peak = scale_and_clip(out, amplitude);

        self.clock += out.len() as u64;
        self.phase += out.len() as u64;

        self.publish(StatusSnapshot {
            held,
            peak,
            amplitude,
            waveform,
            chorus_on,
            delay_on,
            reverb_on,
            sounding: self.sounding,
        });
    }

    fn publish(&mut self, status: StatusSnapshot) {
        if let Some(tx) = &mut self.status_tx {
            // A full ring means the UI is behind; drop this snapshot.
            let _ = tx.push(status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with_state() -> (Engine, Arc<SynthParams>, Arc<KeyboardState>) {
        let params = Arc::new(SynthParams::new());
        let keyboard = Arc::new(KeyboardState::new());
        let engine = Engine::new(
            EngineConfig::default(),
            Arc::clone(&params),
            Arc::clone(&keyboard),
        );
        (engine, params, keyboard)
    }

    #[test]
    fn silent_when_nothing_held() {
        let (mut engine, _params, _keyboard) = engine_with_state();
        let mut block = vec![1.0; 64]; // stale data must be overwritten
        engine.render_block(&mut block);
        assert!(block.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn held_key_produces_sound_and_release_fades() {
        let (mut engine, _params, keyboard) = engine_with_state();
        keyboard.press_char('z');

        let mut block = vec![0.0; 512];
        engine.render_block(&mut block);
        assert!(block.iter().any(|&s| s != 0.0));
        assert!(block.iter().all(|s| s.abs() <= 1.0));

        keyboard.release_char('z');
        // Render past the 0.2 s release window.
        let mut tail = vec![0.0; 512];
        for _ in 0..30 {
            engine.render_block(&mut tail);
        }
        assert!(tail.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn first_block_matches_attack_formula() {
        let (mut engine, params, keyboard) = engine_with_state();
        params.set_amplitude(0.5);
        keyboard.press_char('z');

        let mut block = vec![0.0; 256];
        engine.render_block(&mut block);

        let fs = 48_000.0f64;
        let freq = 261.63f32;
        for i in [1usize, 50, 200] {
            let t = i as f32 / 48_000.0;
            let env = (i as f64 / fs) / 0.05; // attack ramp
            let expected =
                (0.5 * Waveform::Sine.sample(freq, t) * env as f32).tanh();
            assert!(
                (block[i] - expected).abs() < 1e-5,
                "sample {i}: expected {expected}, got {}",
                block[i]
            );
        }
    }

    #[test]
    fn phase_resets_when_held_set_changes() {
        let (mut engine, _params, keyboard) = engine_with_state();
        keyboard.press_char('z');
        let mut first = vec![0.0; 128];
        engine.render_block(&mut first);

        // Releasing and re-pressing within later blocks restarts the phase:
        // the waveform part of the very first sample is sin(0) = 0.
        keyboard.release_char('z');
        let mut gap = vec![0.0; 128];
        for _ in 0..100 {
            engine.render_block(&mut gap);
        }
        keyboard.press_char('z');
        let mut again = vec![0.0; 128];
        engine.render_block(&mut again);
        assert_eq!(again[0], 0.0); // sin(0) * env(0) with both clocks at ramp start
        assert!((again[1] - first[1]).abs() < 1e-6);
    }

    #[test]
    fn numpad_suppression_reaches_the_mixer() {
        let (mut engine, _params, keyboard) = engine_with_state();
        keyboard.press_char('2');
        keyboard.press_numpad(2);
        let mut block = vec![0.0; 128];
        engine.render_block(&mut block);
        assert!(block.iter().all(|&s| s == 0.0));

        keyboard.release_numpad(2);
        engine.render_block(&mut block);
        assert!(block.iter().any(|&s| s != 0.0));
    }

    #[test]
    fn effect_toggle_starts_from_cleared_buffer() {
        let (mut engine, params, keyboard) = engine_with_state();
        params.toggle_delay();
        keyboard.press_char('n');
        let mut first_run = vec![0.0; 256];
        engine.render_block(&mut first_run);

        // Toggle off mid-flight, then back on: the re-enabled delay must not
        // replay stale buffer content.
        params.toggle_delay();
        keyboard.release_all();
        let mut idle = vec![0.0; 256];
        for _ in 0..60 {
            engine.render_block(&mut idle);
        }
        params.toggle_delay();
        keyboard.press_char('n');
        let mut second_run = vec![0.0; 256];
        engine.render_block(&mut second_run);

        for (a, b) in first_run.iter().zip(&second_run) {
            assert!((a - b).abs() < 1e-6, "stale delay content leaked: {a} vs {b}");
        }
    }

    #[test]
    fn two_full_voices_with_effects_stay_in_range() {
        let (mut engine, params, keyboard) = engine_with_state();
        params.set_amplitude(1.0);
        if !params.chorus_enabled() {
            params.toggle_chorus();
        }
        if !params.delay_enabled() {
            params.toggle_delay();
        }
        if !params.reverb_enabled() {
            params.toggle_reverb();
        }
        keyboard.press_char('z');
        keyboard.press_char('n');

        let mut block = vec![0.0; 256];
        for _ in 0..400 {
            engine.render_block(&mut block);
            for &s in &block {
                assert!((-1.0..=1.0).contains(&s), "clipped output escaped: {s}");
            }
        }
    }
}

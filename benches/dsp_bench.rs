//! Benchmarks for DSP primitives and full engine block rendering.
//!
//! Run with: cargo bench
//!
//! These measure the realtime path against the audio deadline at 48kHz:
//!   - 64 samples  = 1.33ms deadline
//!   - 128 samples = 2.67ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use clavier::dsp::chorus::Chorus;
use clavier::dsp::delay::Delay;
use clavier::dsp::distortion::scale_and_clip;
use clavier::dsp::reverb::Reverb;
use clavier::dsp::{Adsr, Waveform};
use clavier::keys::KeyboardState;
use clavier::synth::{Engine, EngineConfig, SynthParams};

/// Common audio callback buffer sizes.
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

const SAMPLE_RATE: f32 = 48_000.0;

fn sine_block(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| Waveform::Sine.sample(440.0, i as f32 / SAMPLE_RATE))
        .collect()
}

fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    let adsr = Adsr::default_patch();

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack phase: note just pressed.
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let t = i as f64 / SAMPLE_RATE as f64;
                    *sample = adsr.gain(black_box(0.0), black_box(None), black_box(t));
                }
            })
        });

        // Release phase: ramping down from sustain.
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let t = 1.0 + i as f64 / SAMPLE_RATE as f64;
                    *sample = adsr.gain(black_box(0.0), black_box(Some(1.0)), black_box(t));
                }
            })
        });
    }

    group.finish();
}

fn bench_waveform(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/waveform");

    for waveform in [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Triangle,
        Waveform::Sawtooth,
    ] {
        let mut buffer = vec![0.0f32; 256];
        group.bench_function(waveform.name(), |b| {
            b.iter(|| {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let t = i as f32 / SAMPLE_RATE;
                    *sample = waveform.sample(black_box(261.63), black_box(t));
                }
            })
        });
    }

    group.finish();
}

fn bench_effects(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/effects");

    for &size in BLOCK_SIZES {
        let dry = sine_block(size);
        let mut buffer = dry.clone();

        let mut chorus = Chorus::new(SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("chorus", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&dry);
                chorus.process(black_box(&mut buffer), black_box(0.0));
            })
        });

        let mut delay = Delay::new(SAMPLE_RATE, 0.12);
        group.bench_with_input(BenchmarkId::new("delay", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&dry);
                delay.process(black_box(&mut buffer));
            })
        });

        let mut reverb = Reverb::new(SAMPLE_RATE, 0.08);
        group.bench_with_input(BenchmarkId::new("reverb", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&dry);
                reverb.process(black_box(&mut buffer));
            })
        });

        group.bench_with_input(BenchmarkId::new("output_stage", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&dry);
                black_box(scale_and_clip(black_box(&mut buffer), black_box(0.8)));
            })
        });
    }

    group.finish();
}

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/render_block");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Worst realistic case: a seven-note chord with the whole effect
        // chain enabled.
        let params = Arc::new(SynthParams::new());
        let keyboard = Arc::new(KeyboardState::new());
        params.toggle_chorus();
        params.toggle_delay();
        params.toggle_reverb();
        for ch in ['z', 'c', 'b', 'q', 'e', 't', 'i'] {
            keyboard.press_char(ch);
        }
        let mut engine = Engine::new(
            EngineConfig::default(),
            Arc::clone(&params),
            Arc::clone(&keyboard),
        );

        group.bench_with_input(
            BenchmarkId::new("chord_all_effects", size),
            &size,
            |b, _| {
                b.iter(|| {
                    engine.render_block(black_box(&mut buffer));
                })
            },
        );

        // Idle path: nothing held, effects off.
        let mut idle_engine = Engine::new(
            EngineConfig::default(),
            Arc::new(SynthParams::new()),
            Arc::new(KeyboardState::new()),
        );
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, _| {
            b.iter(|| {
                idle_engine.render_block(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_envelope,
    bench_waveform,
    bench_effects,
    bench_engine,
);
criterion_main!(benches);

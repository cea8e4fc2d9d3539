//! Low-level DSP primitives used by the synth engine.
//!
//! These components are allocation-free and realtime-safe once constructed,
//! making them safe to run inside the audio callback. They intentionally stay
//! focused on the signal-processing math so the engine can layer on voice
//! management and parameter plumbing.

/// Multi-voice modulated-delay chorus.
pub mod chorus;
/// Feedback delay line effect.
pub mod delay;
/// Soft clipping for the output stage.
pub mod distortion;
/// Time-based attack/decay/sustain/release envelope.
pub mod envelope;
/// Single-tap feedback reverb.
pub mod reverb;
/// Fixed-capacity circular sample buffer.
pub mod ring;
/// Periodic waveform generation.
pub mod waveform;

pub use envelope::Adsr;
pub use waveform::Waveform;
